//! Adaptive integration
use super::{Estimate, Interval, Tolerance};
use crate::{NumericalError, Result};

// Abscissae of the 21-point Kronrod rule. The odd entries are the 10-point Gauss abscissae.
const XGK: [f64; 11] = [
    0.995657163025808080735527280689003,
    0.973906528517171720077964012084452,
    0.930157491355708226001207180059508,
    0.865063366688984510732096688423493,
    0.780817726586416897063717578345042,
    0.679409568299024406234327365114874,
    0.562757134668604683339000099272694,
    0.433395394129247190799265943165784,
    0.294392862701460198131126603103866,
    0.148874338981631210884826001129720,
    0.000000000000000000000000000000000,
];

const WGK: [f64; 11] = [
    0.011694638867371874278064396062192,
    0.032558162307964727478818972459390,
    0.054755896574351996031381300244580,
    0.075039674810919952767043140916190,
    0.093125454583697605535065465083366,
    0.109387158802297641899210590325805,
    0.123491976262065851077208980085325,
    0.134709217311473325928054001771707,
    0.142775938577060080797094273138717,
    0.147739104901338491374841515972068,
    0.149445554002916905664936468389821,
];

const WG: [f64; 5] = [
    0.066671344308688137593568809893332,
    0.149451349150580593145776339657697,
    0.219086362515982043995534934228163,
    0.269266719309996355091226921569469,
    0.295524224714752870173892994651338,
];

#[derive(Debug, Clone, Copy)]
struct Segment {
    lo: f64,
    hi: f64,
    value: f64,
    error: f64,
}

/// Storage for the subintervals of an adaptive integration
#[derive(Debug, Clone)]
pub struct Workspace {
    limit: usize,
    segments: Vec<Segment>,
}

impl Workspace {
    /// A workspace for at most `limit` subintervals
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            segments: Vec::with_capacity(limit),
        }
    }

    /// Maximum number of subintervals
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of subintervals used by the last integration
    pub fn size(&self) -> usize {
        self.segments.len()
    }
}

fn rescale_error(err: f64, result_abs: f64, result_asc: f64) -> f64 {
    let mut err = err.abs();
    if result_asc != 0.0 && err != 0.0 {
        let scale = (200.0 * err / result_asc).powf(1.5);
        err = if scale < 1.0 {
            result_asc * scale
        } else {
            result_asc
        };
    }
    if result_abs > f64::MIN_POSITIVE / (50.0 * f64::EPSILON) {
        let min_err = 50.0 * f64::EPSILON * result_abs;
        if min_err > err {
            err = min_err;
        }
    }
    err
}

// 21-point Gauss-Kronrod rule on [a, b].
fn qk21(f: &impl Fn(f64) -> f64, a: f64, b: f64) -> Segment {
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    let abs_half = half.abs();

    let fc = f(center);
    let mut result_gauss = 0.0;
    let mut result_kronrod = fc * WGK[10];
    let mut resabs = result_kronrod.abs();
    let mut fv1 = [0.0; 10];
    let mut fv2 = [0.0; 10];

    for j in 0..5 {
        let jtw = 2 * j + 1;
        let abscissa = half * XGK[jtw];
        let f1 = f(center - abscissa);
        let f2 = f(center + abscissa);
        fv1[jtw] = f1;
        fv2[jtw] = f2;
        result_gauss += WG[j] * (f1 + f2);
        result_kronrod += WGK[jtw] * (f1 + f2);
        resabs += WGK[jtw] * (f1.abs() + f2.abs());
    }

    for j in 0..5 {
        let jtwm1 = 2 * j;
        let abscissa = half * XGK[jtwm1];
        let f1 = f(center - abscissa);
        let f2 = f(center + abscissa);
        fv1[jtwm1] = f1;
        fv2[jtwm1] = f2;
        result_kronrod += WGK[jtwm1] * (f1 + f2);
        resabs += WGK[jtwm1] * (f1.abs() + f2.abs());
    }

    let mean = 0.5 * result_kronrod;
    let mut resasc = WGK[10] * (fc - mean).abs();
    for j in 0..10 {
        resasc += WGK[j] * ((fv1[j] - mean).abs() + (fv2[j] - mean).abs());
    }

    Segment {
        lo: a,
        hi: b,
        value: result_kronrod * half,
        error: rescale_error(
            (result_kronrod - result_gauss) * half,
            resabs * abs_half,
            resasc * abs_half,
        ),
    }
}

fn adaptive(
    f: &impl Fn(f64) -> f64,
    a: f64,
    b: f64,
    tol: Tolerance,
    workspace: &mut Workspace,
) -> Result<Estimate> {
    if workspace.limit == 0 {
        return Err(NumericalError::Invalid.into());
    }
    if tol.abs <= 0.0 && (tol.rel < 50.0 * f64::EPSILON || tol.rel < 0.5e-28) {
        return Err(NumericalError::BadTol.into());
    }

    workspace.segments.clear();
    workspace.segments.push(qk21(f, a, b));

    loop {
        let value = workspace.segments.iter().map(|s| s.value).sum::<f64>();
        let error = workspace.segments.iter().map(|s| s.error).sum::<f64>();
        if error <= tol.bound(value) {
            return Ok(Estimate { value, error });
        }
        if !value.is_finite() || !error.is_finite() {
            return Err(NumericalError::BadFunc.into());
        }
        if workspace.segments.len() >= workspace.limit {
            return Err(NumericalError::MaxIter.into());
        }

        let (worst, _) = workspace
            .segments
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(i, e), (j, s)| {
                if s.error > e {
                    (j, s.error)
                } else {
                    (i, e)
                }
            });
        let Segment { lo, hi, .. } = workspace.segments[worst];
        let mid = 0.5 * (lo + hi);
        if mid <= lo.min(hi) || mid >= lo.max(hi) {
            return Err(NumericalError::Round.into());
        }
        workspace.segments[worst] = qk21(f, lo, mid);
        workspace.segments.push(qk21(f, mid, hi));
    }
}

/// Integrate `f` over `interval`
///
/// The interval is bisected adaptively, always splitting the subinterval with the largest error
/// estimate, until the total error estimate is below `max(tol.abs, tol.rel * |result|)`. Each
/// subinterval uses the 21-point Gauss-Kronrod rule. Infinite bounds are handled by mapping the
/// interval onto `(0, 1]` with `x = a + (1 - t) / t` and its mirror images.
pub fn qags(
    f: impl Fn(f64) -> f64,
    interval: Interval,
    tol: Tolerance,
    workspace: &mut Workspace,
) -> Result<Estimate> {
    let Interval { lo, hi } = interval;
    if lo.is_nan() || hi.is_nan() {
        return Err(NumericalError::Domain.into());
    }
    if lo > hi {
        let e = qags(f, Interval::new(hi, lo), tol, workspace)?;
        return Ok(Estimate {
            value: -e.value,
            error: e.error,
        });
    }
    match (lo.is_infinite(), hi.is_infinite()) {
        (false, false) => adaptive(&f, lo, hi, tol, workspace),
        (false, true) => adaptive(
            &|t: f64| {
                let x = lo + (1.0 - t) / t;
                f(x) / (t * t)
            },
            0.0,
            1.0,
            tol,
            workspace,
        ),
        (true, false) => adaptive(
            &|t: f64| {
                let x = hi - (1.0 - t) / t;
                f(x) / (t * t)
            },
            0.0,
            1.0,
            tol,
            workspace,
        ),
        (true, true) if lo == hi => Ok(Estimate {
            value: 0.0,
            error: 0.0,
        }),
        (true, true) => adaptive(
            &|t: f64| {
                let x = (1.0 - t) / t;
                (f(x) + f(-x)) / (t * t)
            },
            0.0,
            1.0,
            tol,
            workspace,
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Error;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn integrate(f: impl Fn(f64) -> f64, lo: f64, hi: f64) -> Estimate {
        let mut w = Workspace::new(1000);
        qags(f, Interval::new(lo, hi), Tolerance::new(1e-7, 1e-7), &mut w).unwrap()
    }

    #[test]
    fn test_constant() {
        assert_abs_diff_eq!(integrate(|_| 1.0, 0.0, 1.0).value, 1.0, epsilon = 1e-7);
    }

    #[test]
    fn test_sin() {
        assert_abs_diff_eq!(integrate(f64::sin, 0.0, 2.0 * PI).value, 0.0, epsilon = 1e-7);
    }

    #[test]
    fn test_upper_infinite() {
        assert_abs_diff_eq!(
            integrate(|x| (-x).exp(), 1.0, f64::INFINITY).value,
            (-1.0_f64).exp(),
            epsilon = 1e-7
        );
    }

    #[test]
    fn test_lower_infinite() {
        assert_abs_diff_eq!(
            integrate(|x| 1.0 / (x * x), f64::NEG_INFINITY, -1.0).value,
            1.0,
            epsilon = 1e-7
        );
    }

    #[test]
    fn test_gaussian() {
        let gauss = |x: f64| (-x * x / 2.0).exp() / (2.0 * PI).sqrt();
        assert_abs_diff_eq!(
            integrate(gauss, f64::NEG_INFINITY, f64::INFINITY).value,
            1.0,
            epsilon = 1e-7
        );
    }

    #[test]
    fn test_reversed() {
        assert_abs_diff_eq!(integrate(|x| x, 2.0, 0.0).value, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_subdivides() {
        let mut w = Workspace::new(1000);
        let e = qags(
            |x: f64| x.sqrt(),
            Interval::new(0.0, 1.0),
            Tolerance::new(1e-10, 0.0),
            &mut w,
        )
        .unwrap();
        assert_abs_diff_eq!(e.value, 2.0 / 3.0, epsilon = 1e-9);
        assert!(w.size() > 1);
    }

    #[test]
    fn test_limit() {
        let mut w = Workspace::new(2);
        let r = qags(
            |x: f64| 1.0 / x.sqrt(),
            Interval::new(0.0, 1.0),
            Tolerance::new(1e-14, 0.0),
            &mut w,
        );
        assert!(matches!(r, Err(Error::Numerical(NumericalError::MaxIter))));
    }

    #[test]
    fn test_bad_tolerance() {
        let mut w = Workspace::new(10);
        let r = qags(|x| x, Interval::new(0.0, 1.0), Tolerance::new(0.0, 0.0), &mut w);
        assert!(matches!(r, Err(Error::Numerical(NumericalError::BadTol))));
    }
}
