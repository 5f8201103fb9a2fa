//! Numerical differentiation
use super::Estimate;
use crate::{NumericalError, Result};

/// Which points a finite difference uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Points on both sides of `x`
    Central,
    /// Points in `(x, x + h]`
    Forward,
    /// Points in `[x - h, x)`
    Backward,
}

struct Difference {
    value: f64,
    round: f64,
    trunc: f64,
}

// 5-point rule, with a 3-point rule for the truncation error.
fn central(f: &impl Fn(f64) -> f64, x: f64, h: f64) -> Difference {
    let fm1 = f(x - h);
    let fp1 = f(x + h);
    let fmh = f(x - h / 2.0);
    let fph = f(x + h / 2.0);

    let r3 = 0.5 * (fp1 - fm1);
    let r5 = (4.0 / 3.0) * (fph - fmh) - (1.0 / 3.0) * r3;

    let e3 = (fp1.abs() + fm1.abs()) * f64::EPSILON;
    let e5 = 2.0 * (fph.abs() + fmh.abs()) * f64::EPSILON + e3;

    // Error from the finite precision of x + h.
    let dy = (r3 / h).abs().max((r5 / h).abs()) * (x.abs() / h) * f64::EPSILON;

    Difference {
        value: r5 / h,
        trunc: ((r5 - r3) / h).abs(),
        round: (e5 / h).abs() + dy,
    }
}

// 4-point open rule, with a 2-point rule for the truncation error.
fn forward(f: &impl Fn(f64) -> f64, x: f64, h: f64) -> Difference {
    let f1 = f(x + h / 4.0);
    let f2 = f(x + h / 2.0);
    let f3 = f(x + (3.0 / 4.0) * h);
    let f4 = f(x + h);

    let r2 = 2.0 * (f4 - f2);
    let r4 = (22.0 / 3.0) * (f4 - f3) - (62.0 / 3.0) * (f3 - f2) + (52.0 / 3.0) * (f2 - f1);

    let e4 = 2.0 * 20.67 * (f4.abs() + f3.abs() + f2.abs() + f1.abs()) * f64::EPSILON;

    let dy = (r2 / h).abs().max((r4 / h).abs()) * (x / h).abs() * f64::EPSILON;

    Difference {
        value: r4 / h,
        trunc: ((r4 - r2) / h).abs(),
        round: (e4 / h).abs() + dy,
    }
}

fn refine(
    rule: impl Fn(f64) -> Difference,
    h: f64,
    optimal_step: impl Fn(f64, f64) -> f64,
) -> Estimate {
    let first = rule(h);
    let mut value = first.value;
    let mut error = first.round + first.trunc;

    if first.round < first.trunc && first.round > 0.0 && first.trunc > 0.0 {
        let second = rule(h * optimal_step(first.round, first.trunc));
        let error_opt = second.round + second.trunc;
        if error_opt < error && (second.value - value).abs() < 4.0 * error {
            value = second.value;
            error = error_opt;
        }
    }
    Estimate { value, error }
}

/// The derivative of `f` at `x` using an initial step size `h`
///
/// The step is adjusted once to balance the estimated round-off and truncation errors.
pub fn diff(direction: Direction, f: impl Fn(f64) -> f64, x: f64, h: f64) -> Result<Estimate> {
    if h == 0.0 || !h.is_finite() || !x.is_finite() {
        return Err(NumericalError::Invalid.into());
    }
    Ok(match direction {
        Direction::Central => refine(
            |h| central(&f, x, h),
            h,
            |round, trunc| (round / (2.0 * trunc)).powf(1.0 / 3.0),
        ),
        Direction::Forward => refine(
            |h| forward(&f, x, h),
            h,
            |round, trunc| (round / trunc).sqrt(),
        ),
        Direction::Backward => refine(
            |h| forward(&f, x, h),
            -h,
            |round, trunc| (round / trunc).sqrt(),
        ),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use paste::paste;

    macro_rules! test_quadratic {
        ($($direction:ident),*) => {
            $(
                paste! {
                    #[test]
                    fn [<test_quadratic_ $direction:lower>]() {
                        let d = diff(Direction::$direction, |x| x * x, 2.5, 0.001).unwrap();
                        assert_abs_diff_eq!(d.value, 5.0, epsilon = 1e-5);
                    }
                }
            )*
        };
    }

    test_quadratic!(Central, Forward, Backward);

    #[test]
    fn test_sin() {
        let d = diff(Direction::Central, f64::sin, 1.0, 0.001).unwrap();
        assert_abs_diff_eq!(d.value, 1.0_f64.cos(), epsilon = 1e-5);
        assert!(d.error < 1e-5);
    }

    #[test]
    fn test_forward_sqrt() {
        let d = diff(Direction::Forward, f64::sqrt, 0.25, 1e-3).unwrap();
        assert_abs_diff_eq!(d.value, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_step() {
        assert!(diff(Direction::Central, f64::sin, 1.0, 0.0).is_err());
    }
}
