//! Interpolation
use crate::{NumericalError, Result};
use std::cmp::Ordering;

/// Interpolation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplineType {
    /// Piecewise linear
    Linear,
    /// Single polynomial through all points
    Polynomial,
    /// Cubic spline with natural boundary conditions
    Cubic,
    /// Cubic spline with periodic boundary conditions
    CubicPeriodic,
    /// Akima spline with natural boundary conditions
    Akima,
    /// Akima spline with periodic boundary conditions
    AkimaPeriodic,
}

impl SplineType {
    /// Minimum number of points
    pub fn min_size(&self) -> usize {
        match self {
            Self::Linear => 2,
            Self::Polynomial => 3,
            Self::Cubic => 3,
            Self::CubicPeriodic => 2,
            Self::Akima => 5,
            Self::AkimaPeriodic => 5,
        }
    }
}

#[derive(Debug, Clone)]
enum Coefficients {
    // y = y_i + b_i t + c_i t^2 + d_i t^3 with t = x - x_i on interval i.
    Piecewise {
        b: Vec<f64>,
        c: Vec<f64>,
        d: Vec<f64>,
    },
    // y = sum_k c_k t^k with t = x - x_0.
    Polynomial(Vec<f64>),
}

/// An interpolating function through a set of points
///
/// A spline is immutable after construction and can be shared between threads.
#[derive(Debug, Clone)]
pub struct Spline {
    kind: SplineType,
    xa: Vec<f64>,
    ya: Vec<f64>,
    coefficients: Coefficients,
}

impl Spline {
    /// Interpolate the points `(xa[i], ya[i])`
    ///
    /// `xa` must be strictly increasing.
    pub fn new(kind: SplineType, xa: &[f64], ya: &[f64]) -> Result<Self> {
        if xa.len() != ya.len() {
            return Err(NumericalError::BadLen.into());
        }
        if xa.len() < kind.min_size() {
            return Err(NumericalError::Invalid.into());
        }
        if xa.windows(2).any(|w| w[1].partial_cmp(&w[0]) != Some(Ordering::Greater)) {
            return Err(NumericalError::Invalid.into());
        }

        let coefficients = match kind {
            SplineType::Linear => linear(xa, ya),
            SplineType::Polynomial => Coefficients::Polynomial(taylor(xa, ya)),
            SplineType::Cubic => cubic(xa, ya, &natural_curvature(xa, ya)?),
            SplineType::CubicPeriodic => cubic(xa, ya, &periodic_curvature(xa, ya)?),
            SplineType::Akima => akima(xa, ya, false),
            SplineType::AkimaPeriodic => akima(xa, ya, true),
        };

        Ok(Self {
            kind,
            xa: xa.to_vec(),
            ya: ya.to_vec(),
            coefficients,
        })
    }

    /// Interpolation method
    pub fn kind(&self) -> SplineType {
        self.kind
    }

    /// Smallest x value
    pub fn xmin(&self) -> f64 {
        self.xa[0]
    }

    /// Largest x value
    pub fn xmax(&self) -> f64 {
        self.xa[self.xa.len() - 1]
    }

    fn check(&self, x: f64) -> Result<()> {
        if x >= self.xmin() && x <= self.xmax() {
            Ok(())
        } else {
            Err(NumericalError::Domain.into())
        }
    }

    fn interval(&self, x: f64) -> usize {
        let i = self.xa.partition_point(|&v| v <= x);
        i.clamp(1, self.xa.len() - 1) - 1
    }

    /// Interpolated value at `x`
    pub fn eval(&self, x: f64) -> Result<f64> {
        self.check(x)?;
        Ok(match &self.coefficients {
            Coefficients::Piecewise { b, c, d } => {
                let i = self.interval(x);
                let t = x - self.xa[i];
                self.ya[i] + t * (b[i] + t * (c[i] + t * d[i]))
            }
            Coefficients::Polynomial(coeffs) => {
                let t = x - self.xa[0];
                coeffs.iter().rev().fold(0.0, |acc, c| acc * t + c)
            }
        })
    }

    /// Derivative of the interpolating function at `x`
    pub fn deriv(&self, x: f64) -> Result<f64> {
        self.check(x)?;
        Ok(match &self.coefficients {
            Coefficients::Piecewise { b, c, d } => {
                let i = self.interval(x);
                let t = x - self.xa[i];
                b[i] + t * (2.0 * c[i] + 3.0 * t * d[i])
            }
            Coefficients::Polynomial(coeffs) => {
                let t = x - self.xa[0];
                coeffs
                    .iter()
                    .enumerate()
                    .skip(1)
                    .rev()
                    .fold(0.0, |acc, (k, c)| acc * t + k as f64 * c)
            }
        })
    }

    /// Integral of the interpolating function from `lo` to `hi`
    pub fn integrate(&self, lo: f64, hi: f64) -> Result<f64> {
        if lo > hi {
            return Err(NumericalError::Domain.into());
        }
        self.check(lo)?;
        self.check(hi)?;
        if lo == hi {
            return Ok(0.0);
        }
        Ok(match &self.coefficients {
            Coefficients::Piecewise { b, c, d } => {
                let mut sum = 0.0;
                for i in self.interval(lo)..=self.interval(hi) {
                    let x0 = self.xa[i];
                    let t0 = lo.max(x0) - x0;
                    let t1 = hi.min(self.xa[i + 1]) - x0;
                    let antiderivative = |t: f64| {
                        t * (self.ya[i] + t * (b[i] / 2.0 + t * (c[i] / 3.0 + t * d[i] / 4.0)))
                    };
                    sum += antiderivative(t1) - antiderivative(t0);
                }
                sum
            }
            Coefficients::Polynomial(coeffs) => {
                let antiderivative = |t: f64| {
                    coeffs
                        .iter()
                        .enumerate()
                        .rev()
                        .fold(0.0, |acc, (k, c)| acc * t + c / (k + 1) as f64)
                        * t
                };
                antiderivative(hi - self.xa[0]) - antiderivative(lo - self.xa[0])
            }
        })
    }
}

fn slopes(xa: &[f64], ya: &[f64]) -> Vec<f64> {
    xa.windows(2)
        .zip(ya.windows(2))
        .map(|(x, y)| (y[1] - y[0]) / (x[1] - x[0]))
        .collect()
}

fn linear(xa: &[f64], ya: &[f64]) -> Coefficients {
    let n = xa.len() - 1;
    Coefficients::Piecewise {
        b: slopes(xa, ya),
        c: vec![0.0; n],
        d: vec![0.0; n],
    }
}

// Newton divided differences, converted to Taylor coefficients about xa[0].
fn taylor(xa: &[f64], ya: &[f64]) -> Vec<f64> {
    let n = xa.len();
    let mut dd = ya.to_vec();
    for j in 1..n {
        for i in (j..n).rev() {
            dd[i] = (dd[i] - dd[i - 1]) / (xa[i] - xa[i - j]);
        }
    }

    // Horner on the Newton form: p <- p * (t + x0 - x_k) + dd_k.
    let mut poly = vec![dd[n - 1]];
    for k in (0..n - 1).rev() {
        let shift = xa[0] - xa[k];
        let mut next = vec![0.0; poly.len() + 1];
        for (j, p) in poly.iter().enumerate() {
            next[j + 1] += p;
            next[j] += shift * p;
        }
        next[0] += dd[k];
        poly = next;
    }
    poly
}

// Solve a tridiagonal system. Row i is sub[i] x[i-1] + diag[i] x[i] + sup[i] x[i+1] = rhs[i].
fn solve_tridiagonal(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Result<Vec<f64>> {
    let n = diag.len();
    let mut c = vec![0.0; n];
    let mut d = vec![0.0; n];
    for i in 0..n {
        let (cp, dp) = if i == 0 { (0.0, 0.0) } else { (c[i - 1], d[i - 1]) };
        let s = if i == 0 { 0.0 } else { sub[i] };
        let denom = diag[i] - s * cp;
        if denom == 0.0 {
            return Err(NumericalError::Singular.into());
        }
        c[i] = sup[i] / denom;
        d[i] = (rhs[i] - s * dp) / denom;
    }
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        x[i] = if i == n - 1 { d[i] } else { d[i] - c[i] * x[i + 1] };
    }
    Ok(x)
}

// Second derivatives of a natural cubic spline.
fn natural_curvature(xa: &[f64], ya: &[f64]) -> Result<Vec<f64>> {
    let n = xa.len();
    let h = xa.windows(2).map(|w| w[1] - w[0]).collect::<Vec<_>>();
    let s = slopes(xa, ya);
    let m = n - 2;

    let sub = (1..=m).map(|i| h[i - 1]).collect::<Vec<_>>();
    let diag = (1..=m)
        .map(|i| 2.0 * (h[i - 1] + h[i]))
        .collect::<Vec<_>>();
    let sup = (1..=m).map(|i| h[i]).collect::<Vec<_>>();
    let rhs = (1..=m)
        .map(|i| 6.0 * (s[i] - s[i - 1]))
        .collect::<Vec<_>>();

    let inner = solve_tridiagonal(&sub, &diag, &sup, &rhs)?;
    let mut curvature = vec![0.0; n];
    curvature[1..=m].copy_from_slice(&inner);
    Ok(curvature)
}

// Second derivatives of a periodic cubic spline. The last point repeats the first.
fn periodic_curvature(xa: &[f64], ya: &[f64]) -> Result<Vec<f64>> {
    let n = xa.len();
    let h = xa.windows(2).map(|w| w[1] - w[0]).collect::<Vec<_>>();
    let s = slopes(xa, ya);
    let m = n - 1;
    let prev = |i: usize| (i + m - 1) % m;

    let sub = (0..m).map(|i| h[prev(i)]).collect::<Vec<_>>();
    let diag = (0..m)
        .map(|i| 2.0 * (h[prev(i)] + h[i]))
        .collect::<Vec<_>>();
    let sup = h.clone();
    let rhs = (0..m)
        .map(|i| 6.0 * (s[i] - s[prev(i)]))
        .collect::<Vec<_>>();

    let inner = match m {
        1 => vec![0.0],
        2 => {
            let a = diag[0];
            let b = sub[0] + sup[0];
            let c = sub[1] + sup[1];
            let d = diag[1];
            let det = a * d - b * c;
            if det == 0.0 {
                return Err(NumericalError::Singular.into());
            }
            vec![(rhs[0] * d - b * rhs[1]) / det, (a * rhs[1] - c * rhs[0]) / det]
        }
        _ => {
            // Sherman-Morrison on the cyclic tridiagonal system.
            let alpha = sup[m - 1];
            let beta = sub[0];
            let gamma = -diag[0];
            let mut bb = diag.clone();
            bb[0] -= gamma;
            bb[m - 1] -= alpha * beta / gamma;
            let mut x = solve_tridiagonal(&sub, &bb, &sup, &rhs)?;
            let mut u = vec![0.0; m];
            u[0] = gamma;
            u[m - 1] = alpha;
            let z = solve_tridiagonal(&sub, &bb, &sup, &u)?;
            let fact = (x[0] + beta * x[m - 1] / gamma) / (1.0 + z[0] + beta * z[m - 1] / gamma);
            for (xi, zi) in x.iter_mut().zip(&z) {
                *xi -= fact * zi;
            }
            x
        }
    };

    let mut curvature = inner;
    curvature.push(curvature[0]);
    Ok(curvature)
}

fn cubic(xa: &[f64], ya: &[f64], curvature: &[f64]) -> Coefficients {
    let n = xa.len() - 1;
    let s = slopes(xa, ya);
    let mut b = Vec::with_capacity(n);
    let mut c = Vec::with_capacity(n);
    let mut d = Vec::with_capacity(n);
    for i in 0..n {
        let h = xa[i + 1] - xa[i];
        b.push(s[i] - h * (2.0 * curvature[i] + curvature[i + 1]) / 6.0);
        c.push(curvature[i] / 2.0);
        d.push((curvature[i + 1] - curvature[i]) / (6.0 * h));
    }
    Coefficients::Piecewise { b, c, d }
}

fn akima(xa: &[f64], ya: &[f64], periodic: bool) -> Coefficients {
    let n = xa.len();
    let s = slopes(xa, ya);
    let k = n - 1;

    // Slopes m[-2], ..., m[n], stored with an offset of 2.
    let mut m = vec![0.0; n + 3];
    m[2..k + 2].copy_from_slice(&s);
    if periodic {
        m[0] = s[k - 2];
        m[1] = s[k - 1];
        m[k + 2] = s[0];
        m[k + 3] = s[1];
    } else {
        m[1] = 2.0 * s[0] - s[1];
        m[0] = 3.0 * s[0] - 2.0 * s[1];
        m[k + 2] = 2.0 * s[k - 1] - s[k - 2];
        m[k + 3] = 3.0 * s[k - 1] - 2.0 * s[k - 2];
    }

    // Derivative at each point from the slopes of the two intervals on either side.
    let t = (0..n)
        .map(|i| {
            let (m2, m1, m0, p1) = (m[i], m[i + 1], m[i + 2], m[i + 3]);
            let w1 = (p1 - m0).abs();
            let w2 = (m1 - m2).abs();
            if w1 + w2 == 0.0 {
                0.5 * (m1 + m0)
            } else {
                (w1 * m1 + w2 * m0) / (w1 + w2)
            }
        })
        .collect::<Vec<_>>();

    let mut b = Vec::with_capacity(k);
    let mut c = Vec::with_capacity(k);
    let mut d = Vec::with_capacity(k);
    for i in 0..k {
        let h = xa[i + 1] - xa[i];
        b.push(t[i]);
        c.push((3.0 * s[i] - 2.0 * t[i] - t[i + 1]) / h);
        d.push((t[i] + t[i + 1] - 2.0 * s[i]) / (h * h));
    }
    Coefficients::Piecewise { b, c, d }
}
