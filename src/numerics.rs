//! Numerical routines
//!
//! Integration, interpolation, differentiation, Bessel functions and random numbers, with the
//! error codes of [crate::NumericalError].

pub mod deriv;
pub mod integrate;
pub mod random;
pub mod special;
pub mod spline;

/// An interval, which may be infinite in either direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Lower bound
    pub lo: f64,
    /// Upper bound
    pub hi: f64,
}

impl Interval {
    /// Create an interval
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }
}

/// Absolute and relative error tolerances
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Absolute tolerance
    pub abs: f64,
    /// Relative tolerance
    pub rel: f64,
}

impl Tolerance {
    /// Create a tolerance
    pub fn new(abs: f64, rel: f64) -> Self {
        Self { abs, rel }
    }

    /// The tolerance for a result of size `value`
    pub fn bound(&self, value: f64) -> f64 {
        self.abs.max(self.rel * value.abs())
    }
}

/// A result with an error estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Value
    pub value: f64,
    /// Estimated absolute error
    pub error: f64,
}
