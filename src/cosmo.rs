//! Cosmology
//!
//! Background expansion and line-of-sight comoving distances.
use crate::numerics::{
    integrate::{qags, Workspace},
    Interval, Tolerance,
};
use crate::traits::Hubble;
use crate::{NumericalError, Result};
use itertools::Itertools;
use log::trace;

/// Speed of light in km/s
pub const C_LIGHT: f64 = 299792.458;

/// Convert a scale factor to a redshift
pub fn a_to_z(a: f64) -> f64 {
    1.0 / a - 1.0
}

/// Convert a redshift to a scale factor
pub fn z_to_a(z: f64) -> f64 {
    1.0 / (1.0 + z)
}

/// A Lambda-CDM cosmology
///
/// The densities are stored as physical densities, i.e. multiplied by h^2.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lcdm {
    h: f64,
    om: f64,
    ode: f64,
    omk: f64,
}

impl Lcdm {
    /// A flat cosmology with matter density `om0` and dimensionless Hubble constant `h`
    pub fn new_flat_simple(om0: f64, h: f64) -> Self {
        Self::new(om0, 1.0 - om0, h)
    }

    /// A cosmology with matter density `om0` and dark energy density `ode0`
    ///
    /// The curvature density is set so that the densities sum to one.
    pub fn new(om0: f64, ode0: f64, h: f64) -> Self {
        let h2 = h * h;
        Self {
            h,
            om: om0 * h2,
            ode: ode0 * h2,
            omk: (1.0 - om0 - ode0) * h2,
        }
    }

    /// Dimensionless Hubble constant today
    pub fn h(&self) -> f64 {
        self.h
    }

    /// Matter density parameter today
    pub fn omega_m(&self) -> f64 {
        self.om / (self.h * self.h)
    }

    /// Dark energy density parameter today
    pub fn omega_de(&self) -> f64 {
        self.ode / (self.h * self.h)
    }

    /// Curvature density parameter today
    pub fn omega_k(&self) -> f64 {
        self.omk / (self.h * self.h)
    }
}

impl Hubble for Lcdm {
    fn hubble(&self, a: f64) -> f64 {
        (self.om / (a * a * a) + self.omk / (a * a) + self.ode).sqrt()
    }
}

/// Line-of-sight comoving distances to each of the scale factors in `avals`
///
/// Distances are in Mpc, or in Mpc/h if the cosmology has h = 1. The results are in the same order
/// as `avals`. The integral is computed between successive scale factors and accumulated, so
/// passing many scale factors at once is cheaper than one call per value.
pub fn comoving_distance(cosmology: &impl Hubble, avals: &[f64]) -> Result<Vec<f64>> {
    if avals.iter().any(|&a| a.is_nan() || a <= 0.0) {
        return Err(NumericalError::Domain.into());
    }

    let order = (0..avals.len())
        .sorted_by(|&i, &j| avals[j].total_cmp(&avals[i]))
        .collect_vec();

    let integrand = |a: f64| 1.0 / (a * a * cosmology.hubble(a));
    let tol = Tolerance::new(1e-7, 1e-7);
    let mut workspace = Workspace::new(1000);

    let mut distances = vec![0.0; avals.len()];
    let mut total = 0.0;
    let mut previous = 1.0;
    for i in order {
        let a = avals[i];
        let segment = qags(integrand, Interval::new(a, previous), tol, &mut workspace)?;
        trace!("segment [{a}, {previous}] = {}", segment.value);
        total += segment.value;
        previous = a;
        distances[i] = total * C_LIGHT / 100.0;
    }
    Ok(distances)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_a_to_z() {
        assert_abs_diff_eq!(a_to_z(1.0), 0.0, epsilon = 1e-8);
        assert_abs_diff_eq!(a_to_z(0.5), 1.0, epsilon = 1e-8);
        assert_abs_diff_eq!(a_to_z(0.25), 3.0, epsilon = 1e-8);
    }

    #[test]
    fn test_z_to_a() {
        assert_abs_diff_eq!(z_to_a(0.0), 1.0, epsilon = 1e-8);
        assert_abs_diff_eq!(z_to_a(1.0), 0.5, epsilon = 1e-8);
        assert_abs_diff_eq!(z_to_a(3.0), 0.25, epsilon = 1e-8);
    }

    #[test]
    fn test_inverse() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..1000 {
            let a = 1.0 - rng.gen::<f64>();
            assert_relative_eq!(z_to_a(a_to_z(a)), a, max_relative = 1e-8);
            let z = 100.0 * rng.gen::<f64>();
            assert_relative_eq!(a_to_z(z_to_a(z)), z, epsilon = 1e-8, max_relative = 1e-8);
        }
    }

    #[test]
    fn test_flat() {
        let c = Lcdm::new_flat_simple(0.3, 0.7);
        assert_abs_diff_eq!(c.hubble(1.0), 0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(c.omega_k(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.omega_de(), 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_curved() {
        let c = Lcdm::new(0.3, 0.6, 1.0);
        assert_abs_diff_eq!(c.omega_k(), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(c.hubble(1.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            c.hubble(0.5),
            (0.3 * 8.0 + 0.1 * 4.0 + 0.6_f64).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_comoving_distance() {
        // Reference values from Ned Wright's cosmology calculator
        let zvals = [0.1, 0.3, 0.7, 1.0, 2.0];
        let expected = [413.5, 1185.3, 2505.2, 3317.1, 5244.3];
        let avals = zvals.map(z_to_a);
        let c = Lcdm::new_flat_simple(0.27, 0.71);
        let distances = comoving_distance(&c, &avals).unwrap();
        for (d, e) in distances.iter().zip(expected) {
            assert_relative_eq!(*d, e, max_relative = 1e-3);
        }
    }

    #[test]
    fn test_unsorted() {
        let c = Lcdm::new_flat_simple(0.27, 1.0);
        let sorted = comoving_distance(&c, &[0.9, 0.5, 0.3]).unwrap();
        let shuffled = comoving_distance(&c, &[0.5, 0.3, 0.9]).unwrap();
        assert_relative_eq!(sorted[0], shuffled[2], max_relative = 1e-10);
        assert_relative_eq!(sorted[1], shuffled[0], max_relative = 1e-10);
        assert_relative_eq!(sorted[2], shuffled[1], max_relative = 1e-10);
        assert_abs_diff_eq!(comoving_distance(&c, &[1.0]).unwrap()[0], 0.0);
    }

    #[test]
    fn test_domain() {
        let c = Lcdm::new_flat_simple(0.27, 1.0);
        assert!(comoving_distance(&c, &[0.5, 0.0]).is_err());
    }
}
