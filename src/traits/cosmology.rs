//! Cosmology

pub trait Hubble {
    //! Expansion history

    /// Dimensionless Hubble rate h(a), such that H(a) = 100 h(a) km/s/Mpc
    fn hubble(&self, a: f64) -> f64;
}
