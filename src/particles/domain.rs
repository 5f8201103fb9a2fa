//! Domain decomposition
use super::ParticleVec;
use crate::{
    comm::agree,
    traits::{Domainer, Element, Positioned},
    Error, Result,
};
use mpi::traits::Communicator;

/// Decomposition of a periodic box into equal slabs along one axis
///
/// Slab `i` covers `[i * dx, (i + 1) * dx)` along `axis` with `dx = length / slabs`, and
/// records in slab `i` go to rank `i`. Coordinates outside `[0, length)` are wrapped
/// periodically. Assigning records fails if `axis` is not below the dimension of the records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slab {
    length: f64,
    slabs: usize,
    axis: usize,
}

impl Slab {
    /// Create a slab decomposition
    pub fn new(length: f64, slabs: usize, axis: usize) -> Result<Self> {
        if !length.is_finite() || length <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "box length must be positive, not {length}"
            )));
        }
        if slabs == 0 {
            return Err(Error::InvalidArgument("at least one slab is needed".into()));
        }
        Ok(Self {
            length,
            slabs,
            axis,
        })
    }

    /// One slab per rank of `comm`
    pub fn for_comm(comm: &impl Communicator, length: f64, axis: usize) -> Result<Self> {
        Self::new(length, comm.size() as usize, axis)
    }

    /// Box length
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Number of slabs
    pub fn slabs(&self) -> usize {
        self.slabs
    }

    /// Axis the box is cut along
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Width of a slab
    pub fn width(&self) -> f64 {
        self.length / self.slabs as f64
    }

    /// The slab containing coordinate `x`
    pub fn slab_of(&self, x: f64) -> usize {
        let i = (x / self.width()).floor() as i64;
        i.rem_euclid(self.slabs as i64) as usize
    }
}

impl<R: Positioned> Domainer<R> for Slab {
    fn domain(&self, records: &[R]) -> Result<(Vec<usize>, Vec<usize>)> {
        if self.axis >= R::DIM {
            return Err(Error::InvalidArgument(format!(
                "axis {} is out of range for {}-dimensional records",
                self.axis,
                R::DIM
            )));
        }
        Ok((
            (0..records.len()).collect(),
            records
                .iter()
                .map(|r| self.slab_of(r.position(self.axis)))
                .collect(),
        ))
    }
}

/// Send every record to the rank chosen by `domainer`
///
/// This is a collective operation.
pub fn domain_decompose<C: Communicator, R: Element, D: Domainer<R>>(
    domainer: &D,
    particles: &mut ParticleVec<'_, C, R>,
) -> Result<()> {
    let (local_indices, dest_ranks) =
        agree(particles.comm(), domainer.domain(particles.records()))?;
    particles.scatter(&local_indices, &dest_ranks)
}

#[cfg(test)]
mod test {
    use super::*;

    struct Point(f64, f64);

    impl Positioned for Point {
        const DIM: usize = 2;

        fn position(&self, axis: usize) -> f64 {
            if axis == 0 {
                self.0
            } else {
                self.1
            }
        }
    }

    #[test]
    fn test_slab_of() {
        let slab = Slab::new(100.0, 4, 0).unwrap();
        assert_eq!(slab.width(), 25.0);
        assert_eq!(slab.slab_of(0.0), 0);
        assert_eq!(slab.slab_of(24.999), 0);
        assert_eq!(slab.slab_of(25.0), 1);
        assert_eq!(slab.slab_of(99.9), 3);
    }

    #[test]
    fn test_slab_wraps() {
        let slab = Slab::new(100.0, 4, 0).unwrap();
        assert_eq!(slab.slab_of(100.0), 0);
        assert_eq!(slab.slab_of(130.0), 1);
        assert_eq!(slab.slab_of(-1.0), 3);
        assert_eq!(slab.slab_of(-100.0), 0);
    }

    #[test]
    fn test_domain() {
        let slab = Slab::new(1.0, 2, 1).unwrap();
        let points = [Point(0.9, 0.1), Point(0.1, 0.6), Point(0.5, 0.5)];
        let (ix, ranks) = slab.domain(&points).unwrap();
        assert_eq!(ix, vec![0, 1, 2]);
        assert_eq!(ranks, vec![0, 1, 1]);
    }

    #[test]
    fn test_invalid() {
        assert!(Slab::new(0.0, 2, 0).is_err());
        assert!(Slab::new(f64::NAN, 2, 0).is_err());
        assert!(Slab::new(1.0, 0, 0).is_err());
    }

    #[test]
    fn test_axis_out_of_range() {
        let points = [Point(0.9, 0.1)];
        let slab = Slab::new(1.0, 2, 2).unwrap();
        assert!(matches!(slab.domain(&points), Err(Error::InvalidArgument(_))));
        assert!(Slab::new(1.0, 2, 1).unwrap().domain(&points).is_ok());

        let records = [crate::particles::PosWeight::default()];
        let slab = Slab::new(1.0, 2, 3).unwrap();
        assert!(matches!(slab.domain(&records), Err(Error::InvalidArgument(_))));
    }
}
