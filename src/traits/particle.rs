//! Particles
use crate::Result;

pub trait Positioned {
    //! A record with a position

    /// Number of coordinates
    const DIM: usize;

    /// Coordinate along `axis`, for `axis < DIM`
    fn position(&self, axis: usize) -> f64;
}

pub trait Domainer<R> {
    //! Assignment of records to ranks

    /// Compute the records to send and their destination ranks
    ///
    /// Returns a pair of equal length lists `(local_indices, dest_ranks)`. A record may appear
    /// more than once, for example to create ghost copies, and records that do not appear are
    /// dropped.
    fn domain(&self, records: &[R]) -> Result<(Vec<usize>, Vec<usize>)>;
}
