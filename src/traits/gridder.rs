//! Grids

pub trait Gridder {
    //! A locally stored piece of a regular grid

    /// Number of dimensions
    fn ndim(&self) -> usize {
        self.dimensions().len()
    }
    /// Dimensions of the grid
    fn dimensions(&self) -> &[usize];
    /// Strides of the local storage
    fn strides(&self) -> &[usize];
    /// Lower indices of the local part in each dimension
    fn lo(&self) -> &[usize];
    /// Upper indices of the local part in each dimension, exclusive
    fn hi(&self) -> &[usize];
    /// Number of locally stored points
    fn local_count(&self) -> usize {
        self.lo()
            .iter()
            .zip(self.hi())
            .map(|(lo, hi)| hi - lo)
            .product()
    }
}
