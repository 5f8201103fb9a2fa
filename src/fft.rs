//! Slab layouts for distributed real-to-complex FFTs
//!
//! The real grid is split along its first dimension. The complex output is stored transposed, with
//! its first two dimensions swapped, and split along the (untransposed) second dimension.
use crate::traits::Gridder;
use crate::{Error, Result};
use itertools::Itertools;
use mpi::traits::Communicator;
use std::fmt;

/// The part of a block distributed dimension owned by one rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LocalRange {
    /// Number of locally owned indices
    pub count: usize,
    /// First locally owned index
    pub start: usize,
}

impl LocalRange {
    // Blocks of ceil(n / size), so trailing ranks may own nothing.
    fn block(n: usize, rank: usize, size: usize) -> Self {
        let block = n.div_ceil(size);
        let start = (rank * block).min(n);
        Self {
            count: block.min(n - start),
            start,
        }
    }

    /// One past the last locally owned index
    pub fn end(&self) -> usize {
        self.start + self.count
    }
}

/// The local layout of a real-to-complex transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransposedSize {
    /// Number of real values to allocate locally
    pub alloc: usize,
    /// Local part of the first dimension, before the transform
    pub n0: LocalRange,
    /// Local part of the second dimension, in the transposed output
    pub n1: LocalRange,
}

fn check_dims(dims: &[usize]) -> Result<()> {
    if dims.len() < 2 {
        return Err(Error::InvalidArgument(format!(
            "a slab decomposed grid needs at least two dimensions, got {}",
            dims.len()
        )));
    }
    if dims.contains(&0) {
        return Err(Error::InvalidArgument(format!(
            "grid dimensions must be positive, got {dims:?}"
        )));
    }
    Ok(())
}

// Dimensions of the complex output, last dimension halved.
fn complex_dims(dims: &[usize]) -> Vec<usize> {
    let mut cdims = dims.to_vec();
    if let Some(last) = cdims.last_mut() {
        *last = *last / 2 + 1;
    }
    cdims
}

/// The local layout of a real-to-complex transform of a real grid with dimensions `dims`
///
/// The allocation is large enough for both the real input and the transposed complex output,
/// counted in real values.
pub fn local_size_transposed(dims: &[usize], rank: usize, size: usize) -> Result<TransposedSize> {
    check_dims(dims)?;
    if rank >= size {
        return Err(Error::InvalidRank { rank, size });
    }
    let cdims = complex_dims(dims);
    let n0 = LocalRange::block(cdims[0], rank, size);
    let n1 = LocalRange::block(cdims[1], rank, size);

    let rest = cdims[2..].iter().product::<usize>();
    let untransposed = n0.count * cdims[1] * rest;
    let transposed = n1.count * cdims[0] * rest;

    Ok(TransposedSize {
        alloc: 2 * untransposed.max(transposed),
        n0,
        n1,
    })
}

/// One rank's part of a slab decomposed grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlabGrid {
    dims: Vec<usize>,
    strides: Vec<usize>,
    lo: Vec<usize>,
    hi: Vec<usize>,
    alloc: usize,
}

fn row_major_strides(dims: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; dims.len()];
    for i in (0..dims.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * dims[i + 1];
    }
    strides
}

impl SlabGrid {
    /// The real and complex grids of a transform of a real grid with dimensions `dims`
    ///
    /// This is a collective operation only in the sense that every rank must agree on `dims`; no
    /// communication is needed.
    pub fn new<C: Communicator>(comm: &C, dims: &[usize]) -> Result<(Self, Self)> {
        Self::for_rank(dims, comm.rank() as usize, comm.size() as usize)
    }

    /// The real and complex grids of rank `rank` out of `size`
    pub fn for_rank(dims: &[usize], rank: usize, size: usize) -> Result<(Self, Self)> {
        let layout = local_size_transposed(dims, rank, size)?;
        Ok((
            Self::real(dims, layout.n0, layout.alloc),
            Self::complex(dims, layout.n1, layout.alloc),
        ))
    }

    // Real grid: the last dimension is padded to 2 (n/2 + 1) in storage.
    fn real(dims: &[usize], n0: LocalRange, alloc: usize) -> Self {
        let mut padded = complex_dims(dims);
        if let Some(last) = padded.last_mut() {
            *last *= 2;
        }
        let mut lo = vec![0; dims.len()];
        let mut hi = dims.to_vec();
        lo[0] = n0.start;
        hi[0] = n0.end();
        Self {
            dims: dims.to_vec(),
            strides: row_major_strides(&padded),
            lo,
            hi,
            alloc,
        }
    }

    // Complex grid: storage has the two leading dimensions swapped. Strides are reported in
    // untransposed order.
    fn complex(dims: &[usize], n1: LocalRange, alloc: usize) -> Self {
        let cdims = complex_dims(dims);
        let mut transposed = cdims.clone();
        transposed.swap(0, 1);
        let mut strides = row_major_strides(&transposed);
        strides.swap(0, 1);
        let mut lo = vec![0; cdims.len()];
        let mut hi = cdims.clone();
        lo[1] = n1.start;
        hi[1] = n1.end();
        Self {
            dims: cdims,
            strides,
            lo,
            hi,
            alloc,
        }
    }

    /// Number of real values to allocate locally
    pub fn alloc(&self) -> usize {
        self.alloc
    }

    /// The offset of a local point in the local storage
    ///
    /// `index` is a global index in untransposed order.
    pub fn offset(&self, index: &[usize]) -> Result<usize> {
        if index.len() != self.dims.len() {
            return Err(Error::LengthMismatch(index.len(), self.dims.len()));
        }
        for (i, &ix) in index.iter().enumerate() {
            if ix < self.lo[i] || ix >= self.hi[i] {
                return Err(Error::IndexOutOfBounds {
                    index: ix,
                    size: self.hi[i],
                });
            }
        }
        Ok(index
            .iter()
            .zip(&self.lo)
            .zip(&self.strides)
            .map(|((ix, lo), stride)| (ix - lo) * stride)
            .sum())
    }
}

impl Gridder for SlabGrid {
    fn dimensions(&self) -> &[usize] {
        &self.dims
    }
    fn strides(&self) -> &[usize] {
        &self.strides
    }
    fn lo(&self) -> &[usize] {
        &self.lo
    }
    fn hi(&self) -> &[usize] {
        &self.hi
    }
}

impl fmt::Display for SlabGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dimensions : [{}]", self.dims.iter().join(" "))?;
        writeln!(f, "Stride : [{}]", self.strides.iter().join(" "))?;
        writeln!(f, "Lo : [{}]", self.lo.iter().join(" "))?;
        writeln!(f, "Hi : [{}]", self.hi.iter().join(" "))
    }
}
