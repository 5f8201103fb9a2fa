//! Distributed vector
use crate::{
    comm::{agree, all_to_all_varcount},
    layout::IndexLayout,
    traits::Element,
    types::InsertMode,
    Error, Result,
};
use itertools::{izip, Itertools};
use mpi::{
    collective::SystemOperation,
    traits::{Communicator, CommunicatorCollectives},
};
use std::ops::Range;

/// A vector whose entries are distributed over the ranks of a communicator
///
/// Each rank owns a contiguous range of global indices. Values for indices owned by other ranks
/// can be set locally and are moved to their owners by [DistributedVec::assemble].
pub struct DistributedVec<'a, C: Communicator, T: Element> {
    comm: &'a C,
    layout: IndexLayout,
    block_size: usize,
    // Owned values, followed by the ghost slots of a ghosted vector.
    data: Vec<T>,
    stash: Vec<(usize, T)>,
    pending: Option<InsertMode>,
}

fn check_block_size(local: Option<usize>, global: Option<usize>, block_size: usize) -> Result<()> {
    if block_size == 0 {
        return Err(Error::InvalidArgument("block size must be positive".into()));
    }
    for size in local.iter().chain(global.iter()) {
        if size % block_size != 0 {
            return Err(Error::BlockSize {
                size: *size,
                block_size,
            });
        }
    }
    Ok(())
}

impl<'a, C: Communicator, T: Element> DistributedVec<'a, C, T> {
    /// Create a new vector
    ///
    /// At least one of `local` and `global` must be given. This is a collective operation.
    pub fn new(comm: &'a C, local: Option<usize>, global: Option<usize>) -> Result<Self> {
        Self::new_blocked(comm, local, global, 1)
    }

    /// Create a new vector whose sizes are multiples of `block_size`
    pub fn new_blocked(
        comm: &'a C,
        local: Option<usize>,
        global: Option<usize>,
        block_size: usize,
    ) -> Result<Self> {
        agree(comm, check_block_size(local, global, block_size))?;
        let layout = IndexLayout::new(
            local.map(|n| n / block_size),
            global.map(|n| n / block_size),
            comm,
        )?
        .scaled(block_size);
        Ok(Self::from_layout(comm, layout, block_size))
    }

    /// Create a vector from the values owned by this rank
    ///
    /// This is a collective operation.
    pub fn from_local_data(comm: &'a C, data: Vec<T>) -> Self {
        let layout = IndexLayout::from_local_counts(data.len(), comm);
        Self {
            comm,
            layout,
            block_size: 1,
            data,
            stash: vec![],
            pending: None,
        }
    }

    pub(crate) fn from_layout(comm: &'a C, layout: IndexLayout, block_size: usize) -> Self {
        let nlocal = layout.local_count(comm.rank() as usize);
        Self {
            comm,
            layout,
            block_size,
            data: vec![T::default(); nlocal],
            stash: vec![],
            pending: None,
        }
    }

    /// The communicator
    pub fn comm(&self) -> &'a C {
        self.comm
    }

    /// The ownership layout
    pub fn layout(&self) -> &IndexLayout {
        &self.layout
    }

    /// Block size
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of locally owned values
    pub fn local_size(&self) -> usize {
        self.layout.local_count(self.comm.rank() as usize)
    }

    /// Global number of values
    pub fn global_size(&self) -> usize {
        self.layout.global_count()
    }

    /// Range of global indices owned by this rank
    pub fn own_range(&self) -> Range<usize> {
        self.layout.local_range(self.comm.rank() as usize)
    }

    /// Ownership ranges of all ranks
    ///
    /// Rank `r` owns `ranges()[r]..ranges()[r + 1]`.
    pub fn ranges(&self) -> &[usize] {
        self.layout.offsets()
    }

    /// Locally owned values
    pub fn data(&self) -> &[T] {
        &self.data[..self.local_size()]
    }

    /// Locally owned values, mutably
    pub fn data_mut(&mut self) -> &mut [T] {
        let n = self.local_size();
        &mut self.data[..n]
    }

    pub(crate) fn storage(&self) -> &[T] {
        &self.data
    }

    pub(crate) fn storage_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub(crate) fn resize_storage(&mut self, extra: usize) {
        self.data.resize(self.local_size() + extra, T::default());
    }

    /// Set every owned value to `value`
    pub fn set(&mut self, value: T) {
        self.data_mut().fill(value);
    }

    /// A new vector with the same layout, filled with default values
    pub fn duplicate(&self) -> Self {
        Self::from_layout(self.comm, self.layout.clone(), self.block_size)
    }

    /// Copy the owned values of `other` into this vector
    pub fn copy_from(&mut self, other: &Self) -> Result<()> {
        if self.layout != other.layout {
            return Err(Error::LayoutMismatch);
        }
        self.data_mut().copy_from_slice(other.data());
        Ok(())
    }

    /// Set values at global indices
    ///
    /// Owned values are combined immediately. Values for other ranks are stashed until
    /// [DistributedVec::assemble] is called. Insert and add cannot be mixed between two
    /// assemblies. Nothing is changed if any index is out of bounds.
    pub fn set_values(&mut self, ix: &[usize], values: &[T], mode: InsertMode) -> Result<()> {
        if ix.len() != values.len() {
            return Err(Error::LengthMismatch(ix.len(), values.len()));
        }
        if matches!(self.pending, Some(pending) if pending != mode) {
            return Err(Error::MixedInsertMode);
        }
        let global = self.global_size();
        if let Some(&index) = ix.iter().find(|&&i| i >= global) {
            return Err(Error::IndexOutOfBounds {
                index,
                size: global,
            });
        }
        self.pending = Some(mode);
        let range = self.own_range();
        for (&index, &value) in izip!(ix, values) {
            if range.contains(&index) {
                self.data[index - range.start].combine(value, mode)?;
            } else {
                self.stash.push((index, value));
            }
        }
        Ok(())
    }

    /// Set whole blocks of values
    ///
    /// `values` holds `block_size` values for each block index in `bix`.
    pub fn set_values_blocked(
        &mut self,
        bix: &[usize],
        values: &[T],
        mode: InsertMode,
    ) -> Result<()> {
        let bs = self.block_size;
        if bix.len() * bs != values.len() {
            return Err(Error::LengthMismatch(bix.len() * bs, values.len()));
        }
        let ix = bix
            .iter()
            .flat_map(|b| b * bs..(b + 1) * bs)
            .collect_vec();
        self.set_values(&ix, values, mode)
    }

    /// Move stashed values to their owners
    ///
    /// This is a collective operation.
    pub fn assemble(&mut self) -> Result<()> {
        let bits = self.pending.map_or(0, |m| m.bit());
        let mut all_bits = 0_u8;
        self.comm
            .all_reduce_into(&bits, &mut all_bits, SystemOperation::bitwise_or());
        self.pending = None;
        let stash = std::mem::take(&mut self.stash);

        if all_bits == 0 {
            return Ok(());
        }
        let mode = InsertMode::from_bits(all_bits).ok_or(Error::MixedInsertMode)?;

        let mut counts = vec![0; self.layout.nranks()];
        let mut owners = Vec::with_capacity(stash.len());
        for (index, _) in &stash {
            let owner = self.layout.owner_of(*index)?;
            counts[owner] += 1;
            owners.push(owner);
        }
        let order = (0..stash.len()).sorted_by_key(|&k| owners[k]).collect_vec();
        let indices = order.iter().map(|&k| stash[k].0).collect_vec();
        let values = order.iter().map(|&k| stash[k].1).collect_vec();

        let (_, recv_indices) = all_to_all_varcount(self.comm, &counts, &indices);
        let (_, recv_values) = all_to_all_varcount(self.comm, &counts, &values);

        log::debug!(
            "rank {}: sent {} stashed values, received {}",
            self.comm.rank(),
            stash.len(),
            recv_values.len()
        );

        let start = self.own_range().start;
        for (index, value) in izip!(recv_indices, recv_values) {
            self.data[index - start].combine(value, mode)?;
        }
        Ok(())
    }
}

impl<C: Communicator, T: Element + num::Zero> DistributedVec<'_, C, T> {
    /// Sum of all values
    ///
    /// This is a collective operation.
    pub fn sum(&self) -> T {
        let local = self.data().iter().fold(T::zero(), |acc, &x| acc + x);
        let mut global = T::zero();
        self.comm
            .all_reduce_into(&local, &mut global, SystemOperation::sum());
        global
    }
}
