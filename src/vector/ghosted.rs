//! Vectors with ghost values
use super::DistributedVec;
use crate::{
    comm::{agree, all_to_all_varcount},
    traits::Element,
    types::{InsertMode, Ownership},
    Error, Result,
};
use itertools::{izip, Itertools};
use mpi::traits::Communicator;

/// A distributed vector that also stores copies of some values owned by other ranks
///
/// The local form is the owned values followed by the ghost values, in the order the ghost
/// blocks were given.
pub struct GhostedVec<'a, C: Communicator, T: Element> {
    vec: DistributedVec<'a, C, T>,
    ghost_blocks: Vec<usize>,
    ghost_owners: Vec<usize>,
    // Ghost slots in the order their values arrive from the owners.
    recv_slots: Vec<usize>,
    request_counts: Vec<usize>,
    // Local offsets of the values other ranks hold as ghosts, grouped by requesting rank.
    send_local: Vec<usize>,
    send_counts: Vec<usize>,
}

impl<'a, C: Communicator, T: Element> GhostedVec<'a, C, T> {
    /// Create a ghosted vector with block size 1
    pub fn new(
        comm: &'a C,
        local: Option<usize>,
        global: Option<usize>,
        ghosts: &[usize],
    ) -> Result<Self> {
        Self::new_blocked(comm, local, global, 1, ghosts)
    }

    /// Create a ghosted vector
    ///
    /// `ghost_blocks` are global block indices. This is a collective operation.
    pub fn new_blocked(
        comm: &'a C,
        local: Option<usize>,
        global: Option<usize>,
        block_size: usize,
        ghost_blocks: &[usize],
    ) -> Result<Self> {
        let mut vec = DistributedVec::new_blocked(comm, local, global, block_size)?;
        let bs = block_size;
        let layout = vec.layout().clone();

        let ghost_owners = agree(
            comm,
            ghost_blocks
                .iter()
                .map(|b| layout.owner_of(b * bs))
                .collect::<Result<Vec<_>>>(),
        )?;

        let ghost_indices = ghost_blocks
            .iter()
            .flat_map(|b| b * bs..(b + 1) * bs)
            .collect_vec();
        let slot_owners = ghost_owners
            .iter()
            .flat_map(|&o| std::iter::repeat(o).take(bs))
            .collect_vec();

        let mut request_counts = vec![0; vec.layout().nranks()];
        for &o in &slot_owners {
            request_counts[o] += 1;
        }
        let recv_slots = (0..ghost_indices.len())
            .sorted_by_key(|&k| slot_owners[k])
            .collect_vec();
        let requests = recv_slots.iter().map(|&k| ghost_indices[k]).collect_vec();

        let (send_counts, requested) = all_to_all_varcount(comm, &request_counts, &requests);
        let start = vec.own_range().start;
        let send_local = requested.iter().map(|&i| i - start).collect_vec();

        vec.resize_storage(ghost_indices.len());

        Ok(Self {
            vec,
            ghost_blocks: ghost_blocks.to_vec(),
            ghost_owners,
            recv_slots,
            request_counts,
            send_local,
            send_counts,
        })
    }

    /// The underlying distributed vector
    pub fn vector(&self) -> &DistributedVec<'a, C, T> {
        &self.vec
    }

    /// The underlying distributed vector, mutably
    pub fn vector_mut(&mut self) -> &mut DistributedVec<'a, C, T> {
        &mut self.vec
    }

    /// Ghost block indices
    pub fn ghost_blocks(&self) -> &[usize] {
        &self.ghost_blocks
    }

    /// Owned values followed by ghost values
    pub fn local_form(&self) -> &[T] {
        self.vec.storage()
    }

    /// Owned values followed by ghost values, mutably
    pub fn local_form_mut(&mut self) -> &mut [T] {
        self.vec.storage_mut()
    }

    /// Ownership of a position in the local form
    pub fn ownership(&self, local_index: usize) -> Result<Ownership> {
        let nlocal = self.vec.local_size();
        let bs = self.vec.block_size();
        if local_index < nlocal {
            return Ok(Ownership::Owned);
        }
        let slot = local_index - nlocal;
        let (block, offset) = (slot / bs, slot % bs);
        match (self.ghost_blocks.get(block), self.ghost_owners.get(block)) {
            (Some(b), Some(&owner)) => Ok(Ownership::Ghost(
                owner,
                b * bs + offset - self.vec.layout().local_range(owner).start,
            )),
            _ => Err(Error::IndexOutOfBounds {
                index: local_index,
                size: nlocal + self.ghost_blocks.len() * bs,
            }),
        }
    }

    /// Copy the owners' values into the ghost slots
    ///
    /// This is a collective operation.
    pub fn update_ghosts(&mut self) {
        let data = self.vec.data();
        let values = self.send_local.iter().map(|&i| data[i]).collect_vec();
        let (_, received) = all_to_all_varcount(self.vec.comm(), &self.send_counts, &values);
        let nlocal = self.vec.local_size();
        let storage = self.vec.storage_mut();
        for (&slot, value) in izip!(&self.recv_slots, received) {
            storage[nlocal + slot] = value;
        }
    }

    /// Add the ghost values into the values of their owners
    ///
    /// This is a collective operation.
    pub fn accumulate_ghosts(&mut self) -> Result<()> {
        let nlocal = self.vec.local_size();
        let storage = self.vec.storage();
        let values = self
            .recv_slots
            .iter()
            .map(|&slot| storage[nlocal + slot])
            .collect_vec();
        let (_, received) = all_to_all_varcount(self.vec.comm(), &self.request_counts, &values);
        let data = self.vec.data_mut();
        for (&i, value) in izip!(&self.send_local, received) {
            data[i].combine(value, InsertMode::Add)?;
        }
        Ok(())
    }
}
