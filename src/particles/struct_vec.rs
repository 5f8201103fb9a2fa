//! Distributed vectors of particle records
use super::RedistributionPlan;
use crate::{
    comm::agree,
    traits::Element,
    types::{InsertMode, ScatterMode},
    vector::{DistributedVec, IndexSet, VecScatter},
    Error, Result,
};
use itertools::Itertools;
use mpi::{
    collective::SystemOperation,
    traits::{Communicator, CommunicatorCollectives},
};
use std::ops::Range;

/// A distributed vector of particle records
pub struct ParticleVec<'a, C: Communicator, R: Element> {
    vec: DistributedVec<'a, C, R>,
}

impl<'a, C: Communicator, R: Element> ParticleVec<'a, C, R> {
    /// Create a vector of default records
    ///
    /// At least one of `local` and `global` must be given. This is a collective operation.
    pub fn new(comm: &'a C, local: Option<usize>, global: Option<usize>) -> Result<Self> {
        Ok(Self {
            vec: DistributedVec::new(comm, local, global)?,
        })
    }

    /// Create a vector from the records held by this rank
    ///
    /// This is a collective operation.
    pub fn from_local_records(comm: &'a C, records: Vec<R>) -> Self {
        Self {
            vec: DistributedVec::from_local_data(comm, records),
        }
    }

    /// The communicator
    pub fn comm(&self) -> &'a C {
        self.vec.comm()
    }

    /// Number of records on this rank
    pub fn nlocal(&self) -> usize {
        self.vec.local_size()
    }

    /// Total number of records
    pub fn ntotal(&self) -> usize {
        self.vec.global_size()
    }

    /// Range of global indices owned by this rank
    pub fn own_range(&self) -> Range<usize> {
        self.vec.own_range()
    }

    /// The underlying distributed vector
    pub fn vector(&self) -> &DistributedVec<'a, C, R> {
        &self.vec
    }

    /// Local records
    pub fn records(&self) -> &[R] {
        self.vec.data()
    }

    /// Local records, mutably
    pub fn records_mut(&mut self) -> &mut [R] {
        self.vec.data_mut()
    }

    /// Set records at global indices
    ///
    /// Records for other ranks are moved by [ParticleVec::assemble].
    pub fn set_values(&mut self, ix: &[usize], records: &[R]) -> Result<()> {
        self.vec.set_values(ix, records, InsertMode::Insert)
    }

    /// Move records set for other ranks to their owners
    ///
    /// This is a collective operation.
    pub fn assemble(&mut self) -> Result<()> {
        self.vec.assemble()
    }

    /// Redistribute records
    ///
    /// The local record `local_indices[k]` is sent to rank `dest_ranks[k]`. A record can be sent
    /// to several ranks and records that are not listed are dropped. Afterwards every rank holds
    /// the records sent to it, ordered by source rank and then by send order.
    ///
    /// This is a collective operation.
    pub fn scatter(&mut self, local_indices: &[usize], dest_ranks: &[usize]) -> Result<()> {
        let comm = self.vec.comm();
        let rank = comm.rank() as usize;
        let size = comm.size() as usize;

        let counts = agree(comm, self.send_counts(local_indices, dest_ranks))?;

        let nsend = dest_ranks.len();
        let mut global_count = 0_usize;
        comm.all_reduce_into(&nsend, &mut global_count, SystemOperation::sum());

        let mut matrix = vec![0_usize; size * size];
        comm.all_gather_into(&counts[..], &mut matrix[..]);

        let plan = agree(
            comm,
            RedistributionPlan::new(rank, size, &matrix, global_count, dest_ranks),
        )?;
        log::debug!(
            "rank {rank}: sending {nsend} records, receiving {} of {global_count}",
            plan.receive_count()
        );

        let start = self.vec.own_range().start;
        let from = IndexSet::general(local_indices.iter().map(|i| i + start).collect_vec());
        let to = IndexSet::general(plan.destination_offsets().to_vec());

        let mut redistributed = DistributedVec::from_layout(comm, plan.layout(), 1);
        let scatter = VecScatter::new(&self.vec, &from, &redistributed, &to)?;
        scatter.execute(
            &self.vec,
            &mut redistributed,
            InsertMode::Insert,
            ScatterMode::Forward,
        )?;
        self.vec = redistributed;
        Ok(())
    }

    fn send_counts(&self, local_indices: &[usize], dest_ranks: &[usize]) -> Result<Vec<usize>> {
        if local_indices.len() != dest_ranks.len() {
            return Err(Error::LengthMismatch(local_indices.len(), dest_ranks.len()));
        }
        let nlocal = self.nlocal();
        if let Some(&index) = local_indices.iter().find(|&&i| i >= nlocal) {
            return Err(Error::IndexOutOfBounds {
                index,
                size: nlocal,
            });
        }
        RedistributionPlan::count_destinations(dest_ranks, self.vec.comm().size() as usize)
    }
}
