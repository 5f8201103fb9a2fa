//! Scatter contexts
use super::{DistributedVec, IndexSet};
use crate::{
    comm::{agree, all_to_all_varcount},
    layout::IndexLayout,
    traits::Element,
    types::{InsertMode, ScatterMode},
    Error, Result,
};
use itertools::{izip, Itertools};
use mpi::traits::Communicator;

/// A plan that moves values between two distributed vectors
///
/// The value at global index `ix_from[k]` of the source is sent to global index `ix_to[k]` of
/// the destination. Source indices must be owned by the calling rank, destination indices can
/// be owned by any rank. A reverse scatter moves values the other way, from `ix_to` back to
/// `ix_from`.
#[derive(Debug, Clone)]
pub struct VecScatter {
    src_layout: IndexLayout,
    dst_layout: IndexLayout,
    // Local source offsets, grouped by destination rank.
    send_local: Vec<usize>,
    send_counts: Vec<usize>,
    // Local destination offsets, in the order values arrive.
    recv_local: Vec<usize>,
    recv_counts: Vec<usize>,
}

impl VecScatter {
    /// Create a scatter plan
    ///
    /// This is a collective operation.
    pub fn new<C: Communicator, T: Element, U: Element>(
        src: &DistributedVec<'_, C, T>,
        ix_from: &IndexSet,
        dst: &DistributedVec<'_, C, U>,
        ix_to: &IndexSet,
    ) -> Result<Self> {
        let comm = src.comm();
        let from = ix_from.indices();
        let to = ix_to.indices();

        let owners = agree(comm, Self::destination_owners(src, &from, dst, &to))?;

        let mut send_counts = vec![0; dst.layout().nranks()];
        for &o in &owners {
            send_counts[o] += 1;
        }
        let order = (0..owners.len()).sorted_by_key(|&k| owners[k]).collect_vec();
        let src_start = src.own_range().start;
        let send_local = order.iter().map(|&k| from[k] - src_start).collect_vec();
        let targets = order.iter().map(|&k| to[k]).collect_vec();

        let (recv_counts, recv_targets) = all_to_all_varcount(comm, &send_counts, &targets);
        let dst_start = dst.own_range().start;
        let recv_local = recv_targets.iter().map(|&t| t - dst_start).collect_vec();

        Ok(Self {
            src_layout: src.layout().clone(),
            dst_layout: dst.layout().clone(),
            send_local,
            send_counts,
            recv_local,
            recv_counts,
        })
    }

    fn destination_owners<C: Communicator, T: Element, U: Element>(
        src: &DistributedVec<'_, C, T>,
        from: &[usize],
        dst: &DistributedVec<'_, C, U>,
        to: &[usize],
    ) -> Result<Vec<usize>> {
        if from.len() != to.len() {
            return Err(Error::LengthMismatch(from.len(), to.len()));
        }
        let range = src.own_range();
        let rank = src.comm().rank() as usize;
        izip!(from, to)
            .map(|(&f, &t)| {
                if range.contains(&f) {
                    dst.layout().owner_of(t)
                } else {
                    Err(Error::NonLocalIndex { index: f, rank })
                }
            })
            .collect()
    }

    /// Number of values this rank sends
    pub fn send_count(&self) -> usize {
        self.send_local.len()
    }

    /// Number of values this rank receives
    pub fn receive_count(&self) -> usize {
        self.recv_local.len()
    }

    /// Move values from `src` to `dst`
    ///
    /// In forward mode `src` has the source layout of the plan and `dst` its destination layout.
    /// In reverse mode the layouts swap roles: `src` has the destination layout and the value at
    /// `ix_to[k]` is combined into `ix_from[k]` of `dst`. This is a collective operation.
    pub fn execute<C: Communicator, T: Element>(
        &self,
        src: &DistributedVec<'_, C, T>,
        dst: &mut DistributedVec<'_, C, T>,
        mode: InsertMode,
        direction: ScatterMode,
    ) -> Result<()> {
        let (from_layout, to_layout, pick, counts, place) = match direction {
            ScatterMode::Forward => (
                &self.src_layout,
                &self.dst_layout,
                &self.send_local,
                &self.send_counts,
                &self.recv_local,
            ),
            ScatterMode::Reverse => (
                &self.dst_layout,
                &self.src_layout,
                &self.recv_local,
                &self.recv_counts,
                &self.send_local,
            ),
        };
        if src.layout() != from_layout || dst.layout() != to_layout {
            return Err(Error::LayoutMismatch);
        }
        let data = src.data();
        let values = pick.iter().map(|&i| data[i]).collect_vec();
        let (_, received) = all_to_all_varcount(src.comm(), counts, &values);
        let out = dst.data_mut();
        for (&i, value) in izip!(place, received) {
            out[i].combine(value, mode)?;
        }
        Ok(())
    }
}
