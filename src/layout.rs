//! Ownership layouts of distributed index spaces
use crate::{Error, Result};
use itertools::Itertools;
use mpi::traits::{Communicator, CommunicatorCollectives};
use std::ops::Range;

/// Contiguous partition of a global index space over the ranks of a communicator
///
/// Rank `r` owns the global indices `offsets[r]..offsets[r + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLayout {
    offsets: Vec<usize>,
}

impl IndexLayout {
    /// Create a layout from the number of indices owned by each rank
    pub fn from_counts(counts: &[usize]) -> Self {
        let mut offsets = Vec::with_capacity(counts.len() + 1);
        offsets.push(0);
        for c in counts {
            offsets.push(offsets.last().unwrap_or(&0) + c);
        }
        Self { offsets }
    }

    /// Create a layout by gathering the local count of every rank
    ///
    /// This is a collective operation.
    pub fn from_local_counts(local: usize, comm: &impl Communicator) -> Self {
        let mut counts = vec![0usize; comm.size() as usize];
        comm.all_gather_into(&local, &mut counts[..]);
        Self::from_counts(&counts)
    }

    /// Create a layout from an optional local and an optional global size
    ///
    /// If only the global size is given, it is split with [IndexLayout::partition] and no
    /// communication takes place. Otherwise the local sizes are gathered and, if a global size was
    /// also given, checked against it.
    pub fn new(
        local: Option<usize>,
        global: Option<usize>,
        comm: &impl Communicator,
    ) -> Result<Self> {
        let size = comm.size() as usize;
        match (local, global) {
            (None, None) => Err(Error::MissingSize),
            (None, Some(global)) => Ok(Self::from_counts(
                &(0..size)
                    .map(|rank| Self::partition(global, rank, size))
                    .collect_vec(),
            )),
            (Some(local), global) => {
                let layout = Self::from_local_counts(local, comm);
                match global {
                    Some(global) if global != layout.global_count() => Err(Error::SizeMismatch {
                        local: layout.global_count(),
                        global,
                    }),
                    _ => Ok(layout),
                }
            }
        }
    }

    /// Number of indices a rank owns when `global` indices are split as evenly as possible
    ///
    /// The first `global % size` ranks receive one more index than the others.
    pub fn partition(global: usize, rank: usize, size: usize) -> usize {
        global / size + usize::from(rank < global % size)
    }

    /// Number of ranks
    pub fn nranks(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Offsets of every rank, followed by the global count
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Counts of every rank
    pub fn counts(&self) -> Vec<usize> {
        self.offsets
            .iter()
            .tuple_windows()
            .map(|(a, b)| b - a)
            .collect()
    }

    /// Range of global indices owned by `rank`
    pub fn local_range(&self, rank: usize) -> Range<usize> {
        self.offsets[rank]..self.offsets[rank + 1]
    }

    /// Number of indices owned by `rank`
    pub fn local_count(&self, rank: usize) -> usize {
        self.offsets[rank + 1] - self.offsets[rank]
    }

    /// Total number of indices
    pub fn global_count(&self) -> usize {
        *self.offsets.last().unwrap_or(&0)
    }

    /// The rank owning a global index
    pub fn owner_of(&self, index: usize) -> Result<usize> {
        if index >= self.global_count() {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.global_count(),
            });
        }
        Ok(self.offsets.partition_point(|&o| o <= index) - 1)
    }

    /// Scale every count by `factor`
    pub(crate) fn scaled(&self, factor: usize) -> Self {
        Self {
            offsets: self.offsets.iter().map(|o| o * factor).collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partition() {
        let counts = (0..4).map(|r| IndexLayout::partition(10, r, 4)).collect_vec();
        assert_eq!(counts, vec![3, 3, 2, 2]);
        assert_eq!(counts.iter().sum::<usize>(), 10);

        for r in 0..3 {
            assert_eq!(IndexLayout::partition(9, r, 3), 3);
        }
        assert_eq!(IndexLayout::partition(2, 3, 4), 0);
    }

    #[test]
    fn test_offsets() {
        let layout = IndexLayout::from_counts(&[3, 0, 2, 5]);
        assert_eq!(layout.offsets(), &[0, 3, 3, 5, 10]);
        assert_eq!(layout.nranks(), 4);
        assert_eq!(layout.global_count(), 10);
        assert_eq!(layout.local_range(2), 3..5);
        assert_eq!(layout.local_count(1), 0);
        assert_eq!(layout.counts(), vec![3, 0, 2, 5]);
    }

    #[test]
    fn test_owner_of() {
        let layout = IndexLayout::from_counts(&[3, 0, 2, 5]);
        assert_eq!(layout.owner_of(0).unwrap(), 0);
        assert_eq!(layout.owner_of(2).unwrap(), 0);
        assert_eq!(layout.owner_of(3).unwrap(), 2);
        assert_eq!(layout.owner_of(5).unwrap(), 3);
        assert_eq!(layout.owner_of(9).unwrap(), 3);
        assert!(matches!(
            layout.owner_of(10),
            Err(Error::IndexOutOfBounds { index: 10, size: 10 })
        ));
    }

    #[test]
    fn test_scaled() {
        let layout = IndexLayout::from_counts(&[1, 2]).scaled(3);
        assert_eq!(layout.offsets(), &[0, 3, 9]);
    }
}
