//! Redistribution plans
use crate::{layout::IndexLayout, Error, Result};
use itertools::Itertools;

/// Where each record of this rank goes when records are redistributed
///
/// The plan is built from the `size x size` matrix of send counts gathered from every rank,
/// where entry `source * size + dest` is the number of records `source` sends to `dest`.
/// Destination rank `d` receives `totals()[d]` records, stored at the global positions
/// `starts()[d]..starts()[d] + totals()[d]`, first the records from rank 0, then those from
/// rank 1 and so on. Within one source rank the send order is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedistributionPlan {
    rank: usize,
    totals: Vec<usize>,
    starts: Vec<usize>,
    first_slots: Vec<usize>,
    offsets: Vec<usize>,
}

impl RedistributionPlan {
    /// Count the records sent to each rank
    pub fn count_destinations(dest_ranks: &[usize], size: usize) -> Result<Vec<usize>> {
        let mut counts = vec![0; size];
        for &rank in dest_ranks {
            if rank >= size {
                return Err(Error::InvalidRank { rank, size });
            }
            counts[rank] += 1;
        }
        Ok(counts)
    }

    /// Build the plan of `rank`
    ///
    /// `counts` is the gathered send count matrix, `global_count` the total number of records
    /// sent by all ranks and `dest_ranks` the destination of each record this rank sends.
    pub fn new(
        rank: usize,
        size: usize,
        counts: &[usize],
        global_count: usize,
        dest_ranks: &[usize],
    ) -> Result<Self> {
        if counts.len() != size * size {
            return Err(Error::InconsistentPlan(format!(
                "send count matrix has {} entries for {} ranks",
                counts.len(),
                size
            )));
        }
        if rank >= size {
            return Err(Error::InvalidRank { rank, size });
        }

        let column = |dest: usize| (0..size).map(move |source| counts[source * size + dest]);
        let totals = (0..size).map(|d| column(d).sum::<usize>()).collect_vec();
        let before = (0..size)
            .map(|d| column(d).take(rank).sum::<usize>())
            .collect_vec();

        let mut starts = Vec::with_capacity(size);
        let mut running = 0;
        for t in &totals {
            starts.push(running);
            running += t;
        }
        if running != global_count {
            return Err(Error::InconsistentPlan(format!(
                "ranks receive {running} records in total but {global_count} are sent"
            )));
        }

        let first_slots = (0..size).map(|d| starts[d] + before[d]).collect_vec();
        let mut cursor = first_slots.clone();
        let mut offsets = Vec::with_capacity(dest_ranks.len());
        for &dest in dest_ranks {
            if dest >= size {
                return Err(Error::InvalidRank { rank: dest, size });
            }
            offsets.push(cursor[dest]);
            cursor[dest] += 1;
        }
        for dest in 0..size {
            if cursor[dest] != first_slots[dest] + counts[rank * size + dest] {
                return Err(Error::InconsistentPlan(format!(
                    "rank {rank} assigned {} records to rank {dest} but announced {}",
                    cursor[dest] - first_slots[dest],
                    counts[rank * size + dest]
                )));
            }
        }

        Ok(Self {
            rank,
            totals,
            starts,
            first_slots,
            offsets,
        })
    }

    /// Number of records each rank receives
    pub fn totals(&self) -> &[usize] {
        &self.totals
    }

    /// Global position of the first record each rank receives
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    /// Global position of the first record this rank sends to each rank
    pub fn first_slots(&self) -> &[usize] {
        &self.first_slots
    }

    /// Global destination position of each record this rank sends
    pub fn destination_offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Number of records this rank receives
    pub fn receive_count(&self) -> usize {
        self.totals[self.rank]
    }

    /// Total number of records after redistribution
    pub fn global_count(&self) -> usize {
        self.totals.iter().sum()
    }

    /// Ownership layout after redistribution
    pub fn layout(&self) -> IndexLayout {
        IndexLayout::from_counts(&self.totals)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // Send counts of three ranks:
    //   rank 0 sends 1 to 0, 2 to 1, 0 to 2
    //   rank 1 sends 0 to 0, 1 to 1, 3 to 2
    //   rank 2 sends 2 to 0, 0 to 1, 1 to 2
    const MATRIX: [usize; 9] = [1, 2, 0, 0, 1, 3, 2, 0, 1];

    #[test]
    fn test_count_destinations() {
        assert_eq!(
            RedistributionPlan::count_destinations(&[1, 2, 1, 0], 3).unwrap(),
            vec![1, 2, 1]
        );
        assert!(matches!(
            RedistributionPlan::count_destinations(&[3], 3),
            Err(Error::InvalidRank { rank: 3, size: 3 })
        ));
    }

    #[test]
    fn test_totals_and_starts() {
        let plan = RedistributionPlan::new(0, 3, &MATRIX, 10, &[1, 0, 1]).unwrap();
        assert_eq!(plan.totals(), &[3, 3, 4]);
        assert_eq!(plan.starts(), &[0, 3, 6]);
        assert_eq!(plan.global_count(), 10);
        assert_eq!(plan.receive_count(), 3);
        assert_eq!(plan.layout().offsets(), &[0, 3, 6, 10]);
    }

    #[test]
    fn test_offsets() {
        let plan0 = RedistributionPlan::new(0, 3, &MATRIX, 10, &[1, 0, 1]).unwrap();
        assert_eq!(plan0.first_slots(), &[0, 3, 6]);
        assert_eq!(plan0.destination_offsets(), &[3, 0, 4]);

        let plan1 = RedistributionPlan::new(1, 3, &MATRIX, 10, &[2, 1, 2, 2]).unwrap();
        assert_eq!(plan1.first_slots(), &[1, 5, 6]);
        assert_eq!(plan1.destination_offsets(), &[6, 5, 7, 8]);

        let plan2 = RedistributionPlan::new(2, 3, &MATRIX, 10, &[0, 2, 0]).unwrap();
        assert_eq!(plan2.first_slots(), &[1, 6, 9]);
        assert_eq!(plan2.destination_offsets(), &[1, 9, 2]);
    }

    #[test]
    fn test_offsets_fill_every_slot_once() {
        let dests = [vec![1, 0, 1], vec![2, 1, 2, 2], vec![0, 2, 0]];
        let mut slots = dests
            .iter()
            .enumerate()
            .flat_map(|(rank, d)| {
                RedistributionPlan::new(rank, 3, &MATRIX, 10, d)
                    .unwrap()
                    .destination_offsets()
                    .to_vec()
            })
            .collect_vec();
        slots.sort();
        assert_eq!(slots, (0..10).collect_vec());
    }

    #[test]
    fn test_wrong_total() {
        assert!(matches!(
            RedistributionPlan::new(0, 3, &MATRIX, 11, &[1, 0, 1]),
            Err(Error::InconsistentPlan(_))
        ));
    }

    #[test]
    fn test_destinations_disagree_with_counts() {
        assert!(matches!(
            RedistributionPlan::new(0, 3, &MATRIX, 10, &[1, 1, 1]),
            Err(Error::InconsistentPlan(_))
        ));
    }

    #[test]
    fn test_bad_matrix() {
        assert!(matches!(
            RedistributionPlan::new(0, 2, &MATRIX, 10, &[]),
            Err(Error::InconsistentPlan(_))
        ));
    }

    #[test]
    fn test_single_rank() {
        let plan = RedistributionPlan::new(0, 1, &[4], 4, &[0, 0, 0, 0]).unwrap();
        assert_eq!(plan.destination_offsets(), &[0, 1, 2, 3]);
        assert_eq!(plan.receive_count(), 4);
    }
}
