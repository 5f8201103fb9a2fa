//! Communication helpers
use crate::{Error, Result};
use itertools::Itertools;
use mpi::{
    collective::SystemOperation,
    datatype::{Partition, PartitionMut},
    traits::{Communicator, CommunicatorCollectives, Equivalence, Root},
};
use std::io::Write;

// Exclusive prefix sum of counts, as MPI displacements.
pub(crate) fn displacements(counts: &[i32]) -> Vec<i32> {
    counts
        .iter()
        .scan(0, |acc, &x| {
            let old = *acc;
            *acc += x;
            Some(old)
        })
        .collect_vec()
}

/// Perform an all-to-all communication of variable length data
///
/// `data` holds the values for rank 0, then for rank 1 and so on, and `counts[r]` is the number
/// of values sent to rank `r`. Returns the number of values received from each rank and the
/// received values, ordered by source rank.
pub fn all_to_all_varcount<T: Equivalence>(
    comm: &impl Communicator,
    counts: &[usize],
    data: &[T],
) -> (Vec<usize>, Vec<T>) {
    let counts = counts.iter().map(|&x| x as i32).collect_vec();

    // First send around the counts via an all-to-all
    let mut recv_counts = vec![0_i32; comm.size() as usize];
    comm.all_to_all_into(&counts[..], &mut recv_counts[..]);

    let mut receive_data = Vec::<T>::with_capacity(recv_counts.iter().sum::<i32>() as usize);
    // This avoids having the pre-initialise the array. We simply transmute the spare capacity
    // into a valid reference and later manually set the length of the array to the full capacity.
    let receive_buf: &mut [T] = unsafe { std::mem::transmute(receive_data.spare_capacity_mut()) };

    let send_displacements = displacements(&counts);
    let receive_displacements = displacements(&recv_counts);

    let send_partition = Partition::new(data, &counts[..], send_displacements);
    let mut receive_partition =
        PartitionMut::new(receive_buf, &recv_counts[..], receive_displacements);

    comm.all_to_all_varcount_into(&send_partition, &mut receive_partition);

    unsafe { receive_data.set_len(recv_counts.iter().sum::<i32>() as usize) };

    (
        recv_counts.iter().map(|&c| c as usize).collect(),
        receive_data,
    )
}

// Make a local result collective: if any rank failed, every rank fails.
pub(crate) fn agree<T>(comm: &impl Communicator, local: Result<T>) -> Result<T> {
    let failed = u8::from(local.is_err());
    let mut any_failed = 0_u8;
    comm.all_reduce_into(&failed, &mut any_failed, SystemOperation::max());
    match local {
        Ok(_) if any_failed != 0 => Err(Error::RemoteFailure),
        local => local,
    }
}

/// Write `text` to `out` on rank 0 only
pub fn print_root(
    comm: &impl Communicator,
    out: &mut impl Write,
    text: &str,
) -> std::io::Result<()> {
    if comm.rank() == 0 {
        out.write_all(text.as_bytes())?;
        out.flush()?;
    }
    Ok(())
}

/// Gather `text` from every rank and write it on rank 0 in rank order
///
/// This is a collective operation.
pub fn print_synchronized(
    comm: &impl Communicator,
    out: &mut impl Write,
    text: &str,
) -> std::io::Result<()> {
    let root = comm.process_at_rank(0);
    let bytes = text.as_bytes();
    let len = bytes.len() as i32;

    if comm.rank() == 0 {
        let mut counts = vec![0_i32; comm.size() as usize];
        root.gather_into_root(&len, &mut counts[..]);

        let mut buffer = vec![0_u8; counts.iter().sum::<i32>() as usize];
        let displs = displacements(&counts);
        let mut partition = PartitionMut::new(&mut buffer[..], &counts[..], displs);
        root.gather_varcount_into_root(bytes, &mut partition);

        out.write_all(&buffer)?;
        out.flush()?;
    } else {
        root.gather_into(&len);
        root.gather_varcount_into(bytes);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_displacements() {
        assert_eq!(displacements(&[2, 0, 3, 1]), vec![0, 2, 2, 5]);
        assert!(displacements(&[]).is_empty());
    }
}
