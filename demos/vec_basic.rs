use mpi::{collective::CommunicatorCollectives, environment::Universe, traits::Communicator};
use ndparticles::{comm::print_synchronized, types::InsertMode, DistributedVec};
use std::io::stdout;

/// Distributed vectors
///
/// Every rank adds contributions to entries owned by other ranks, which are moved to their owners
/// by `assemble`.
fn main() {
    let universe: Universe = mpi::initialize().unwrap();
    let comm = universe.world();
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    // Five entries per rank
    let mut v = DistributedVec::<_, f64>::new(&comm, Some(5), None).unwrap();
    let range = v.own_range();
    for (i, x) in v.data_mut().iter_mut().enumerate() {
        *x = (range.start + i) as f64;
    }

    // Every rank adds one to the first entry of the next rank
    let next = (rank + 1) % size;
    let target = v.layout().local_range(next).start;
    v.set_values(&[target], &[1.0], InsertMode::Add).unwrap();
    v.assemble().unwrap();

    let text = format!(
        "Rank {rank} owns {:?}: {:?}\n",
        v.own_range(),
        v.data()
    );
    print_synchronized(&comm, &mut stdout(), &text).unwrap();
    comm.barrier();

    let n = v.global_size() as f64;
    let sum = v.sum();
    if rank == 0 {
        println!("Sum = {sum}, expected {}", n * (n - 1.0) / 2.0 + size as f64);
    }
}
