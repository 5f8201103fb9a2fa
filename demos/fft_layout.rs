use mpi::{environment::Universe, traits::Communicator};
use ndparticles::comm::{print_root, print_synchronized};
use ndparticles::fft::{local_size_transposed, SlabGrid};
use std::io::stdout;

/// Slab layouts of distributed real-to-complex transforms
fn main() {
    let universe: Universe = mpi::initialize().unwrap();
    let comm = universe.world();
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    let layout = local_size_transposed(&[32, 16, 8, 12], rank, size).unwrap();
    let text = format!(
        "Rank {rank} : size = {}, n0=({},{}), n1=({},{})\n",
        layout.alloc, layout.n0.count, layout.n0.start, layout.n1.count, layout.n1.start
    );
    print_synchronized(&comm, &mut stdout(), &text).unwrap();

    let (real, complex) = SlabGrid::new(&comm, &[8, 8, 8]).unwrap();
    print_root(&comm, &mut stdout(), "Considering the real array....\n").unwrap();
    print_synchronized(&comm, &mut stdout(), &format!("Rank {rank}\n{real}")).unwrap();
    print_root(&comm, &mut stdout(), "Considering the complex array....\n").unwrap();
    print_synchronized(&comm, &mut stdout(), &format!("Rank {rank}\n{complex}")).unwrap();
}
