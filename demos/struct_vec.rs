use mpi::{environment::Universe, traits::Communicator};
use ndparticles::{comm::print_synchronized, particles::PosWeight, ParticleVec};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::stdout;

/// Vectors of records
///
/// Rank 0 sets the first record of every rank, then the records are printed in rank order.
fn main() {
    let universe: Universe = mpi::initialize().unwrap();
    let comm = universe.world();
    let rank = comm.rank();

    let mut particles = ParticleVec::<_, PosWeight>::new(&comm, Some(3), None).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(rank as u64);
    PosWeight::fill_random(particles.records_mut(), &mut rng, 1.0, 1.0);

    if rank == 0 {
        let starts = (0..comm.size() as usize)
            .map(|r| particles.vector().layout().local_range(r).start)
            .collect::<Vec<_>>();
        let marked = starts
            .iter()
            .map(|&s| PosWeight {
                pos: [s as f32; 3],
                weight: -1.0,
            })
            .collect::<Vec<_>>();
        particles.set_values(&starts, &marked).unwrap();
    }
    particles.assemble().unwrap();

    let mut text = format!("Rank {rank}\n");
    for p in particles.records() {
        text.push_str(&format!("  {p}\n"));
    }
    print_synchronized(&comm, &mut stdout(), &text).unwrap();
}
