use mpi::{environment::Universe, traits::Communicator};
use ndparticles::particles::{domain_decompose, PosWeight, Slab};
use ndparticles::ParticleVec;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Slab decomposition
///
/// Random particles are sent to the rank owning the slab of the box that contains them.
fn main() {
    let universe: Universe = mpi::initialize().unwrap();
    let comm = universe.world();
    let rank = comm.rank();

    let length = 1.0;
    let mut rng = ChaCha8Rng::seed_from_u64(1234 + rank as u64);
    let mut records = vec![PosWeight::default(); 1000];
    PosWeight::fill_random(&mut records, &mut rng, length, 1.0);
    let mut particles = ParticleVec::from_local_records(&comm, records);

    let slab = Slab::for_comm(&comm, length as f64, 0).unwrap();
    domain_decompose(&slab, &mut particles).unwrap();

    let misplaced = particles
        .records()
        .iter()
        .filter(|p| slab.slab_of(p.pos[0] as f64) != rank as usize)
        .count();
    println!(
        "Rank {rank} holds {} of {} particles, {misplaced} outside its slab",
        particles.nlocal(),
        particles.ntotal()
    );
    assert_eq!(misplaced, 0);
}
