use mpi::{collective::CommunicatorCollectives, environment::Universe, traits::Communicator};
use ndparticles::particles::PosWeight;
use ndparticles::traits::{RONExportParallel, RONImportParallel};
use ndparticles::ParticleVec;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Particle I/O
///
/// Demonstration of exporting and importing particles in parallel. Each rank writes its own
/// records to a separate file and rank 0 writes a summary.
fn main() {
    let universe: Universe = mpi::initialize().unwrap();
    let comm = universe.world();
    let rank = comm.rank();

    let mut records = vec![PosWeight::default(); 5];
    let mut rng = ChaCha8Rng::seed_from_u64(rank as u64);
    PosWeight::fill_random(&mut records, &mut rng, 10.0, 1.0);
    let particles = ParticleVec::from_local_records(&comm, records);

    particles.export_as_ron("_particles_parallel.ron").unwrap();

    // Wait for export to finish
    comm.barrier();

    // The particles must be imported on the same number of processes they were exported from
    let particles2 =
        ParticleVec::<_, PosWeight>::import_from_ron(&comm, "_particles_parallel.ron").unwrap();

    if rank == 0 {
        println!("The first records on rank 0");
        for (p, p2) in particles.records().iter().zip(particles2.records()).take(3) {
            println!("{p} {p2}");
        }
    }
}
