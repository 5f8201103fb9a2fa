use mpi::{collective::CommunicatorCollectives, environment::Universe, traits::Communicator};
use ndparticles::particles::PosWeight;
use ndparticles::traits::{RONExportParallel, RONImportParallel};
use ndparticles::{Error, ParticleVec};

fn example_particles<C: Communicator>(comm: &C) -> ParticleVec<'_, C, PosWeight> {
    let rank = comm.rank() as usize;
    let records = (0..rank + 2)
        .map(|k| PosWeight {
            pos: [rank as f32, k as f32, 0.5],
            weight: 0.25 * k as f32,
        })
        .collect();
    ParticleVec::from_local_records(comm, records)
}

fn filename(size: i32) -> String {
    format!("_demos_parallel_io_{}ranks.ron", size)
}

fn test_parallel_export<C: Communicator>(comm: &C) {
    example_particles(comm)
        .export_as_ron(&filename(comm.size()))
        .unwrap();
}

fn test_parallel_import<C: Communicator>(comm: &C) {
    let particles =
        ParticleVec::<'_, C, PosWeight>::import_from_ron(comm, &filename(comm.size())).unwrap();
    let expected = example_particles(comm);

    assert_eq!(particles.ntotal(), expected.ntotal());
    assert_eq!(particles.own_range(), expected.own_range());
    assert_eq!(particles.records(), expected.records());
}

fn test_missing_file<C: Communicator>(comm: &C) {
    let result = ParticleVec::<'_, C, PosWeight>::import_from_ron(comm, "_no_such_file.ron");
    assert!(matches!(result, Err(Error::Io(_))));
}

/// Run tests
fn main() {
    let universe: Universe = mpi::initialize().unwrap();
    let world = universe.world();
    let rank = world.rank();

    if rank == 0 {
        println!("Testing parallel export");
    }
    test_parallel_export(&world);
    world.barrier();

    if rank == 0 {
        println!("Testing parallel import");
    }
    test_parallel_import(&world);

    if rank == 0 {
        println!("Testing import of a missing file");
    }
    test_missing_file(&world);
}
