use mpi::{environment::Universe, traits::Communicator};
use ndparticles::particles::{PosWeight, RedistributionPlan};
use ndparticles::{Error, ParticleVec};

// Rank r starts with r + 3 records. Record k goes to rank (k + r) % size and carries its source
// rank and local index.
fn records(rank: usize) -> Vec<PosWeight> {
    (0..rank + 3)
        .map(|k| PosWeight {
            pos: [rank as f32, k as f32, 0.0],
            weight: (100 * rank + k) as f32,
        })
        .collect()
}

fn destination(rank: usize, k: usize, size: usize) -> usize {
    (k + rank) % size
}

/// Test that records arrive on their destination, ordered by source rank and then by send order
fn test_round_robin<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    let mut particles = ParticleVec::from_local_records(comm, records(rank));
    let ntotal = particles.ntotal();
    let local_indices = (0..rank + 3).collect::<Vec<_>>();
    let dest_ranks = local_indices
        .iter()
        .map(|&k| destination(rank, k, size))
        .collect::<Vec<_>>();
    particles.scatter(&local_indices, &dest_ranks).unwrap();

    let expected = (0..size)
        .flat_map(|source| {
            records(source)
                .into_iter()
                .enumerate()
                .filter(move |(k, _)| destination(source, *k, size) == rank)
                .map(|(_, r)| r)
        })
        .collect::<Vec<_>>();

    assert_eq!(particles.ntotal(), ntotal);
    assert_eq!(particles.nlocal(), expected.len());
    assert_eq!(particles.records(), &expected[..]);
}

/// Test that records not listed are dropped and that a rank may receive nothing
fn test_partial<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;

    let mut particles = ParticleVec::from_local_records(comm, records(rank));
    // Only the first record of every rank is kept, and all of them go to rank 0
    particles.scatter(&[0], &[0]).unwrap();

    assert_eq!(particles.ntotal(), comm.size() as usize);
    if rank == 0 {
        let sources = particles
            .records()
            .iter()
            .map(|r| r.pos[0] as usize)
            .collect::<Vec<_>>();
        assert_eq!(sources, (0..comm.size() as usize).collect::<Vec<_>>());
    } else {
        assert_eq!(particles.nlocal(), 0);
    }
}

/// Test that a record listed twice arrives twice, as a ghost copy does
fn test_ghost_copies<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;
    let next = |r: usize| (r + 1) % size;

    let mut particles = ParticleVec::from_local_records(comm, records(rank));
    let ntotal = particles.ntotal();
    // Every record stays on its own rank and a copy goes to the next rank
    let local_indices = (0..rank + 3).flat_map(|k| [k, k]).collect::<Vec<_>>();
    let dest_ranks = (0..rank + 3)
        .flat_map(|_| [rank, next(rank)])
        .collect::<Vec<_>>();
    particles.scatter(&local_indices, &dest_ranks).unwrap();

    let expected = (0..size)
        .flat_map(|source| {
            records(source).into_iter().flat_map(move |r| {
                [source, next(source)]
                    .into_iter()
                    .filter(move |&d| d == rank)
                    .map(move |_| r)
            })
        })
        .collect::<Vec<_>>();

    assert_eq!(particles.ntotal(), 2 * ntotal);
    assert_eq!(particles.nlocal(), expected.len());
    assert_eq!(particles.records(), &expected[..]);
}

/// Test that an invalid destination on one rank fails on every rank
fn test_invalid_destination<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    let mut particles = ParticleVec::from_local_records(comm, records(rank));
    let dest = if rank == 0 { size } else { 0 };
    let result = particles.scatter(&[0], &[dest]);
    if rank == 0 {
        assert!(matches!(result, Err(Error::InvalidRank { .. })));
    } else {
        assert!(matches!(result, Err(Error::RemoteFailure)));
    }
    // The records are untouched
    assert_eq!(particles.records(), &records(rank)[..]);
}

/// Test the plan offsets against a directly computed layout
fn test_plan<C: Communicator>(comm: &C) {
    let size = comm.size() as usize;
    let matrix = (0..size * size).map(|i| i % 3).collect::<Vec<_>>();
    let global_count = matrix.iter().sum();
    for source in 0..size {
        let counts = &matrix[source * size..(source + 1) * size];
        let dests = counts
            .iter()
            .enumerate()
            .flat_map(|(d, &c)| std::iter::repeat(d).take(c))
            .collect::<Vec<_>>();
        let plan = RedistributionPlan::new(source, size, &matrix, global_count, &dests).unwrap();
        for (&d, &offset) in dests.iter().zip(plan.destination_offsets()) {
            let start = plan.starts()[d];
            assert!(offset >= start && offset < start + plan.totals()[d]);
        }
    }
}

/// Run tests
fn main() {
    let universe: Universe = mpi::initialize().unwrap();
    let world = universe.world();
    let rank = world.rank();

    if rank == 0 {
        println!("Testing round robin scatter");
    }
    test_round_robin(&world);

    if rank == 0 {
        println!("Testing partial scatter");
    }
    test_partial(&world);

    if rank == 0 {
        println!("Testing ghost copies");
    }
    test_ghost_copies(&world);

    if rank == 0 {
        println!("Testing invalid destination");
    }
    test_invalid_destination(&world);

    if rank == 0 {
        println!("Testing redistribution plans");
    }
    test_plan(&world);
}
