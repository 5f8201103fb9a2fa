use mpi::{environment::Universe, traits::Communicator};
use ndparticles::types::{InsertMode, Ownership, ScatterMode};
use ndparticles::{DistributedVec, Error, GhostedVec, IndexSet, VecScatter};

/// Test that a global size is split as evenly as possible
fn test_layout<C: Communicator>(comm: &C) {
    let size = comm.size() as usize;
    let n = 3 * size + 1;
    let v = DistributedVec::<_, f64>::new(comm, None, Some(n)).unwrap();
    assert_eq!(v.global_size(), n);
    let counts = v.layout().counts();
    assert_eq!(counts.iter().sum::<usize>(), n);
    assert_eq!(counts[0], 4);
    assert!(counts.iter().all(|&c| c == 3 || c == 4));

    let result = DistributedVec::<_, f64>::new(comm, Some(2), Some(2 * size + 1));
    assert!(matches!(result, Err(Error::SizeMismatch { .. })));
}

/// Test inserting from one rank and adding from all ranks
fn test_assemble<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;
    let n = 4 * size;

    let mut v = DistributedVec::<_, i64>::new(comm, Some(4), None).unwrap();
    if rank == 0 {
        let ix = (0..n).collect::<Vec<_>>();
        let values = ix.iter().map(|&i| 10 * i as i64).collect::<Vec<_>>();
        v.set_values(&ix, &values, InsertMode::Insert).unwrap();
    }
    v.assemble().unwrap();
    let start = v.own_range().start;
    for (i, &x) in v.data().iter().enumerate() {
        assert_eq!(x, 10 * (start + i) as i64);
    }

    v.set(0);
    let ix = (0..n).collect::<Vec<_>>();
    v.set_values(&ix, &vec![1; n], InsertMode::Add).unwrap();
    v.assemble().unwrap();
    assert!(v.data().iter().all(|&x| x == size as i64));
    assert_eq!(v.sum(), (n * size) as i64);

    v.set_values(&[0], &[1], InsertMode::Add).unwrap();
    assert!(matches!(
        v.set_values(&[0], &[1], InsertMode::Insert),
        Err(Error::MixedInsertMode)
    ));
    v.assemble().unwrap();

    // A rejected call leaves the values untouched and does not fix the insert mode
    v.set(0);
    let start = v.own_range().start;
    assert!(matches!(
        v.set_values(&[start, n], &[5, 5], InsertMode::Add),
        Err(Error::IndexOutOfBounds { index, size }) if index == n && size == n
    ));
    assert!(v.data().iter().all(|&x| x == 0));
    v.set_values(&[start], &[7], InsertMode::Insert).unwrap();
    v.assemble().unwrap();
    assert_eq!(v.data()[0], 7);
    assert!(v.data()[1..].iter().all(|&x| x == 0));
}

/// Test a scatter that reverses a vector
fn test_reverse<C: Communicator>(comm: &C) {
    let n = 3 * comm.size() as usize + 2;
    let mut src = DistributedVec::<_, f64>::new(comm, None, Some(n)).unwrap();
    let range = src.own_range();
    for (i, x) in src.data_mut().iter_mut().enumerate() {
        *x = (range.start + i) as f64;
    }
    let mut dst = src.duplicate();

    let from = IndexSet::stride(range.len(), range.start, 1);
    let to = IndexSet::general(range.clone().map(|i| n - 1 - i).collect());
    let scatter = VecScatter::new(&src, &from, &dst, &to).unwrap();
    assert_eq!(scatter.send_count(), range.len());
    scatter
        .execute(&src, &mut dst, InsertMode::Insert, ScatterMode::Forward)
        .unwrap();

    let start = dst.own_range().start;
    for (i, &x) in dst.data().iter().enumerate() {
        assert_eq!(x, (n - 1 - (start + i)) as f64);
    }

    // Reversing the reversal restores the original values
    let mut back = src.duplicate();
    scatter
        .execute(&dst, &mut back, InsertMode::Insert, ScatterMode::Reverse)
        .unwrap();
    assert_eq!(back.data(), src.data());

    // The layouts must swap roles in reverse mode
    let other = DistributedVec::<_, f64>::new(comm, None, Some(n + comm.size() as usize)).unwrap();
    let mut other_dst = other.duplicate();
    assert!(matches!(
        scatter.execute(&other, &mut other_dst, InsertMode::Insert, ScatterMode::Reverse),
        Err(Error::LayoutMismatch)
    ));
}

/// Test adding into one entry and broadcasting it back with a reverse scatter
fn test_add_and_reverse<C: Communicator>(comm: &C) {
    let size = comm.size() as usize;
    let mut src = DistributedVec::<_, f64>::new(comm, Some(3), None).unwrap();
    let start = src.own_range().start;
    for (i, x) in src.data_mut().iter_mut().enumerate() {
        *x = (start + i + 1) as f64;
    }
    let mut dst = src.duplicate();

    let from = IndexSet::general(vec![start]);
    let to = IndexSet::general(vec![0]);
    let scatter = VecScatter::new(&src, &from, &dst, &to).unwrap();
    scatter
        .execute(&src, &mut dst, InsertMode::Add, ScatterMode::Forward)
        .unwrap();

    // Rank r owns 3r..3r + 3, so the first entries hold 1, 4, 7, ...
    let total = (0..size).map(|r| (3 * r + 1) as f64).sum::<f64>();
    if comm.rank() == 0 {
        assert_eq!(dst.data()[0], total);
        assert!(dst.data()[1..].iter().all(|&x| x == 0.0));
    } else {
        assert!(dst.data().iter().all(|&x| x == 0.0));
    }

    let mut back = src.duplicate();
    scatter
        .execute(&dst, &mut back, InsertMode::Insert, ScatterMode::Reverse)
        .unwrap();
    assert_eq!(back.data(), &[total, 0.0, 0.0]);
}

/// Test ghost updates in both directions
fn test_ghosts<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;
    let bs = 2;
    let nblocks = 3;
    let total = size * nblocks;
    // Ghost the first block of the next rank and the last block of the previous rank
    let ghosts_of = |r: usize| [(r * nblocks + nblocks) % total, (total + r * nblocks - 1) % total];
    let ghosts = ghosts_of(rank);

    let mut v =
        GhostedVec::<_, f64>::new_blocked(comm, Some(nblocks * bs), None, bs, &ghosts).unwrap();
    let nlocal = v.vector().local_size();
    let start = v.vector().own_range().start;
    for (i, x) in v.vector_mut().data_mut().iter_mut().enumerate() {
        *x = (start + i) as f64;
    }

    v.update_ghosts();
    let expected = ghosts
        .iter()
        .flat_map(|g| (g * bs..(g + 1) * bs).map(|i| i as f64))
        .collect::<Vec<_>>();
    assert_eq!(&v.local_form()[nlocal..], &expected[..]);
    assert_eq!(v.ownership(0).unwrap(), Ownership::Owned);
    for (k, g) in ghosts.iter().enumerate() {
        assert_eq!(
            v.ownership(nlocal + k * bs + 1).unwrap(),
            Ownership::Ghost(g / nblocks, (g % nblocks) * bs + 1)
        );
    }
    assert!(v.ownership(nlocal + ghosts.len() * bs).is_err());

    // Every ghost slot holds one, so each owned value ends up as the number of its ghost copies
    v.vector_mut().set(0.0);
    for x in &mut v.local_form_mut()[nlocal..] {
        *x = 1.0;
    }
    v.accumulate_ghosts().unwrap();
    for (i, &x) in v.vector().data().iter().enumerate() {
        let block = (start + i) / bs;
        let copies = (0..size)
            .flat_map(ghosts_of)
            .filter(|&g| g == block)
            .count();
        assert_eq!(x, copies as f64);
    }
}

/// Test that a scatter from a non-local index fails on every rank
fn test_nonlocal_scatter<C: Communicator>(comm: &C) {
    let rank = comm.rank() as usize;
    let v = DistributedVec::<_, f64>::new(comm, Some(2), None).unwrap();
    let bad = if rank == 0 { v.global_size() } else { v.own_range().start };
    let from = IndexSet::general(vec![bad]);
    let to = IndexSet::general(vec![0]);
    let result = VecScatter::new(&v, &from, &v, &to);
    if rank == 0 {
        assert!(matches!(result, Err(Error::NonLocalIndex { .. })));
    } else {
        assert!(matches!(result, Err(Error::RemoteFailure)));
    }
}

/// Run tests
fn main() {
    let universe: Universe = mpi::initialize().unwrap();
    let world = universe.world();
    let rank = world.rank();

    if rank == 0 {
        println!("Testing layouts");
    }
    test_layout(&world);

    if rank == 0 {
        println!("Testing assembly");
    }
    test_assemble(&world);

    if rank == 0 {
        println!("Testing reversing scatter");
    }
    test_reverse(&world);

    if rank == 0 {
        println!("Testing adding and reverse scatters");
    }
    test_add_and_reverse(&world);

    if rank == 0 {
        println!("Testing ghost updates");
    }
    test_ghosts(&world);

    if rank == 0 {
        println!("Testing non-local scatter");
    }
    test_nonlocal_scatter(&world);
}
