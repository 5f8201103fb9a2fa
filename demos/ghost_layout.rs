use mpi::{environment::Universe, traits::Communicator};
use ndparticles::{comm::print_synchronized, GhostedVec};
use std::io::stdout;

/// Ghosted vectors
///
/// Each rank owns five blocks of two entries and ghosts the first block of the next rank and the
/// last block of the previous rank.
fn main() {
    let universe: Universe = mpi::initialize().unwrap();
    let comm = universe.world();
    let rank = comm.rank() as usize;
    let size = comm.size() as usize;

    let bs = 2;
    let nblocks = 5;
    let first = rank * nblocks;
    let total = size * nblocks;
    let ghosts = [(first + nblocks) % total, (total + first - 1) % total];
    print_synchronized(&comm, &mut stdout(), &format!("Ghost blocks : {ghosts:?}\n")).unwrap();

    let mut v = GhostedVec::<_, f64>::new_blocked(&comm, Some(nblocks * bs), None, bs, &ghosts)
        .unwrap();
    let start = v.vector().own_range().start;
    for (i, x) in v.vector_mut().data_mut().iter_mut().enumerate() {
        *x = (start + i) as f64;
    }

    // Forward: fill the ghosts from their owners
    v.update_ghosts();
    let text = v
        .local_form()
        .iter()
        .map(|x| format!("{:3}", *x as i64))
        .collect::<Vec<_>>()
        .join(" ");
    print_synchronized(&comm, &mut stdout(), &format!("Rank {rank} : {text}\n")).unwrap();

    // Reverse: every slot holds rank + 1, and ghosts are added into their owners
    v.vector_mut().set(0.0);
    for x in v.local_form_mut() {
        *x = (rank + 1) as f64;
    }
    v.accumulate_ghosts().unwrap();
    let text = v
        .vector()
        .data()
        .iter()
        .map(|x| format!("{:3}", *x as i64))
        .collect::<Vec<_>>()
        .join(" ");
    print_synchronized(&comm, &mut stdout(), &format!("Rank {rank} : {text}\n")).unwrap();
}
