use mpi::{environment::Universe, traits::Communicator};
use ndparticles::{particles::FieldFormat, types::InsertMode, FieldParticles};
use std::io::stdout;

/// Particles stored as one distributed vector per field
fn main() {
    let universe: Universe = mpi::initialize().unwrap();
    let comm = universe.world();
    let rank = comm.rank() as usize;

    let names = ["x", "y", "z", "w"];
    let mut particles = FieldParticles::new(&comm, &names, Some(2 + rank), None).unwrap();

    // Each rank sets its own particles through global indices
    let range = particles.field("x").unwrap().own_range();
    let ix = range.clone().collect::<Vec<_>>();
    let mut local = particles.new_local(ix.len());
    for (k, i) in ix.iter().enumerate() {
        for (d, name) in names.iter().enumerate() {
            local.get_mut(*name).unwrap()[k] = (*i as f64) + 0.1 * d as f64;
        }
    }
    particles.set_values(&ix, &local, InsertMode::Insert).unwrap();
    particles.assemble().unwrap();

    let formats = ["%8.3f", "%8.3f", "%8.3f", "%10.2e"]
        .map(|f| f.parse::<FieldFormat>().unwrap());
    particles
        .dump(&mut stdout(), &names, &formats, true)
        .unwrap();
}
