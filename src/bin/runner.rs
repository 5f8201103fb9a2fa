//! Run the lines of a task file as commands, spread over MPI ranks
use clap::Parser;
use mpi::{collective::CommunicatorCollectives, environment::Universe, traits::Communicator};
use ndparticles::config::Logging;
use ndparticles::lineio::LineReader;
use ndparticles::runner::TaskRunner;
use ndparticles::{Error, Result};
use std::fs::File;
use std::io::BufWriter;

/// Line k of TASKS runs on rank k % size; rank r logs to OUT-<r>.out
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Task file, one command per line
    tasks: String,
    /// Prefix of the per-rank log files
    out: String,
    /// Logging level
    #[arg(long, value_enum, default_value_t)]
    logging: Logging,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.logging.init();

    let universe: Universe = mpi::initialize().ok_or(Error::MpiInit)?;
    let world = universe.world();
    let rank = world.rank() as usize;
    let size = world.size() as usize;

    let log = BufWriter::new(File::create(format!("{}-{rank:05}.out", cli.out))?);
    let mut runner = TaskRunner::new(rank, size, log);
    let result = LineReader::default().parse_file(&cli.tasks, &mut runner);

    world.barrier();
    result
}
