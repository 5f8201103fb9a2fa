//! Read (ra, dec, z, weight) catalogues in parallel and report their sizes
use clap::Parser;
use ndparticles::catalogue::RdzwCatalogue;
use ndparticles::config::Logging;
use ndparticles::Result;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use std::time::Instant;

/// Read catalogues and count their records
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Catalogue files
    #[arg(required = true)]
    files: Vec<String>,
    /// Logging level
    #[arg(long, value_enum, default_value_t)]
    logging: Logging,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.logging.init();

    let start = Instant::now();
    let counts = cli
        .files
        .par_iter()
        .map(|file| RdzwCatalogue::read(file).map(|c| c.len()))
        .collect::<Result<Vec<_>>>()?;
    for (file, count) in cli.files.iter().zip(counts) {
        println!("{file} has {count} records");
    }
    println!("Elapsed time : {:?}", start.elapsed());
    Ok(())
}
