//! Count the non-comment lines of a file
use clap::Parser;
use ndparticles::config::Logging;
use ndparticles::lineio::{LineCount, LineReader};
use ndparticles::Result;
use std::time::Instant;

/// Count the lines of a file, skipping comments and blank lines
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// File to read
    file: String,
    /// Comment characters
    #[arg(long, default_value = "#")]
    comment: String,
    /// Logging level
    #[arg(long, value_enum, default_value_t)]
    logging: Logging,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.logging.init();

    let start = Instant::now();
    let mut count = LineCount::default();
    LineReader::new(&cli.comment).parse_file(&cli.file, &mut count)?;
    println!(
        "{} has {} non-skipped lines (elapsed time: {:?})",
        cli.file,
        count.0,
        start.elapsed()
    );
    Ok(())
}
