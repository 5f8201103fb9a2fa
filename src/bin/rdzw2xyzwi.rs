//! Convert (ra, dec, z, weight) catalogues to comoving (x, y, z, weight, index) files
use clap::Parser;
use log::info;
use ndparticles::catalogue::{convert_files, Converter};
use ndparticles::config::{load_config, ConversionConfig};
use ndparticles::Result;
use std::path::PathBuf;
use std::time::Instant;

/// Convert numbered catalogue files, replacing the weights with FKP weights
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Read the settings from a RON file instead of the flags
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(flatten)]
    conversion: ConversionConfig,
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config::<ConversionConfig>(path)?,
        None => cli.conversion,
    };
    config.logging.init();
    config.validate()?;

    let converter = Converter::from_config(&config)?;
    let bounds = convert_files(
        &converter,
        &config.input,
        &config.output,
        config.first,
        config.last,
    )?;

    println!(
        "The minimum particle position was at [{:.4} {:.4} {:.4}]",
        bounds.lo[0], bounds.lo[1], bounds.lo[2]
    );
    println!(
        "The maximum particle position was at [{:.4} {:.4} {:.4}]",
        bounds.hi[0], bounds.hi[1], bounds.hi[2]
    );
    info!("Converted files {}..{}", config.first, config.last);
    println!("The total elapsed time was {:?}", start.elapsed());
    Ok(())
}
