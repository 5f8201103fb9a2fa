//! Print line-of-sight comoving distances
use clap::Parser;
use log::debug;
use ndparticles::config::{load_config, DistanceConfig};
use ndparticles::cosmo::{comoving_distance, z_to_a, Lcdm};
use ndparticles::Result;
use std::path::PathBuf;

/// Comoving distances to a list of redshifts, in Mpc/h unless h is given
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Read the settings from a RON file instead of the flags
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(flatten)]
    distance: DistanceConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config::<DistanceConfig>(path)?,
        None => cli.distance,
    };
    config.logging.init();

    let cosmology = match config.ode {
        Some(ode) => Lcdm::new(config.om, ode, config.h),
        None => Lcdm::new_flat_simple(config.om, config.h),
    };
    debug!("{cosmology:?}");

    let avals = config.redshifts.iter().map(|&z| z_to_a(z)).collect::<Vec<_>>();
    let distances = comoving_distance(&cosmology, &avals)?;
    for (z, d) in config.redshifts.iter().zip(distances) {
        println!("{z:10.5} {d:12.4}");
    }
    Ok(())
}
