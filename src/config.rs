//! Configuration of the command line tools
//!
//! Every configuration can be given as command line flags or, with the `serde` feature, read from
//! a RON file.
use crate::{Error, Result};
use clap::{Args, ValueEnum};
use log::LevelFilter;

/// Verbosity of logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Logging {
    /// No logging
    Off,
    /// Errors only
    Error,
    /// Warnings and errors
    #[default]
    Warn,
    /// Progress messages
    Info,
    /// Debugging output
    Debug,
    /// Everything
    Trace,
}

impl Logging {
    /// The level for a numeric verbosity, 0 being silent
    pub fn from_verbosity(verbosity: usize) -> Self {
        match verbosity {
            0 => Self::Off,
            1 => Self::Warn,
            2 => Self::Info,
            3 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// The corresponding log filter
    pub fn filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }

    /// Install an environment logger at this level
    ///
    /// `RUST_LOG` may refine the filter. Does nothing if a logger is already installed.
    pub fn init(self) {
        let _ = env_logger::Builder::new()
            .filter_level(self.filter())
            .parse_default_env()
            .format_timestamp(None)
            .try_init();
    }
}

/// Settings for converting (ra, dec, z, weight) catalogues
#[derive(Debug, Clone, PartialEq, Args)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ConversionConfig {
    /// File with `z n(z)` columns used for the FKP weights
    #[arg(long, default_value_t)]
    pub weight: String,
    /// Input file pattern, e.g. a%03d.rdzw
    #[arg(long = "in", default_value_t)]
    pub input: String,
    /// Output file pattern, e.g. a%03d.dat
    #[arg(long = "out", default_value_t)]
    pub output: String,
    /// P0 in the FKP weight
    #[arg(long = "Pk", default_value_t = 20000.0)]
    pub pk: f64,
    /// Minimum redshift, inclusive
    #[arg(long, default_value_t = 0.43)]
    pub zmin: f64,
    /// Maximum redshift, exclusive
    #[arg(long, default_value_t = 0.7)]
    pub zmax: f64,
    /// Matter density today
    #[arg(long, default_value_t = 0.274)]
    pub om: f64,
    /// First file index
    #[arg(long = "nstart", default_value_t = 0)]
    pub first: usize,
    /// Last file index, exclusive
    #[arg(long = "nend", default_value_t = 0)]
    pub last: usize,
    /// Logging level
    #[arg(long, value_enum, default_value_t)]
    pub logging: Logging,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            weight: String::new(),
            input: String::new(),
            output: String::new(),
            pk: 20000.0,
            zmin: 0.43,
            zmax: 0.7,
            om: 0.274,
            first: 0,
            last: 0,
            logging: Logging::default(),
        }
    }
}

impl ConversionConfig {
    /// Check that the required settings are present
    pub fn validate(&self) -> Result<()> {
        for (value, what) in [
            (&self.weight, "a weight file"),
            (&self.input, "an input pattern"),
            (&self.output, "an output pattern"),
        ] {
            if value.is_empty() {
                return Err(Error::InvalidArgument(format!("need to specify {what}")));
            }
        }
        if self.zmin >= self.zmax {
            return Err(Error::InvalidArgument(format!(
                "zmin = {} must be smaller than zmax = {}",
                self.zmin, self.zmax
            )));
        }
        Ok(())
    }
}

/// Settings for computing comoving distances
#[derive(Debug, Clone, PartialEq, Args)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DistanceConfig {
    /// Matter density today
    #[arg(long, default_value_t = 0.27)]
    pub om: f64,
    /// Dark energy density today; flat if not given
    #[arg(long)]
    pub ode: Option<f64>,
    /// Dimensionless Hubble constant; 1 gives distances in Mpc/h
    #[arg(long, default_value_t = 1.0)]
    pub h: f64,
    /// Redshifts
    pub redshifts: Vec<f64>,
    /// Logging level
    #[arg(long, value_enum, default_value_t)]
    pub logging: Logging,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            om: 0.27,
            ode: None,
            h: 1.0,
            redshifts: vec![],
            logging: Logging::default(),
        }
    }
}

/// Read a configuration from a RON file
#[cfg(feature = "serde")]
pub fn load_config<T: serde::de::DeserializeOwned>(path: impl AsRef<std::path::Path>) -> Result<T> {
    let text = std::fs::read_to_string(path.as_ref())?;
    Ok(ron::from_str(&text)?)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_logging() {
        assert_eq!(Logging::from_verbosity(0), Logging::Off);
        assert_eq!(Logging::from_verbosity(2), Logging::Info);
        assert_eq!(Logging::from_verbosity(9), Logging::Trace);
        assert_eq!(Logging::Debug.filter(), LevelFilter::Debug);
        assert_eq!(Logging::default().filter(), LevelFilter::Warn);
    }

    #[test]
    fn test_validate() {
        let mut config = ConversionConfig::default();
        assert!(config.validate().is_err());
        config.weight = "nz.dat".to_string();
        config.input = "a%03d.rdzw".to_string();
        config.output = "a%03d.dat".to_string();
        config.validate().unwrap();
        config.zmax = 0.1;
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_ron_defaults() {
        let config: ConversionConfig =
            ron::from_str("(weight: \"nz.dat\", zmax: 0.65, logging: info)").unwrap();
        assert_eq!(config.weight, "nz.dat");
        assert_eq!(config.zmax, 0.65);
        assert_eq!(config.zmin, 0.43);
        assert_eq!(config.pk, 20000.0);
        assert_eq!(config.logging, Logging::Info);

        let config: DistanceConfig =
            ron::from_str("(ode: Some(0.7), redshifts: [0.1, 1.0])").unwrap();
        assert_eq!(config.ode, Some(0.7));
        assert_eq!(config.redshifts, vec![0.1, 1.0]);
        assert_eq!(config.h, 1.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_load_config() {
        let path =
            std::env::temp_dir().join(format!("ndparticles-{}-config.ron", std::process::id()));
        std::fs::write(&path, "(om: 0.3, redshifts: [0.5])").unwrap();
        let config: DistanceConfig = load_config(&path).unwrap();
        assert_eq!(config.om, 0.3);
        std::fs::remove_file(&path).unwrap();
        assert!(load_config::<DistanceConfig>(&path).is_err());
    }
}
