//! Distributed particles on MPI
//!
//! Distributed vectors with scatters and ghost updates, particle redistribution between ranks,
//! and the numerical and I/O helpers used by the command line tools.
#![cfg_attr(feature = "strict", deny(warnings), deny(unused_crate_dependencies))]
#![warn(missing_docs)]

pub mod catalogue;
pub mod comm;
pub mod config;
pub mod cosmo;
mod error;
pub mod fft;
mod io;
pub mod layout;
pub mod lineio;
pub mod numerics;
pub mod particles;
pub mod runner;
pub mod traits;
pub mod types;
pub mod vector;

pub use error::{Error, NumericalError, Result};
pub use layout::IndexLayout;
pub use particles::{FieldParticles, ParticleVec};
pub use vector::{DistributedVec, GhostedVec, IndexSet, VecScatter};
