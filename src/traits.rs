//! Traits

mod cosmology;
mod element;
mod gridder;
#[cfg(feature = "serde")]
mod io;
mod line_record;
mod particle;

pub use cosmology::Hubble;
pub use element::Element;
pub use gridder::Gridder;
#[cfg(feature = "serde")]
pub use io::{RONExportParallel, RONImportParallel};
pub use line_record::LineRecord;
pub use particle::{Domainer, Positioned};
