//! Particles

mod domain;
mod field;
mod format;
mod plan;
mod pos_weight;
mod struct_vec;

pub use domain::{domain_decompose, Slab};
pub use field::{FieldParticles, LocalParticles};
pub use format::FieldFormat;
pub use plan::RedistributionPlan;
pub use pos_weight::PosWeight;
pub use struct_vec::ParticleVec;
