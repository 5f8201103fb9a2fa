//! Distributed vectors

mod distributed;
mod ghosted;
mod index_set;
mod scatter;

pub use distributed::DistributedVec;
pub use ghosted::GhostedVec;
pub use index_set::IndexSet;
pub use scatter::VecScatter;
