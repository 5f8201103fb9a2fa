//! Types

mod insert_mode;
mod ownership;
mod scatter_mode;

pub use insert_mode::InsertMode;
pub use ownership::Ownership;
pub use scatter_mode::ScatterMode;
