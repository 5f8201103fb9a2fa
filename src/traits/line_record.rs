//! Line-oriented input
use crate::Result;

pub trait LineRecord {
    //! A collection that is filled one line at a time

    /// Add a line
    ///
    /// The line has already been trimmed, stripped of comments and is not empty.
    fn add(&mut self, line: &str) -> Result<()>;
}
