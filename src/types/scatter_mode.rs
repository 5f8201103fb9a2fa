//! Scatter mode

/// Direction in which a scatter moves values
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub enum ScatterMode {
    /// From the source indices of the plan to its destination indices
    #[default]
    Forward,
    /// From the destination indices of the plan back to its source indices
    Reverse,
}
