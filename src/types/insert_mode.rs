//! Insert mode

/// How values are combined with the values already stored in a vector
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum InsertMode {
    /// Overwrite the stored value
    Insert,
    /// Add to the stored value
    Add,
}

impl InsertMode {
    // Bit used when ranks agree on the pending mode.
    pub(crate) fn bit(&self) -> u8 {
        match self {
            Self::Insert => 1,
            Self::Add => 2,
        }
    }

    pub(crate) fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(Self::Insert),
            2 => Some(Self::Add),
            _ => None,
        }
    }
}
