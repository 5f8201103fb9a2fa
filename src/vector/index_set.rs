//! Index sets

/// An ordered list of global indices
///
/// Blocked index sets store block indices and expand each of them to `block_size` consecutive
/// element indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSet {
    indices: Vec<usize>,
    block_size: usize,
}

impl IndexSet {
    /// The indices `first, first + step, ..., first + (n - 1) * step`
    pub fn stride(n: usize, first: usize, step: usize) -> Self {
        Self {
            indices: (0..n).map(|i| first + i * step).collect(),
            block_size: 1,
        }
    }

    /// An arbitrary list of indices
    pub fn general(indices: Vec<usize>) -> Self {
        Self {
            indices,
            block_size: 1,
        }
    }

    /// A list of block indices
    pub fn blocked(block_size: usize, block_indices: Vec<usize>) -> Self {
        Self {
            indices: block_indices,
            block_size,
        }
    }

    /// Block size
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// The stored indices, which are block indices for a blocked set
    pub fn block_indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of element indices
    pub fn len(&self) -> usize {
        self.indices.len() * self.block_size
    }

    /// Is the set empty?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element indices
    pub fn indices(&self) -> Vec<usize> {
        if self.block_size == 1 {
            return self.indices.clone();
        }
        let bs = self.block_size;
        self.indices
            .iter()
            .flat_map(|b| b * bs..(b + 1) * bs)
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_stride() {
        let is = IndexSet::stride(4, 3, 2);
        assert_eq!(is.indices(), vec![3, 5, 7, 9]);
        assert_eq!(is.len(), 4);
        assert!(IndexSet::stride(0, 3, 2).is_empty());
    }

    #[test]
    fn test_general() {
        let is = IndexSet::general(vec![7, 1, 7]);
        assert_eq!(is.indices(), vec![7, 1, 7]);
        assert_eq!(is.block_size(), 1);
    }

    #[test]
    fn test_blocked() {
        let is = IndexSet::blocked(3, vec![2, 0]);
        assert_eq!(is.len(), 6);
        assert_eq!(is.block_indices(), &[2, 0]);
        assert_eq!(is.indices(), vec![6, 7, 8, 0, 1, 2]);
    }
}
