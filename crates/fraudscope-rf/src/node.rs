/// Zero-based feature column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based feature column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Position of a node inside a tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node in a decision tree arena.
///
/// Children are referenced by [`NodeIndex`]; the root always sits at index 0.
#[derive(Debug, Clone)]
pub enum Node {
    /// Interior node: samples with `value <= threshold` go left.
    Split {
        /// Feature tested at this node.
        feature: FeatureIndex,
        /// Split threshold (midpoint between two adjacent training values).
        threshold: f64,
        /// Left child.
        left: NodeIndex,
        /// Right child.
        right: NodeIndex,
        /// Training samples that reached this node.
        n_samples: usize,
    },
    /// Terminal node holding the class distribution of its training samples.
    Leaf {
        /// Class probabilities, one entry per class, summing to 1.0.
        distribution: Vec<f64>,
        /// Training samples in this leaf.
        n_samples: usize,
    },
}

impl Node {
    /// Return the number of training samples that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_sample_counts() {
        let leaf = Node::Leaf {
            distribution: vec![0.25, 0.75],
            n_samples: 4,
        };
        let split = Node::Split {
            feature: FeatureIndex::new(0),
            threshold: 1.5,
            left: NodeIndex::new(1),
            right: NodeIndex::new(2),
            n_samples: 9,
        };
        assert!(leaf.is_leaf());
        assert!(!split.is_leaf());
        assert_eq!(leaf.n_samples(), 4);
        assert_eq!(split.n_samples(), 9);
    }
}
