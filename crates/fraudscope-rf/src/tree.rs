use rand::Rng;
use tracing::trace;

use crate::node::{Node, NodeIndex};
use crate::split::SplitSearch;

/// Stopping rules shared by every tree of one forest.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GrowthLimits {
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) max_features: usize,
}

/// A fitted CART classification tree.
///
/// Nodes live in an arena; the root is `nodes[0]`.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_classes: usize,
}

/// Pending work item: a reserved arena slot and the samples that reach it.
struct Frontier {
    slot: usize,
    samples: Vec<usize>,
    depth: usize,
}

impl DecisionTree {
    /// Grow a tree over `samples`, which index into the columns of `search`.
    ///
    /// Duplicate indices (bootstrap draws) are counted once per occurrence.
    pub(crate) fn grow(
        search: &SplitSearch<'_>,
        samples: Vec<usize>,
        limits: &GrowthLimits,
        rng: &mut impl Rng,
    ) -> Self {
        let placeholder = || Node::Leaf {
            distribution: Vec::new(),
            n_samples: 0,
        };
        let mut nodes = vec![placeholder()];
        let mut stack = vec![Frontier {
            slot: 0,
            samples,
            depth: 0,
        }];

        while let Some(Frontier {
            slot,
            samples,
            depth,
        }) = stack.pop()
        {
            let n_samples = samples.len();
            let counts = search.class_counts(&samples);
            let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
            let at_depth_limit = limits.max_depth.is_some_and(|d| depth >= d);
            let too_small = n_samples < limits.min_samples_split;

            let split = if pure || at_depth_limit || too_small {
                None
            } else {
                search.best_split(&samples, limits.max_features, rng)
            };

            nodes[slot] = match split {
                Some(split) => {
                    let left = nodes.len();
                    let right = left + 1;
                    nodes.push(placeholder());
                    nodes.push(placeholder());
                    stack.push(Frontier {
                        slot: right,
                        samples: split.right,
                        depth: depth + 1,
                    });
                    stack.push(Frontier {
                        slot: left,
                        samples: split.left,
                        depth: depth + 1,
                    });
                    Node::Split {
                        feature: split.feature,
                        threshold: split.threshold,
                        left: NodeIndex::new(left),
                        right: NodeIndex::new(right),
                        n_samples,
                    }
                }
                None => {
                    let total = n_samples.max(1) as f64;
                    Node::Leaf {
                        distribution: counts.iter().map(|&c| c as f64 / total).collect(),
                        n_samples,
                    }
                }
            };
        }

        trace!(n_nodes = nodes.len(), "tree grown");

        Self {
            nodes,
            n_classes: search.n_classes,
        }
    }

    /// Leaf class distribution reached by `sample`.
    ///
    /// The caller guarantees `sample` has the training feature count.
    pub(crate) fn leaf_distribution(&self, sample: &[f64]) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    index = if sample[feature.index()] <= *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
                Node::Leaf { distribution, .. } => return distribution,
            }
        }
    }

    /// Return the arena of nodes; the root is at index 0.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the number of classes this tree was grown for.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the number of leaves.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the depth of the deepest leaf (a lone root has depth 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            match &self.nodes[index] {
                Node::Split { left, right, .. } => {
                    stack.push((left.index(), depth + 1));
                    stack.push((right.index(), depth + 1));
                }
                Node::Leaf { .. } => deepest = deepest.max(depth),
            }
        }
        deepest
    }
}
