use rand::Rng;

use crate::node::FeatureIndex;

/// Gini impurity `1 - Σ p_i²` of a node with the given per-class counts.
///
/// An empty node has impurity 0.
pub(crate) fn gini(class_counts: &[usize], n_samples: usize) -> f64 {
    if n_samples == 0 {
        return 0.0;
    }
    let n = n_samples as f64;
    1.0 - class_counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

/// Winning split for one node, with the node's samples already partitioned.
#[derive(Debug, Clone)]
pub(crate) struct BestSplit {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    pub(crate) left: Vec<usize>,
    pub(crate) right: Vec<usize>,
}

/// Exact split search over a column-major training matrix.
///
/// `columns[feature][sample]` holds one feature column per inner `Vec`;
/// sample indices passed to [`SplitSearch::best_split`] index into those columns.
pub(crate) struct SplitSearch<'a> {
    pub(crate) columns: &'a [Vec<f64>],
    pub(crate) labels: &'a [usize],
    pub(crate) n_classes: usize,
    pub(crate) min_samples_leaf: usize,
}

impl SplitSearch<'_> {
    /// Count labels among `samples`.
    pub(crate) fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &s in samples {
            counts[self.labels[s]] += 1;
        }
        counts
    }

    /// Find the split with the largest weighted impurity decrease among
    /// `max_features` randomly drawn features.
    ///
    /// Returns `None` when every drawn feature is constant over `samples`
    /// or every boundary would leave a child smaller than `min_samples_leaf`.
    pub(crate) fn best_split(
        &self,
        samples: &[usize],
        max_features: usize,
        rng: &mut impl Rng,
    ) -> Option<BestSplit> {
        let n_features = self.columns.len();
        let n = samples.len();
        if n < 2 || n_features == 0 {
            return None;
        }

        let parent_counts = self.class_counts(samples);
        let parent_weighted = n as f64 * gini(&parent_counts, n);

        // Partial Fisher-Yates over feature ids.
        let take = max_features.clamp(1, n_features);
        let mut candidates: Vec<usize> = (0..n_features).collect();
        for i in 0..take {
            let j = rng.gen_range(i..n_features);
            candidates.swap(i, j);
        }

        let mut best_decrease = f64::NEG_INFINITY;
        let mut best: Option<(usize, f64)> = None;
        let mut ordered: Vec<(f64, usize)> = Vec::with_capacity(n);

        for &feature in &candidates[..take] {
            let column = &self.columns[feature];
            ordered.clear();
            ordered.extend(samples.iter().map(|&s| (column[s], self.labels[s])));
            ordered.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_counts = vec![0usize; self.n_classes];
            let mut right_counts = parent_counts.clone();

            for i in 0..n - 1 {
                let (value, class) = ordered[i];
                left_counts[class] += 1;
                right_counts[class] -= 1;

                let next = ordered[i + 1].0;
                if value == next {
                    continue;
                }
                let n_left = i + 1;
                let n_right = n - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let decrease = parent_weighted
                    - n_left as f64 * gini(&left_counts, n_left)
                    - n_right as f64 * gini(&right_counts, n_right);
                if decrease > best_decrease {
                    // The midpoint of adjacent floats can round up to `next`.
                    let mut threshold = value + (next - value) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best_decrease = decrease;
                    best = Some((feature, threshold));
                }
            }
        }

        let (feature, threshold) = best?;
        let column = &self.columns[feature];
        let (left, right): (Vec<usize>, Vec<usize>) =
            samples.iter().partition(|&&s| column[s] <= threshold);
        if left.is_empty() || right.is_empty() {
            return None;
        }

        Some(BestSplit {
            feature: FeatureIndex::new(feature),
            threshold,
            left,
            right,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn search<'a>(
        columns: &'a [Vec<f64>],
        labels: &'a [usize],
        min_samples_leaf: usize,
    ) -> SplitSearch<'a> {
        SplitSearch {
            columns,
            labels,
            n_classes: 2,
            min_samples_leaf,
        }
    }

    // ---------------------------------------------------------------
    // Impurity
    // ---------------------------------------------------------------

    #[test]
    fn gini_values() {
        assert!(gini(&[8, 0], 8).abs() < 1e-12);
        assert!((gini(&[4, 4], 8) - 0.5).abs() < 1e-12);
        assert!((gini(&[3, 1], 4) - 0.375).abs() < 1e-12);
    }

    #[test]
    fn empty_node_is_pure() {
        assert_eq!(gini(&[0, 0], 0), 0.0);
    }

    // ---------------------------------------------------------------
    // Split search
    // ---------------------------------------------------------------

    #[test]
    fn separable_column_is_split_at_midpoint() {
        let columns = vec![vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let samples: Vec<usize> = (0..6).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let split = search(&columns, &labels, 1)
            .best_split(&samples, 1, &mut rng)
            .expect("separable data must split");
        assert_eq!(split.feature.index(), 0);
        assert!((split.threshold - 6.5).abs() < 1e-12);
        assert_eq!(split.left, vec![0, 1, 2]);
        assert_eq!(split.right, vec![3, 4, 5]);
    }

    #[test]
    fn adjacent_values_keep_both_children_non_empty() {
        // The midpoint of these two rounds up to the larger value.
        let low = 1.0 + f64::EPSILON;
        let high = 1.0 + 2.0 * f64::EPSILON;
        assert_eq!(low + (high - low) / 2.0, high);

        let columns = vec![vec![low, high]];
        let labels = vec![0, 1];
        let samples: Vec<usize> = (0..2).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let split = search(&columns, &labels, 1)
            .best_split(&samples, 1, &mut rng)
            .expect("distinct values must split");
        assert_eq!(split.threshold, low);
        assert_eq!(split.left, vec![0]);
        assert_eq!(split.right, vec![1]);
    }

    #[test]
    fn informative_feature_beats_noise() {
        let columns = vec![
            vec![5.0, 1.0, 4.0, 2.0, 3.0, 6.0],
            vec![0.0, 0.1, 0.2, 0.9, 1.0, 1.1],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let samples: Vec<usize> = (0..6).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let split = search(&columns, &labels, 1)
            .best_split(&samples, 2, &mut rng)
            .expect("split exists");
        assert_eq!(split.feature.index(), 1);
    }

    #[test]
    fn constant_column_has_no_split() {
        let columns = vec![vec![2.0; 4]];
        let labels = vec![0, 1, 0, 1];
        let samples: Vec<usize> = (0..4).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(
            search(&columns, &labels, 1)
                .best_split(&samples, 1, &mut rng)
                .is_none()
        );
    }

    #[test]
    fn min_samples_leaf_blocks_small_children() {
        let columns = vec![vec![1.0, 2.0, 3.0]];
        let labels = vec![0, 1, 1];
        let samples: Vec<usize> = (0..3).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(
            search(&columns, &labels, 2)
                .best_split(&samples, 1, &mut rng)
                .is_none()
        );
    }

    #[test]
    fn bootstrap_duplicates_partition_consistently() {
        let columns = vec![vec![1.0, 9.0]];
        let labels = vec![0, 1];
        let samples = vec![0, 0, 1, 1, 1];
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let split = search(&columns, &labels, 1)
            .best_split(&samples, 1, &mut rng)
            .expect("two distinct values");
        assert_eq!(split.left, vec![0, 0]);
        assert_eq!(split.right, vec![1, 1, 1]);
    }
}
