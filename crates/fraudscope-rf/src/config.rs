//! Configuration builder for random forest training.

use std::fmt;

use crate::error::RfError;
use crate::forest::RandomForest;

/// Strategy for the number of features drawn at each split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least 1.
    #[default]
    Sqrt,
    /// Every feature at every split.
    All,
}

impl MaxFeatures {
    /// Resolve the strategy to a concrete count for `n_features` columns.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidMaxFeatures`] when `n_features` is zero.
    pub fn resolve(self, n_features: usize) -> Result<usize, RfError> {
        let resolved = match self {
            MaxFeatures::Sqrt => ((n_features as f64).sqrt().floor() as usize).max(1),
            MaxFeatures::All => n_features,
        };
        if resolved == 0 || resolved > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features: resolved,
                n_features,
            });
        }
        Ok(resolved)
    }
}

/// The hyperparameters searched by [`GridSearch`](crate::GridSearch).
///
/// `max_depth = None` grows trees until leaves are pure or too small to split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ForestParams {
    /// Number of trees.
    pub n_estimators: usize,
    /// Depth limit (root is depth 0).
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs before a split is attempted.
    pub min_samples_split: usize,
    /// Minimum samples each child must keep after a split.
    pub min_samples_leaf: usize,
    /// Draw a bootstrap sample per tree instead of using every row.
    pub bootstrap: bool,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
        }
    }
}

impl fmt::Display for ForestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let depth = match self.max_depth {
            Some(d) => d.to_string(),
            None => "None".to_string(),
        };
        write!(
            f,
            "n_estimators={}, max_depth={depth}, min_samples_split={}, min_samples_leaf={}, bootstrap={}",
            self.n_estimators, self.min_samples_split, self.min_samples_leaf, self.bootstrap
        )
    }
}

/// Configuration for random forest training.
///
/// Construct via [`RandomForestConfig::new`] or [`Default`], then chain
/// `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default  |
/// |---------------------|----------|
/// | `n_trees`           | 100      |
/// | `max_features`      | `Sqrt`   |
/// | `max_depth`         | `None`   |
/// | `min_samples_split` | 2        |
/// | `min_samples_leaf`  | 1        |
/// | `bootstrap`         | `true`   |
/// | `seed`              | 42       |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) max_features: MaxFeatures,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) bootstrap: bool,
    pub(crate) seed: u64,
}

impl RandomForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, RfError> {
        if n_trees == 0 {
            return Err(RfError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            ..Self::default()
        })
    }

    /// Create a config from a grid candidate, keeping every other setting at
    /// its default.
    ///
    /// # Errors
    ///
    /// Same conditions as [`RandomForestConfig::validate`].
    pub fn from_params(params: ForestParams) -> Result<Self, RfError> {
        let config = Self::default().with_params(params);
        config.validate()?;
        Ok(config)
    }

    // --- Setters ---

    /// Overwrite the tunable hyperparameters with `params`.
    #[must_use]
    pub fn with_params(mut self, params: ForestParams) -> Self {
        self.n_trees = params.n_estimators;
        self.max_depth = params.max_depth;
        self.min_samples_split = params.min_samples_split;
        self.min_samples_leaf = params.min_samples_leaf;
        self.bootstrap = params.bootstrap;
        self
    }

    /// Set the max features strategy.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the maximum tree depth. `None` means unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples required in each leaf after a split.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Enable or disable per-tree bootstrap sampling.
    #[must_use]
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the max features strategy.
    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the minimum samples required to split a node.
    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    /// Return the minimum samples required in each leaf.
    #[must_use]
    pub fn min_samples_leaf(&self) -> usize {
        self.min_samples_leaf
    }

    /// Return whether trees are grown on bootstrap samples.
    #[must_use]
    pub fn bootstrap(&self) -> bool {
        self.bootstrap
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the tunable hyperparameters as a [`ForestParams`].
    #[must_use]
    pub fn params(&self) -> ForestParams {
        ForestParams {
            n_estimators: self.n_trees,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            bootstrap: self.bootstrap,
        }
    }

    /// Check the settings that do not depend on the training data.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::InvalidTreeCount`] | `n_trees` is zero |
    /// | [`RfError::InvalidMaxDepth`] | `max_depth` is `Some(0)` |
    /// | [`RfError::InvalidMinSamplesSplit`] | `min_samples_split` < 2 |
    /// | [`RfError::InvalidMinSamplesLeaf`] | `min_samples_leaf` < 1 |
    pub fn validate(&self) -> Result<(), RfError> {
        if self.n_trees == 0 {
            return Err(RfError::InvalidTreeCount {
                n_trees: self.n_trees,
            });
        }
        if self.max_depth == Some(0) {
            return Err(RfError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(RfError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }
        Ok(())
    }

    /// Train a random forest on the provided dataset.
    ///
    /// `features[sample][feature]` is row-major; `labels[sample]` are
    /// zero-based class labels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | Any variant of [`RandomForestConfig::validate`] | Invalid settings |
    /// | [`RfError::EmptyDataset`] | `features` is empty |
    /// | [`RfError::ZeroFeatures`] | Rows have zero feature columns |
    /// | [`RfError::LabelCountMismatch`] | `labels.len() != features.len()` |
    /// | [`RfError::FeatureCountMismatch`] | Rows have inconsistent lengths |
    /// | [`RfError::NonFiniteValue`] | Any value is NaN or infinite |
    /// | [`RfError::InvalidMaxFeatures`] | `max_features` resolves outside `[1, n_features]` |
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<RandomForest, RfError> {
        crate::forest::train(self, features, labels)
    }
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        let params = ForestParams::default();
        Self {
            n_trees: params.n_estimators,
            max_features: MaxFeatures::Sqrt,
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
            bootstrap: params.bootstrap,
            seed: 42,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_library_defaults() {
        let config = RandomForestConfig::default();
        assert_eq!(config.n_trees(), 100);
        assert_eq!(config.max_features(), MaxFeatures::Sqrt);
        assert_eq!(config.max_depth(), None);
        assert_eq!(config.min_samples_split(), 2);
        assert_eq!(config.min_samples_leaf(), 1);
        assert!(config.bootstrap());
        assert_eq!(config.seed(), 42);
        assert_eq!(config.params(), ForestParams::default());
    }

    #[test]
    fn sqrt_rounds_down() {
        assert_eq!(MaxFeatures::Sqrt.resolve(8).unwrap(), 2);
        assert_eq!(MaxFeatures::Sqrt.resolve(9).unwrap(), 3);
        assert_eq!(MaxFeatures::Sqrt.resolve(1).unwrap(), 1);
        assert_eq!(MaxFeatures::All.resolve(8).unwrap(), 8);
    }

    #[test]
    fn zero_features_cannot_be_resolved() {
        assert!(matches!(
            MaxFeatures::Sqrt.resolve(0),
            Err(RfError::InvalidMaxFeatures {
                max_features: 1,
                n_features: 0
            })
        ));
        assert!(MaxFeatures::All.resolve(0).is_err());
    }

    #[test]
    fn params_round_trip_through_config() {
        let params = ForestParams {
            n_estimators: 300,
            max_depth: Some(20),
            min_samples_split: 5,
            min_samples_leaf: 4,
            bootstrap: false,
        };
        let config = RandomForestConfig::from_params(params).unwrap();
        assert_eq!(config.params(), params);
        assert_eq!(config.seed(), 42);
    }

    #[test]
    fn validate_rejects_bad_settings() {
        assert!(RandomForestConfig::new(0).is_err());
        let base = RandomForestConfig::default();
        assert!(matches!(
            base.clone().with_max_depth(Some(0)).validate(),
            Err(RfError::InvalidMaxDepth { .. })
        ));
        assert!(matches!(
            base.clone().with_min_samples_split(1).validate(),
            Err(RfError::InvalidMinSamplesSplit { .. })
        ));
        assert!(matches!(
            base.with_min_samples_leaf(0).validate(),
            Err(RfError::InvalidMinSamplesLeaf { .. })
        ));
    }

    #[test]
    fn params_display_uses_none_for_unbounded_depth() {
        let text = ForestParams::default().to_string();
        assert!(text.contains("max_depth=None"));
        assert!(text.contains("n_estimators=100"));
    }
}
