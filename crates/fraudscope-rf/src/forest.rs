//! Random forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, instrument};

use crate::config::RandomForestConfig;
use crate::error::RfError;
use crate::split::SplitSearch;
use crate::tree::{DecisionTree, GrowthLimits};

/// A fitted random forest ensemble.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

/// Check a row-major training set and return its feature count.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`RfError::EmptyDataset`] | `features` is empty |
/// | [`RfError::LabelCountMismatch`] | `labels.len() != features.len()` |
/// | [`RfError::ZeroFeatures`] | Rows have zero feature columns |
/// | [`RfError::FeatureCountMismatch`] | Rows have inconsistent lengths |
/// | [`RfError::NonFiniteValue`] | Any value is NaN or infinite |
pub(crate) fn validate_dataset(features: &[Vec<f64>], labels: &[usize]) -> Result<usize, RfError> {
    let Some(first) = features.first() else {
        return Err(RfError::EmptyDataset);
    };
    if labels.len() != features.len() {
        return Err(RfError::LabelCountMismatch {
            n_features_rows: features.len(),
            n_labels: labels.len(),
        });
    }
    let n_features = first.len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(RfError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }
    Ok(n_features)
}

/// Sample indices one tree is grown on.
fn tree_sample(n_samples: usize, bootstrap: bool, rng: &mut impl Rng) -> Vec<usize> {
    if bootstrap {
        (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
    } else {
        (0..n_samples).collect()
    }
}

/// Train the random forest ensemble.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<RandomForest, RfError> {
    config.validate()?;
    let n_features = validate_dataset(features, labels)?;
    let max_features = config.max_features.resolve(n_features)?;
    let n_samples = features.len();
    let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;

    debug!(
        n_samples,
        n_features,
        n_classes,
        max_features,
        bootstrap = config.bootstrap,
        "training random forest"
    );

    let columns: Vec<Vec<f64>> = (0..n_features)
        .map(|f| features.iter().map(|row| row[f]).collect())
        .collect();
    let search = SplitSearch {
        columns: &columns,
        labels,
        n_classes,
        min_samples_leaf: config.min_samples_leaf,
    };
    let limits = GrowthLimits {
        max_depth: config.max_depth,
        min_samples_split: config.min_samples_split,
        max_features,
    };

    // Per-tree seeds come from one master stream so results do not depend
    // on rayon scheduling.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();
    let bootstrap = config.bootstrap;

    let trees: Vec<DecisionTree> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let samples = tree_sample(n_samples, bootstrap, &mut rng);
            DecisionTree::grow(&search, samples, &limits, &mut rng)
        })
        .collect();

    debug!(
        n_trees = trees.len(),
        mean_depth = trees.iter().map(DecisionTree::depth).sum::<usize>() as f64
            / trees.len() as f64,
        "random forest trained"
    );

    Ok(RandomForest {
        trees,
        n_features,
        n_classes,
    })
}
