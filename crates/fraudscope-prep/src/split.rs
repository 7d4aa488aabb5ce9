//! Seeded train/test partition of row indices.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::error::PrepError;

/// Disjoint train and test row indices covering `0..n_rows`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    train: Vec<usize>,
    test: Vec<usize>,
}

impl TrainTestSplit {
    /// Training row indices, in shuffled order.
    #[must_use]
    pub fn train(&self) -> &[usize] {
        &self.train
    }

    /// Test row indices, in shuffled order.
    #[must_use]
    pub fn test(&self) -> &[usize] {
        &self.test
    }

    #[must_use]
    pub fn n_train(&self) -> usize {
        self.train.len()
    }

    #[must_use]
    pub fn n_test(&self) -> usize {
        self.test.len()
    }
}

/// Shuffle `0..n_rows` with a seeded ChaCha8 stream and cut it in two.
///
/// The first `ceil(test_fraction * n_rows)` shuffled indices form the test
/// set and the rest the training set. Rows are not stratified by label.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PrepError::InvalidTestFraction`] | `test_fraction` is not in (0, 1) |
/// | [`PrepError::EmptyPartition`] | Either partition would be empty |
#[instrument]
pub fn train_test_split(
    n_rows: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit, PrepError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PrepError::InvalidTestFraction { test_fraction });
    }
    let n_test = (test_fraction * n_rows as f64).ceil() as usize;
    let n_train = n_rows.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(PrepError::EmptyPartition {
            n_rows,
            n_test,
            n_train,
        });
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let train = indices.split_off(n_test);

    info!(n_train, n_test, "train/test split");
    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}
