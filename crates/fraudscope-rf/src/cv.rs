//! Stratified k-fold cross-validation for random forests.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument, warn};

use crate::config::RandomForestConfig;
use crate::error::RfError;
use crate::forest::validate_dataset;

/// Cross-validation configuration.
///
/// Construct via [`CrossValidation::new`], then chain `with_seed` if desired.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    n_folds: usize,
    seed: u64,
}

/// Per-fold and aggregate accuracy of one configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CvScore {
    /// Held-out accuracy of each fold, in fold order.
    pub fold_accuracies: Vec<f64>,
    /// Mean of `fold_accuracies`.
    pub mean_accuracy: f64,
    /// Population standard deviation of `fold_accuracies`.
    pub std_accuracy: f64,
}

impl CvScore {
    fn from_folds(fold_accuracies: Vec<f64>) -> Self {
        let n = fold_accuracies.len() as f64;
        let mean_accuracy = fold_accuracies.iter().sum::<f64>() / n;
        let variance = fold_accuracies
            .iter()
            .map(|a| (a - mean_accuracy).powi(2))
            .sum::<f64>()
            / n;
        Self {
            fold_accuracies,
            mean_accuracy,
            std_accuracy: variance.sqrt(),
        }
    }
}

impl Default for CrossValidation {
    /// Three folds, seed 42.
    fn default() -> Self {
        Self { n_folds: 3, seed: 42 }
    }
}

impl CrossValidation {
    /// Create a new cross-validation config with the given number of folds.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, RfError> {
        if n_folds < 2 {
            return Err(RfError::InvalidFoldCount { n_folds });
        }
        Ok(Self { n_folds, seed: 42 })
    }

    /// Set the random seed for fold shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the number of folds.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Return the fold shuffling seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Assign each sample to a fold, preserving class proportions.
    ///
    /// Samples are grouped by class, shuffled within each class, then dealt
    /// round-robin across folds. A class with fewer samples than folds is
    /// still dealt and only reaches the first folds; this is logged at warn
    /// level.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | `labels` is empty |
    /// | [`RfError::TooFewSamplesForFolds`] | Every class has fewer samples than folds |
    pub fn fold_assignments(&self, labels: &[usize]) -> Result<Vec<usize>, RfError> {
        let Some(&max_label) = labels.iter().max() else {
            return Err(RfError::EmptyDataset);
        };

        let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); max_label + 1];
        for (i, &label) in labels.iter().enumerate() {
            by_class[label].push(i);
        }

        // The largest class fills every fold, so no test fold is empty.
        let (largest, largest_count) = by_class
            .iter()
            .map(Vec::len)
            .enumerate()
            .max_by_key(|&(_, count)| count)
            .unwrap_or((0, 0));
        if largest_count < self.n_folds {
            return Err(RfError::TooFewSamplesForFolds {
                class: largest,
                count: largest_count,
                n_folds: self.n_folds,
            });
        }
        for (class, members) in by_class.iter().enumerate() {
            if !members.is_empty() && members.len() < self.n_folds {
                warn!(
                    class,
                    count = members.len(),
                    n_folds = self.n_folds,
                    "class has fewer samples than folds; some folds will not contain it"
                );
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut assignment = vec![0usize; labels.len()];
        for members in &mut by_class {
            members.shuffle(&mut rng);
            for (j, &sample) in members.iter().enumerate() {
                assignment[sample] = j % self.n_folds;
            }
        }
        Ok(assignment)
    }

    /// Run stratified k-fold cross-validation of `config`.
    ///
    /// Each fold trains on the other folds and scores accuracy on itself.
    /// Fold `k` trains with seed `config.seed() + k`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | Zero samples |
    /// | [`RfError::TooFewSamplesForFolds`] | Every class has fewer samples than folds |
    /// | Other RF errors | From validation or training |
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_samples = features.len()))]
    pub fn evaluate(
        &self,
        config: &RandomForestConfig,
        features: &[Vec<f64>],
        labels: &[usize],
    ) -> Result<CvScore, RfError> {
        validate_dataset(features, labels)?;
        let assignment = self.fold_assignments(labels)?;
        self.evaluate_with_folds(config, features, labels, &assignment)
    }

    /// Cross-validate `config` against precomputed fold assignments.
    pub(crate) fn evaluate_with_folds(
        &self,
        config: &RandomForestConfig,
        features: &[Vec<f64>],
        labels: &[usize],
        assignment: &[usize],
    ) -> Result<CvScore, RfError> {
        let mut fold_accuracies = Vec::with_capacity(self.n_folds);

        for fold in 0..self.n_folds {
            let mut train_features = Vec::new();
            let mut train_labels = Vec::new();
            let mut test_features = Vec::new();
            let mut test_labels = Vec::new();

            for (i, &assigned) in assignment.iter().enumerate() {
                if assigned == fold {
                    test_features.push(features[i].clone());
                    test_labels.push(labels[i]);
                } else {
                    train_features.push(features[i].clone());
                    train_labels.push(labels[i]);
                }
            }

            let fold_config = config
                .clone()
                .with_seed(config.seed.wrapping_add(fold as u64));
            let forest = fold_config.fit(&train_features, &train_labels)?;
            let predictions = forest.predict_batch(&test_features)?;

            let correct = predictions
                .iter()
                .zip(&test_labels)
                .filter(|&(p, l)| p == l)
                .count();
            let accuracy = correct as f64 / test_labels.len() as f64;
            debug!(fold, accuracy, "fold completed");
            fold_accuracies.push(accuracy);
        }

        Ok(CvScore::from_folds(fold_accuracies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaxFeatures;

    fn make_separable_data() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            features.push(vec![i as f64 * 0.1, 0.5]);
            labels.push(0);
        }
        for i in 0..15 {
            features.push(vec![10.0 + i as f64 * 0.1, 0.5]);
            labels.push(1);
        }
        (features, labels)
    }

    #[test]
    fn three_fold_separable_accuracy() {
        let (features, labels) = make_separable_data();
        let config = RandomForestConfig::new(10)
            .unwrap()
            .with_max_features(MaxFeatures::All);
        let score = CrossValidation::new(3)
            .unwrap()
            .evaluate(&config, &features, &labels)
            .unwrap();
        assert_eq!(score.fold_accuracies.len(), 3);
        assert!((score.mean_accuracy - 1.0).abs() < 1e-12);
        assert!(score.std_accuracy.abs() < 1e-12);
    }

    #[test]
    fn folds_are_stratified() {
        let (_, labels) = make_separable_data();
        let assignment = CrossValidation::new(3).unwrap().fold_assignments(&labels).unwrap();
        for fold in 0..3 {
            let positives = assignment
                .iter()
                .zip(&labels)
                .filter(|&(&f, &l)| f == fold && l == 1)
                .count();
            let negatives = assignment
                .iter()
                .zip(&labels)
                .filter(|&(&f, &l)| f == fold && l == 0)
                .count();
            assert_eq!(positives, 5);
            assert_eq!(negatives, 10);
        }
    }

    #[test]
    fn fold_assignment_depends_on_seed() {
        let (_, labels) = make_separable_data();
        let a = CrossValidation::new(3).unwrap().fold_assignments(&labels).unwrap();
        let b = CrossValidation::new(3).unwrap().fold_assignments(&labels).unwrap();
        let c = CrossValidation::new(3)
            .unwrap()
            .with_seed(7)
            .fold_assignments(&labels)
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn score_statistics() {
        let score = CvScore::from_folds(vec![0.5, 1.0]);
        assert!((score.mean_accuracy - 0.75).abs() < 1e-12);
        assert!((score.std_accuracy - 0.25).abs() < 1e-12);
    }

    #[test]
    fn invalid_fold_count() {
        assert!(CrossValidation::new(0).is_err());
        assert!(CrossValidation::new(1).is_err());
    }

    #[test]
    fn short_class_is_dealt_to_leading_folds() {
        let features = vec![vec![1.0], vec![2.0], vec![10.0], vec![11.0], vec![12.0]];
        let labels = vec![0, 0, 1, 1, 1];
        let cv = CrossValidation::new(3).unwrap();

        let assignment = cv.fold_assignments(&labels).unwrap();
        let mut short_folds: Vec<usize> = assignment[..2].to_vec();
        short_folds.sort_unstable();
        assert_eq!(short_folds, vec![0, 1]);
        let mut long_folds: Vec<usize> = assignment[2..].to_vec();
        long_folds.sort_unstable();
        assert_eq!(long_folds, vec![0, 1, 2]);

        let score = cv
            .evaluate(&RandomForestConfig::new(5).unwrap(), &features, &labels)
            .unwrap();
        assert_eq!(score.fold_accuracies.len(), 3);
    }

    #[test]
    fn too_few_samples_in_every_class() {
        let features = vec![vec![1.0], vec![2.0], vec![10.0], vec![11.0]];
        let labels = vec![0, 0, 1, 1];
        let err = CrossValidation::new(3)
            .unwrap()
            .evaluate(&RandomForestConfig::new(5).unwrap(), &features, &labels)
            .unwrap_err();
        assert!(matches!(
            err,
            RfError::TooFewSamplesForFolds {
                count: 2,
                n_folds: 3,
                ..
            }
        ));
    }
}
