//! Prediction methods for the random forest ensemble.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::RfError;
use crate::forest::RandomForest;

/// Averaged class probabilities for one sample.
#[derive(Debug, Clone)]
pub struct ClassDistribution {
    probs: Vec<f64>,
}

impl ClassDistribution {
    pub(crate) fn new(probs: Vec<f64>) -> Self {
        Self { probs }
    }

    /// Return the most probable class. Ties go to the lowest class index.
    #[must_use]
    pub fn predicted_class(&self) -> usize {
        let mut best = 0;
        for (class, &p) in self.probs.iter().enumerate().skip(1) {
            if p > self.probs[best] {
                best = class;
            }
        }
        best
    }

    /// Return the probability of `class`, or 0.0 for a class the forest
    /// never saw during training.
    #[must_use]
    pub fn probability(&self, class: usize) -> f64 {
        self.probs.get(class).copied().unwrap_or(0.0)
    }

    /// Return the probability distribution as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }
}

impl RandomForest {
    /// Predict the class label for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        Ok(self.predict_proba(sample)?.predicted_class())
    }

    /// Return the class distribution for one sample, averaged over all trees.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<ClassDistribution, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }

        let mut avg = vec![0.0f64; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in avg.iter_mut().zip(tree.leaf_distribution(sample)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        avg.iter_mut().for_each(|v| *v /= n);

        Ok(ClassDistribution::new(avg))
    }

    /// Predict class labels for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        features
            .into_par_iter()
            .map(|sample| self.predict(sample))
            .collect()
    }

    /// Return probability distributions for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn predict_proba_batch(
        &self,
        features: &[Vec<f64>],
    ) -> Result<Vec<ClassDistribution>, RfError> {
        features
            .into_par_iter()
            .map(|sample| self.predict_proba(sample))
            .collect()
    }

    /// Return the probability of `class` for every sample, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn class_scores(&self, features: &[Vec<f64>], class: usize) -> Result<Vec<f64>, RfError> {
        features
            .into_par_iter()
            .map(|sample| Ok(self.predict_proba(sample)?.probability(class)))
            .collect()
    }

    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of classes seen during training.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the fitted trees.
    #[must_use]
    pub fn trees(&self) -> &[crate::DecisionTree] {
        &self.trees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RandomForestConfig;

    #[test]
    fn ties_predict_lowest_class() {
        assert_eq!(ClassDistribution::new(vec![0.5, 0.5]).predicted_class(), 0);
        assert_eq!(ClassDistribution::new(vec![0.2, 0.4, 0.4]).predicted_class(), 1);
    }

    #[test]
    fn unseen_class_has_zero_probability() {
        let dist = ClassDistribution::new(vec![1.0]);
        assert_eq!(dist.probability(0), 1.0);
        assert_eq!(dist.probability(1), 0.0);
    }

    #[test]
    fn proba_batch_matches_individual() {
        let features: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i * 7 % 11) as f64]).collect();
        let labels: Vec<usize> = (0..40).map(|i| usize::from(i >= 20)).collect();
        let forest = RandomForestConfig::new(8).unwrap().fit(&features, &labels).unwrap();

        let batch = forest.predict_proba_batch(&features).unwrap();
        let scores = forest.class_scores(&features, 1).unwrap();
        for (i, sample) in features.iter().enumerate() {
            let single = forest.predict_proba(sample).unwrap();
            assert_eq!(batch[i].as_slice(), single.as_slice());
            assert_eq!(scores[i], single.probability(1));
            let total: f64 = single.as_slice().iter().sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn wrong_feature_count_is_rejected() {
        let forest = RandomForestConfig::new(2)
            .unwrap()
            .fit(&[vec![0.0, 1.0], vec![1.0, 0.0]], &[0, 1])
            .unwrap();
        assert!(matches!(
            forest.predict(&[1.0]),
            Err(RfError::PredictionFeatureMismatch {
                expected: 2,
                got: 1
            })
        ));
    }
}
