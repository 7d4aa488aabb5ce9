//! Held-out evaluation of a fitted forest.

use fraudscope_prep::FeatureMatrix;
use fraudscope_rf::{
    AveragedMetrics, ClassMetrics, ClassificationReport, ConfusionMatrix, RandomForest, RfError,
    RocCurve,
};
use tracing::{info, instrument};

/// Label of the fraud class.
pub(crate) const POSITIVE_CLASS: usize = 1;

/// Test-set scores of one model.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    confusion: ConfusionMatrix,
    roc: RocCurve,
}

impl EvaluationReport {
    /// Score `forest` on `test`: hard predictions feed the confusion matrix,
    /// positive-class probabilities feed the ROC curve.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | `test` has no rows |
    /// | [`RfError::PredictionFeatureMismatch`] | `test` has a different feature count than the forest |
    /// | [`RfError::SingleClassRoc`] | `test` labels contain only one class |
    #[instrument(skip_all, fields(n_test = test.n_rows()))]
    pub fn evaluate(forest: &RandomForest, test: &FeatureMatrix) -> Result<Self, RfError> {
        let predictions = forest.predict_batch(test.rows())?;
        let scores = forest.class_scores(test.rows(), POSITIVE_CLASS)?;
        let confusion = ConfusionMatrix::from_labels(test.labels(), &predictions, 2)?;
        let roc = RocCurve::from_scores(test.labels(), &scores, POSITIVE_CLASS)?;
        info!(
            accuracy = confusion.accuracy(),
            auc = roc.auc(),
            "model evaluated"
        );
        Ok(Self { confusion, roc })
    }

    /// Share of test rows predicted correctly.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.confusion.accuracy()
    }

    /// Area under the ROC curve.
    #[must_use]
    pub fn auc(&self) -> f64 {
        self.roc.auc()
    }

    #[must_use]
    pub fn confusion(&self) -> &ConfusionMatrix {
        &self.confusion
    }

    #[must_use]
    pub fn roc(&self) -> &RocCurve {
        &self.roc
    }

    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        self.confusion.class_metrics()
    }

    #[must_use]
    pub fn macro_average(&self) -> AveragedMetrics {
        self.confusion.macro_average()
    }

    #[must_use]
    pub fn weighted_average(&self) -> AveragedMetrics {
        self.confusion.weighted_average()
    }

    /// Text classification report.
    #[must_use]
    pub fn classification_report(&self) -> ClassificationReport<'_> {
        self.confusion.report()
    }
}
