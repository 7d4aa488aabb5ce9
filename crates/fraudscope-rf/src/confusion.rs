//! Confusion matrix, per-class metrics and the classification report.

use std::fmt;

use crate::error::RfError;

/// A confusion matrix for multi-class classification.
///
/// Entry `matrix[true_class][predicted_class]` counts how many samples
/// with true label `true_class` were predicted as `predicted_class`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
    n_classes: usize,
}

/// Per-class precision, recall, and F1 score.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClassMetrics {
    /// The class index.
    pub class: usize,
    /// Precision: TP / (TP + FP). 0.0 if no predictions for this class.
    pub precision: f64,
    /// Recall: TP / (TP + FN). 0.0 if no true samples for this class.
    pub recall: f64,
    /// F1: 2 * precision * recall / (precision + recall). 0.0 if both are zero.
    pub f1: f64,
    /// Number of true samples in this class.
    pub support: usize,
}

/// Precision, recall and F1 averaged over classes.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct AveragedMetrics {
    /// Averaged precision.
    pub precision: f64,
    /// Averaged recall.
    pub recall: f64,
    /// Averaged F1.
    pub f1: f64,
    /// Total number of samples.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from true and predicted labels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | Zero labels provided |
    /// | [`RfError::LabelCountMismatch`] | The two label slices differ in length |
    pub fn from_labels(
        true_labels: &[usize],
        predicted: &[usize],
        n_classes: usize,
    ) -> Result<Self, RfError> {
        if true_labels.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        if true_labels.len() != predicted.len() {
            return Err(RfError::LabelCountMismatch {
                n_features_rows: predicted.len(),
                n_labels: true_labels.len(),
            });
        }
        let n_classes = true_labels
            .iter()
            .chain(predicted)
            .map(|&c| c + 1)
            .max()
            .unwrap_or(0)
            .max(n_classes);
        let mut matrix = vec![vec![0usize; n_classes]; n_classes];
        for (&t, &p) in true_labels.iter().zip(predicted) {
            matrix[t][p] += 1;
        }
        Ok(Self { matrix, n_classes })
    }

    /// Overall accuracy: proportion of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.n_classes).map(|i| self.matrix[i][i]).sum();
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Total number of samples counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Per-class precision, recall, F1, and support.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        (0..self.n_classes)
            .map(|c| {
                let tp = self.matrix[c][c];
                let predicted: usize = (0..self.n_classes).map(|i| self.matrix[i][c]).sum();
                let support: usize = self.matrix[c].iter().sum();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class: c,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Unweighted mean of the per-class metrics.
    #[must_use]
    pub fn macro_average(&self) -> AveragedMetrics {
        let metrics = self.class_metrics();
        let n = metrics.len() as f64;
        AveragedMetrics {
            precision: metrics.iter().map(|m| m.precision).sum::<f64>() / n,
            recall: metrics.iter().map(|m| m.recall).sum::<f64>() / n,
            f1: metrics.iter().map(|m| m.f1).sum::<f64>() / n,
            support: self.total(),
        }
    }

    /// Support-weighted mean of the per-class metrics.
    #[must_use]
    pub fn weighted_average(&self) -> AveragedMetrics {
        let metrics = self.class_metrics();
        let total = self.total().max(1) as f64;
        let weighted = |value: fn(&ClassMetrics) -> f64| {
            metrics
                .iter()
                .map(|m| value(m) * m.support as f64)
                .sum::<f64>()
                / total
        };
        AveragedMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
            support: self.total(),
        }
    }

    /// Text report in the familiar per-class precision/recall/F1 layout.
    #[must_use]
    pub fn report(&self) -> ClassificationReport<'_> {
        ClassificationReport { matrix: self }
    }

    /// Return the underlying matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8}", "")?;
        for j in 0..self.n_classes {
            write!(f, " pred_{j:>3}")?;
        }
        writeln!(f)?;

        for (i, row) in self.matrix.iter().enumerate() {
            write!(f, "true_{i:>3}")?;
            for val in row {
                write!(f, " {val:>8}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Display adapter rendering a [`ConfusionMatrix`] as a classification report.
///
/// ```text
///               precision    recall  f1-score   support
///
///            0       0.99      1.00      0.99       285
///            1       0.92      0.80      0.86        15
///
///     accuracy                           0.99       300
///    macro avg       0.95      0.90      0.92       300
/// weighted avg       0.99      0.99      0.99       300
/// ```
pub struct ClassificationReport<'a> {
    matrix: &'a ConfusionMatrix,
}

impl fmt::Display for ClassificationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.matrix.total();
        writeln!(
            f,
            "{:>12} {:>10} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for m in self.matrix.class_metrics() {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>9.2} {:>9.2} {:>9}",
                m.class, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>10} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.matrix.accuracy(),
            total
        )?;
        for (name, avg) in [
            ("macro avg", self.matrix.macro_average()),
            ("weighted avg", self.matrix.weighted_average()),
        ] {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, avg.support
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let labels = vec![0, 0, 1, 1];
        let cm = ConfusionMatrix::from_labels(&labels, &labels, 2).unwrap();
        assert!((cm.accuracy() - 1.0).abs() < f64::EPSILON);
        for m in cm.class_metrics() {
            assert!((m.precision - 1.0).abs() < f64::EPSILON);
            assert!((m.recall - 1.0).abs() < f64::EPSILON);
            assert!((m.f1 - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn binary_metrics_and_averages() {
        // 8 negatives (7 right, 1 flagged), 2 positives (1 caught, 1 missed).
        let truth = vec![0, 0, 0, 0, 0, 0, 0, 0, 1, 1];
        let pred = vec![0, 0, 0, 0, 0, 0, 0, 1, 1, 0];
        let cm = ConfusionMatrix::from_labels(&truth, &pred, 2).unwrap();
        assert_eq!(cm.as_rows()[0], vec![7, 1]);
        assert_eq!(cm.as_rows()[1], vec![1, 1]);
        assert!((cm.accuracy() - 0.8).abs() < 1e-12);

        let m = cm.class_metrics();
        assert!((m[0].precision - 7.0 / 8.0).abs() < 1e-12);
        assert!((m[0].recall - 7.0 / 8.0).abs() < 1e-12);
        assert!((m[1].precision - 0.5).abs() < 1e-12);
        assert!((m[1].recall - 0.5).abs() < 1e-12);
        assert_eq!(m[1].support, 2);

        let macro_avg = cm.macro_average();
        assert!((macro_avg.precision - (0.875 + 0.5) / 2.0).abs() < 1e-12);
        assert_eq!(macro_avg.support, 10);

        let weighted = cm.weighted_average();
        assert!((weighted.recall - (0.875 * 8.0 + 0.5 * 2.0) / 10.0).abs() < 1e-12);
    }

    #[test]
    fn unseen_predicted_class_widens_matrix() {
        let cm = ConfusionMatrix::from_labels(&[0, 0], &[0, 1], 1).unwrap();
        assert_eq!(cm.n_classes(), 2);
        assert_eq!(cm.class_metrics()[1].support, 0);
        assert_eq!(cm.class_metrics()[1].precision, 0.0);
    }

    #[test]
    fn empty_labels_error() {
        let err = ConfusionMatrix::from_labels(&[], &[], 2).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn mismatched_lengths_error() {
        let err = ConfusionMatrix::from_labels(&[0, 1], &[0], 2).unwrap_err();
        assert!(matches!(err, RfError::LabelCountMismatch { .. }));
    }

    #[test]
    fn report_layout() {
        let cm = ConfusionMatrix::from_labels(&[0, 0, 1, 1], &[0, 1, 1, 1], 2).unwrap();
        let text = cm.report().to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("f1-score"));
        assert!(text.contains("accuracy"));
        assert!(text.contains("macro avg"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("0.75"));
    }
}
