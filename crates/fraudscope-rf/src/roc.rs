//! Receiver operating characteristic curve and its area.

use crate::error::RfError;

/// One operating point of a ROC curve.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct RocPoint {
    /// False positive rate at this threshold.
    pub fpr: f64,
    /// True positive rate at this threshold.
    pub tpr: f64,
    /// Samples with `score >= threshold` are called positive.
    /// The leading `(0, 0)` point uses `+inf`, serialized as `null`.
    pub threshold: f64,
}

/// ROC curve over every distinct score, with its trapezoidal AUC.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RocCurve {
    points: Vec<RocPoint>,
    auc: f64,
}

impl RocCurve {
    /// Build the curve for `positive_class` from true labels and scores.
    ///
    /// Scores are swept from highest to lowest; tied scores move together,
    /// so each distinct score adds one point. The curve starts at `(0, 0)`
    /// and ends at `(1, 1)`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::ScoreCountMismatch`] | `scores` is empty or differs in length from `labels` |
    /// | [`RfError::NanScore`] | A score is NaN |
    /// | [`RfError::SingleClassRoc`] | `labels` has no positives or no negatives |
    pub fn from_scores(
        labels: &[usize],
        scores: &[f64],
        positive_class: usize,
    ) -> Result<Self, RfError> {
        if scores.is_empty() || scores.len() != labels.len() {
            return Err(RfError::ScoreCountMismatch {
                n_scores: scores.len(),
                n_labels: labels.len(),
            });
        }
        if let Some(index) = scores.iter().position(|s| s.is_nan()) {
            return Err(RfError::NanScore { index });
        }

        let n_positive = labels.iter().filter(|&&l| l == positive_class).count();
        let n_negative = labels.len() - n_positive;
        if n_positive == 0 || n_negative == 0 {
            return Err(RfError::SingleClassRoc {
                n_positive,
                n_negative,
            });
        }

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        let mut points = vec![RocPoint {
            fpr: 0.0,
            tpr: 0.0,
            threshold: f64::INFINITY,
        }];
        let (mut tp, mut fp) = (0usize, 0usize);
        for (rank, &i) in order.iter().enumerate() {
            if labels[i] == positive_class {
                tp += 1;
            } else {
                fp += 1;
            }
            let last_of_tie = order
                .get(rank + 1)
                .is_none_or(|&next| scores[next] != scores[i]);
            if last_of_tie {
                points.push(RocPoint {
                    fpr: fp as f64 / n_negative as f64,
                    tpr: tp as f64 / n_positive as f64,
                    threshold: scores[i],
                });
            }
        }

        let auc = auc(&points);
        Ok(Self { points, auc })
    }

    /// Return the curve points in threshold-descending order.
    #[must_use]
    pub fn points(&self) -> &[RocPoint] {
        &self.points
    }

    /// Return the area under the curve.
    #[must_use]
    pub fn auc(&self) -> f64 {
        self.auc
    }

    /// Return `(fpr, tpr)` pairs for plotting.
    #[must_use]
    pub fn coordinates(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.fpr, p.tpr)).collect()
    }
}

/// Trapezoidal area under a curve whose points are ordered by increasing FPR.
#[must_use]
pub fn auc(points: &[RocPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
        .sum()
}
