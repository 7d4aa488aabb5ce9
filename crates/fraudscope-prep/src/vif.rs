//! Variance inflation factors for the feature columns.

use std::fmt;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::design::FeatureMatrix;

/// Squared residual norm, relative to a unit-norm column, treated as zero.
const COLLINEAR_TOL: f64 = 1e-12;

/// VIF of one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VifEntry {
    /// Feature name.
    pub feature: String,
    /// `1 / (1 - R²)`; `+inf` for an exact linear dependence.
    pub vif: f64,
}

/// Advisory collinearity table, one entry per feature in column order.
///
/// Each feature is regressed on all other features by least squares
/// without an intercept, and `R²` is uncentered (`1 - SSR / Σy²`). An
/// all-zero feature or one that the others reproduce exactly scores
/// `+inf`. A lone feature scores 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VifTable {
    entries: Vec<VifEntry>,
}

impl VifTable {
    /// Compute the VIF of every feature in `matrix`.
    #[instrument(skip_all, fields(n_rows = matrix.n_rows(), n_features = matrix.n_features()))]
    pub fn compute(matrix: &FeatureMatrix) -> Self {
        let columns: Vec<Option<Vec<f64>>> = (0..matrix.n_features())
            .map(|j| unit_norm(matrix.column(j)))
            .collect();

        let entries = matrix
            .feature_names()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let vif = match &columns[i] {
                    None => f64::INFINITY,
                    Some(target) => {
                        let regressors = columns
                            .iter()
                            .enumerate()
                            .filter(|(j, _)| *j != i)
                            .filter_map(|(_, c)| c.as_deref());
                        let ssr = residual_sum_of_squares(target, regressors);
                        if ssr < COLLINEAR_TOL {
                            f64::INFINITY
                        } else {
                            1.0 / ssr
                        }
                    }
                };
                debug!(feature = %name, vif, "variance inflation factor");
                VifEntry {
                    feature: name.clone(),
                    vif,
                }
            })
            .collect();

        Self { entries }
    }

    /// Entries in feature order.
    #[must_use]
    pub fn entries(&self) -> &[VifEntry] {
        &self.entries
    }

    /// VIF of `feature`, if present.
    #[must_use]
    pub fn get(&self, feature: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.feature == feature)
            .map(|e| e.vif)
    }

    /// Entries whose VIF exceeds `threshold`.
    pub fn above(&self, threshold: f64) -> impl Iterator<Item = &VifEntry> {
        self.entries.iter().filter(move |e| e.vif > threshold)
    }
}

impl fmt::Display for VifTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .entries
            .iter()
            .map(|e| e.feature.len())
            .max()
            .unwrap_or(0)
            .max("feature".len());
        writeln!(f, "{:<width$}  {:>12}", "feature", "VIF")?;
        for e in &self.entries {
            writeln!(f, "{:<width$}  {:>12.4}", e.feature, e.vif)?;
        }
        Ok(())
    }
}

/// Scale to unit L2 norm; `None` for an all-zero column.
///
/// Fitted values of a no-intercept regression, and so the uncentered R²,
/// do not change when a column is rescaled.
fn unit_norm(mut column: Vec<f64>) -> Option<Vec<f64>> {
    let norm = column.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return None;
    }
    for v in &mut column {
        *v /= norm;
    }
    Some(column)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `‖y - ŷ‖²` for the least-squares projection of unit-norm `target` onto
/// the span of `regressors`.
///
/// Regressors are orthonormalized with modified Gram-Schmidt. A regressor
/// already in the span of the earlier ones is skipped, so dependent
/// regressors yield the same fit as a pseudo-inverse solve.
fn residual_sum_of_squares<'a>(
    target: &[f64],
    regressors: impl Iterator<Item = &'a [f64]>,
) -> f64 {
    let mut basis: Vec<Vec<f64>> = Vec::new();
    for regressor in regressors {
        let mut q = regressor.to_vec();
        for b in &basis {
            let proj = dot(&q, b);
            for (qv, bv) in q.iter_mut().zip(b) {
                *qv -= proj * bv;
            }
        }
        let norm_sq = dot(&q, &q);
        if norm_sq < COLLINEAR_TOL {
            continue;
        }
        let norm = norm_sq.sqrt();
        for v in &mut q {
            *v /= norm;
        }
        basis.push(q);
    }

    let mut residual = target.to_vec();
    for b in &basis {
        let proj = dot(&residual, b);
        for (rv, bv) in residual.iter_mut().zip(b) {
            *rv -= proj * bv;
        }
    }
    dot(&residual, &residual)
}
