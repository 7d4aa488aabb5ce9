//! Interquartile-range trimming of one numeric column.

use fraudscope_io::{Column, Table};
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::PrepError;
use crate::stats::quantile;

/// Drops rows whose value in one column lies outside the Tukey fences
/// `[Q1 - factor * IQR, Q3 + factor * IQR]`.
///
/// Quartiles use linear interpolation between ranks. Both fences are
/// inclusive. Rows with a missing value in the column are dropped.
///
/// # Defaults
///
/// | Parameter | Default |
/// |-----------|---------|
/// | `factor`  | 1.5     |
#[derive(Debug, Clone, PartialEq)]
pub struct IqrFilter {
    column: String,
    factor: f64,
}

/// What an [`IqrFilter`] did to a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    /// Column the bounds were computed on.
    pub column: String,
    /// First quartile.
    pub q1: f64,
    /// Third quartile.
    pub q3: f64,
    /// Inclusive lower fence.
    pub lower: f64,
    /// Inclusive upper fence.
    pub upper: f64,
    /// Row count before trimming.
    pub rows_before: usize,
    /// Row count after trimming.
    pub rows_after: usize,
}

impl OutlierReport {
    /// Interquartile range `q3 - q1`.
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Number of rows removed.
    #[must_use]
    pub fn rows_removed(&self) -> usize {
        self.rows_before - self.rows_after
    }
}

impl IqrFilter {
    /// Filter on `column` with the default factor of 1.5.
    #[must_use]
    pub fn new(column: &str) -> Self {
        Self {
            column: column.to_string(),
            factor: 1.5,
        }
    }

    /// Set the fence multiplier.
    #[must_use]
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    /// Return the column name.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Return the fence multiplier.
    #[must_use]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Trim `table` in place and report the fences used.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PrepError::InvalidIqrFactor`] | `factor` is negative or not finite |
    /// | [`PrepError::ColumnNotFound`] | The column is absent |
    /// | [`PrepError::NotNumeric`] | The column holds text |
    /// | [`PrepError::EmptyTable`] | The column has no present values |
    /// | [`PrepError::EmptyAfterTrimming`] | No row lies within the fences |
    #[instrument(skip_all, fields(column = %self.column, factor = self.factor))]
    pub fn apply(&self, table: &mut Table) -> Result<OutlierReport, PrepError> {
        if !self.factor.is_finite() || self.factor < 0.0 {
            return Err(PrepError::InvalidIqrFactor {
                factor: self.factor,
            });
        }
        let column = table
            .column(&self.column)
            .ok_or_else(|| PrepError::ColumnNotFound {
                column: self.column.clone(),
            })?;
        let Column::Numeric(cells) = column else {
            return Err(PrepError::NotNumeric {
                column: self.column.clone(),
            });
        };

        let present: Vec<f64> = cells.iter().flatten().copied().collect();
        let (Some(q1), Some(q3)) = (quantile(&present, 0.25), quantile(&present, 0.75)) else {
            return Err(PrepError::EmptyTable);
        };
        let iqr = q3 - q1;
        let lower = q1 - self.factor * iqr;
        let upper = q3 + self.factor * iqr;

        let keep: Vec<bool> = cells
            .iter()
            .map(|c| c.is_some_and(|v| v >= lower && v <= upper))
            .collect();
        if !keep.contains(&true) {
            return Err(PrepError::EmptyAfterTrimming {
                column: self.column.clone(),
                lower,
                upper,
            });
        }

        let rows_before = table.n_rows();
        let rows_after = table.retain_rows(&keep);
        info!(q1, q3, lower, upper, rows_before, rows_after, "IQR trimming complete");

        Ok(OutlierReport {
            column: self.column.clone(),
            q1,
            q3,
            lower,
            upper,
            rows_before,
            rows_after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount_table(values: &[f64]) -> Table {
        let ids: Vec<Option<String>> = (0..values.len()).map(|i| Some(format!("C{i}"))).collect();
        Table::new(vec![
            (
                "amount".to_string(),
                Column::Numeric(values.iter().copied().map(Some).collect()),
            ),
            ("nameOrig".to_string(), Column::Text(ids)),
        ])
        .unwrap()
    }

    #[test]
    fn removes_extreme_rows_across_columns() {
        // Q1 = 2.0, Q3 = 4.0, IQR = 2.0, fences [-1.0, 7.0]
        let mut t = amount_table(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0, 2.0, 4.0, 3.0]);
        let report = IqrFilter::new("amount").apply(&mut t).unwrap();

        assert!((report.q1 - 2.0).abs() < 1e-12);
        assert!((report.q3 - 4.0).abs() < 1e-12);
        assert!((report.lower + 1.0).abs() < 1e-12);
        assert!((report.upper - 7.0).abs() < 1e-12);
        assert_eq!(report.rows_before, 9);
        assert_eq!(report.rows_after, 8);
        assert_eq!(report.rows_removed(), 1);

        assert_eq!(t.n_rows(), 8);
        let names = t.column("nameOrig").unwrap().as_text().unwrap();
        assert!(names.iter().all(|n| n.as_deref() != Some("C5")));
    }

    #[test]
    fn remaining_values_lie_within_fences() {
        let values: Vec<f64> = (0..200_u32).map(|i| f64::from(i % 37) * f64::from(i % 5)).collect();
        let mut t = amount_table(&values);
        let report = IqrFilter::new("amount").apply(&mut t).unwrap();
        for v in t.column("amount").unwrap().as_numeric().unwrap().iter().flatten() {
            assert!(*v >= report.lower && *v <= report.upper);
        }
    }

    #[test]
    fn fences_are_inclusive() {
        // Q1 = 1, Q3 = 3, fences at exactly -2 and 6 with factor 1.5
        let mut t = amount_table(&[-2.0, 1.0, 1.0, 2.0, 3.0, 3.0, 6.0]);
        let report = IqrFilter::new("amount").apply(&mut t).unwrap();
        assert!((report.lower + 2.0).abs() < 1e-12);
        assert!((report.upper - 6.0).abs() < 1e-12);
        assert_eq!(report.rows_after, 7);
    }

    #[test]
    fn zero_factor_keeps_interquartile_rows() {
        let mut t = amount_table(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let report = IqrFilter::new("amount").with_factor(0.0).apply(&mut t).unwrap();
        assert_eq!(report.rows_after, 3);
    }

    #[test]
    fn missing_column_error() {
        let mut t = amount_table(&[1.0]);
        let err = IqrFilter::new("value").apply(&mut t).unwrap_err();
        assert!(matches!(err, PrepError::ColumnNotFound { column } if column == "value"));
    }

    #[test]
    fn text_column_error() {
        let mut t = amount_table(&[1.0]);
        let err = IqrFilter::new("nameOrig").apply(&mut t).unwrap_err();
        assert!(matches!(err, PrepError::NotNumeric { .. }));
    }

    #[test]
    fn negative_factor_error() {
        let mut t = amount_table(&[1.0, 2.0]);
        let err = IqrFilter::new("amount").with_factor(-1.0).apply(&mut t).unwrap_err();
        assert!(matches!(err, PrepError::InvalidIqrFactor { .. }));
    }
}
