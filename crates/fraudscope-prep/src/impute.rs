//! Median imputation of missing cells.

use std::fmt;

use fraudscope_io::{Column, Table};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::PrepError;
use crate::stats::median;

/// Value written into a column's missing cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FillValue {
    /// Median of the present numeric values.
    Numeric(f64),
    /// Lower-middle present value in lexicographic order.
    Text(String),
}

impl fmt::Display for FillValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One imputed column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnFill {
    /// Column name.
    pub column: String,
    /// Value the missing cells received.
    pub value: FillValue,
    /// Number of cells filled.
    pub n_filled: usize,
}

/// Summary of [`impute_median`]: one entry per column that had missing cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImputationReport {
    fills: Vec<ColumnFill>,
}

impl ImputationReport {
    /// Filled columns in table order.
    #[must_use]
    pub fn fills(&self) -> &[ColumnFill] {
        &self.fills
    }

    /// Total cells filled across all columns.
    #[must_use]
    pub fn total_filled(&self) -> usize {
        self.fills.iter().map(|f| f.n_filled).sum()
    }

    /// Fill entry for `column`, if it had missing cells.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&ColumnFill> {
        self.fills.iter().find(|f| f.column == column)
    }
}

/// Replace every missing cell with its column's median.
///
/// Medians are taken over the present cells of each column before any
/// replacement. Text columns (identifiers included) are filled with the
/// lower-middle present value in lexicographic order. Columns without
/// missing cells are left untouched and do not appear in the report.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PrepError::AllMissing`] | A column has missing cells and no present value |
#[instrument(skip_all, fields(n_rows = table.n_rows(), n_columns = table.n_columns()))]
pub fn impute_median(table: &mut Table) -> Result<ImputationReport, PrepError> {
    let mut fills = Vec::new();

    for (name, column) in table.iter_mut() {
        let n_missing = column.missing_count();
        if n_missing == 0 {
            continue;
        }
        let value = match column {
            Column::Numeric(cells) => {
                let present: Vec<f64> = cells.iter().flatten().copied().collect();
                let fill = median(&present).ok_or_else(|| all_missing(name))?;
                for cell in cells.iter_mut().filter(|c| c.is_none()) {
                    *cell = Some(fill);
                }
                FillValue::Numeric(fill)
            }
            Column::Text(cells) => {
                let mut present: Vec<&String> = cells.iter().flatten().collect();
                present.sort_unstable();
                let fill = present
                    .get(present.len().saturating_sub(1) / 2)
                    .map(|s| (*s).clone())
                    .ok_or_else(|| all_missing(name))?;
                for cell in cells.iter_mut().filter(|c| c.is_none()) {
                    *cell = Some(fill.clone());
                }
                FillValue::Text(fill)
            }
        };
        debug!(column = name, n_missing, fill = %value, "imputed column");
        fills.push(ColumnFill {
            column: name.to_string(),
            value,
            n_filled: n_missing,
        });
    }

    let report = ImputationReport { fills };
    info!(
        n_columns_filled = report.fills.len(),
        n_cells_filled = report.total_filled(),
        "median imputation complete"
    );
    Ok(report)
}

fn all_missing(column: &str) -> PrepError {
    PrepError::AllMissing {
        column: column.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: Vec<(&str, Column)>) -> Table {
        Table::new(
            columns
                .into_iter()
                .map(|(n, c)| (n.to_string(), c))
                .collect(),
        )
        .unwrap()
    }

    fn text(cells: &[Option<&str>]) -> Column {
        Column::Text(cells.iter().map(|c| c.map(str::to_string)).collect())
    }

    #[test]
    fn numeric_cells_get_pre_imputation_median() {
        let mut t = table(vec![(
            "amount",
            Column::Numeric(vec![Some(4.0), None, Some(1.0), Some(3.0), None, Some(2.0)]),
        )]);
        let report = impute_median(&mut t).unwrap();

        let cells = t.column("amount").unwrap().as_numeric().unwrap();
        assert_eq!(cells[1], Some(2.5));
        assert_eq!(cells[4], Some(2.5));
        assert_eq!(t.total_missing(), 0);

        let fill = report.get("amount").unwrap();
        assert_eq!(fill.value, FillValue::Numeric(2.5));
        assert_eq!(fill.n_filled, 2);
    }

    #[test]
    fn text_cells_get_lower_middle_value() {
        let mut t = table(vec![(
            "nameDest",
            text(&[Some("M3"), None, Some("C1"), Some("M1"), Some("C2")]),
        )]);
        impute_median(&mut t).unwrap();
        // sorted: C1 C2 M1 M3 -> lower middle is C2
        let cells = t.column("nameDest").unwrap().as_text().unwrap();
        assert_eq!(cells[1].as_deref(), Some("C2"));
    }

    #[test]
    fn complete_columns_are_not_reported() {
        let mut t = table(vec![
            ("a", Column::Numeric(vec![Some(1.0), Some(2.0)])),
            ("b", Column::Numeric(vec![None, Some(5.0)])),
        ]);
        let report = impute_median(&mut t).unwrap();
        assert_eq!(report.fills().len(), 1);
        assert_eq!(report.fills()[0].column, "b");
        assert_eq!(report.total_filled(), 1);
    }

    #[test]
    fn no_missing_leaves_table_unchanged() {
        let mut t = table(vec![("a", Column::Numeric(vec![Some(1.0), Some(2.0)]))]);
        let before = t.clone();
        let report = impute_median(&mut t).unwrap();
        assert!(report.fills().is_empty());
        assert_eq!(t, before);
    }

    #[test]
    fn all_missing_column_error() {
        let mut t = table(vec![
            ("ok", Column::Numeric(vec![Some(1.0), Some(2.0)])),
            ("empty", Column::Numeric(vec![None, None])),
        ]);
        let err = impute_median(&mut t).unwrap_err();
        assert!(matches!(err, PrepError::AllMissing { column } if column == "empty"));
    }
}
