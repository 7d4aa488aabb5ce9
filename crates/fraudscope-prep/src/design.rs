//! Numeric feature matrix and binary labels extracted from a cleaned table.

use fraudscope_io::{Column, Schema, Table};
use tracing::{debug, instrument};

use crate::error::PrepError;

/// Row-major feature matrix with one 0/1 label per row.
///
/// Features are every column except the schema's label and identifiers,
/// in header order. The label column never appears among the features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    rows: Vec<Vec<f64>>,
    labels: Vec<usize>,
}

impl FeatureMatrix {
    /// Extract features and labels from a table with no missing cells.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PrepError::EmptyTable`] | The table has no rows |
    /// | [`PrepError::ColumnNotFound`] | The label column is absent |
    /// | [`PrepError::NoFeatures`] | No column is left after excluding label and identifiers |
    /// | [`PrepError::NotNumeric`] | The label or a feature column holds text |
    /// | [`PrepError::MissingValue`] | A label or feature cell is missing |
    /// | [`PrepError::InvalidLabel`] | A label is neither 0 nor 1 |
    #[instrument(skip_all, fields(label = schema.label(), n_rows = table.n_rows()))]
    pub fn from_table(table: &Table, schema: &Schema) -> Result<Self, PrepError> {
        let n_rows = table.n_rows();
        if n_rows == 0 {
            return Err(PrepError::EmptyTable);
        }

        let label_cells = numeric_cells(table, schema.label())?;
        let labels = label_cells
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                let value = cell.ok_or_else(|| PrepError::MissingValue {
                    column: schema.label().to_string(),
                    row,
                })?;
                if value == 0.0 {
                    Ok(0)
                } else if value == 1.0 {
                    Ok(1)
                } else {
                    Err(PrepError::InvalidLabel {
                        column: schema.label().to_string(),
                        row,
                        value,
                    })
                }
            })
            .collect::<Result<Vec<usize>, PrepError>>()?;

        let names = schema.feature_columns(table);
        if names.is_empty() {
            return Err(PrepError::NoFeatures);
        }

        let mut rows = vec![Vec::with_capacity(names.len()); n_rows];
        for name in &names {
            let cells = numeric_cells(table, name)?;
            for (row, (out, cell)) in rows.iter_mut().zip(cells).enumerate() {
                let value = cell.ok_or_else(|| PrepError::MissingValue {
                    column: name.clone(),
                    row,
                })?;
                out.push(value);
            }
        }

        debug!(n_features = names.len(), "feature matrix extracted");
        Ok(Self {
            names,
            rows,
            labels,
        })
    }

    /// Feature names in column order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.names
    }

    /// Row-major feature values.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Labels, one per row.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.names.len()
    }

    /// Values of feature `index` across all rows.
    ///
    /// # Panics
    ///
    /// Panics if `index >= n_features()`.
    #[must_use]
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[index]).collect()
    }

    /// Number of rows labelled 0 and 1.
    #[must_use]
    pub fn class_counts(&self) -> [usize; 2] {
        let positives = self.labels.iter().filter(|&&l| l == 1).count();
        [self.labels.len() - positives, positives]
    }

    /// New matrix holding the rows at `indices`, in that order.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }
}

fn numeric_cells<'a>(table: &'a Table, name: &str) -> Result<&'a [Option<f64>], PrepError> {
    match table.column(name) {
        None => Err(PrepError::ColumnNotFound {
            column: name.to_string(),
        }),
        Some(Column::Text(_)) => Err(PrepError::NotNumeric {
            column: name.to_string(),
        }),
        Some(Column::Numeric(cells)) => Ok(cells),
    }
}
