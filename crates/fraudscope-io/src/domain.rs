//! Domain types for fraudscope-io.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::IoError;

/// One named column of a [`Table`]. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Every present cell parsed as a finite float.
    Numeric(Vec<Option<f64>>),
    /// At least one present cell is not a number.
    Text(Vec<Option<String>>),
}

impl Column {
    /// Return the number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    /// Return `true` if the column has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the number of missing cells.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        match self {
            Column::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            Column::Text(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    /// Return `true` for numeric columns.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    /// Return the cells of a numeric column.
    #[must_use]
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            Column::Numeric(v) => Some(v),
            Column::Text(_) => None,
        }
    }

    /// Return the cells of a text column.
    #[must_use]
    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match self {
            Column::Text(v) => Some(v),
            Column::Numeric(_) => None,
        }
    }

    fn retain(&mut self, keep: &[bool]) {
        fn filter<T>(cells: &mut Vec<T>, keep: &[bool]) {
            let mut flags = keep.iter();
            cells.retain(|_| flags.next().copied().unwrap_or(false));
        }
        match self {
            Column::Numeric(v) => filter(v, keep),
            Column::Text(v) => filter(v, keep),
        }
    }
}

/// An in-memory table: named columns of equal length in header order.
///
/// Produced by [`TableReader`](crate::TableReader) and mutated in place by
/// the cleaning stages.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table from `(name, column)` pairs.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::DuplicateColumn`] | Two columns share a name |
    /// | [`IoError::ColumnLengthMismatch`] | Columns differ in length |
    pub fn new(columns: Vec<(String, Column)>) -> Result<Self, IoError> {
        let n_rows = columns.first().map_or(0, |(_, c)| c.len());
        let mut seen = HashSet::new();
        let mut names = Vec::with_capacity(columns.len());
        let mut cols = Vec::with_capacity(columns.len());
        for (name, column) in columns {
            if !seen.insert(name.clone()) {
                return Err(IoError::DuplicateColumn {
                    path: PathBuf::from("<memory>"),
                    name,
                });
            }
            if column.len() != n_rows {
                return Err(IoError::ColumnLengthMismatch {
                    column: name,
                    expected: n_rows,
                    got: column.len(),
                });
            }
            names.push(name);
            cols.push(column);
        }
        Ok(Self {
            names,
            columns: cols,
            n_rows,
        })
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Return the number of columns.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.names.len()
    }

    /// Return the column names in header order.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        let i = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[i])
    }

    /// Iterate `(name, column)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(&self.columns)
    }

    /// Iterate `(name, column)` pairs mutably in header order.
    ///
    /// The caller must keep every column's length unchanged.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Column)> {
        self.names.iter().map(String::as_str).zip(&mut self.columns)
    }

    /// Per-column count of missing cells, in header order.
    #[must_use]
    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.iter()
            .map(|(name, column)| (name.to_string(), column.missing_count()))
            .collect()
    }

    /// Total number of missing cells.
    #[must_use]
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }

    /// Keep only rows whose flag in `keep` is `true`, across every column.
    ///
    /// Rows past the end of `keep` are dropped. Returns the new row count.
    pub fn retain_rows(&mut self, keep: &[bool]) -> usize {
        for column in &mut self.columns {
            column.retain(keep);
        }
        self.n_rows = self.columns.first().map_or(0, Column::len);
        self.n_rows
    }
}

/// Column roles for a fraud transaction table.
///
/// Identifier columns are carried through cleaning but never used as
/// features; the label column is never a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    label: String,
    amount: String,
    identifiers: Vec<String>,
}

impl Schema {
    /// The transaction layout: label `isFraud`, amount `amount`,
    /// identifiers `nameOrig` and `nameDest`.
    #[must_use]
    pub fn fraud() -> Self {
        Self::new("isFraud", "amount", &["nameOrig", "nameDest"])
    }

    /// Create a schema with custom column names.
    #[must_use]
    pub fn new(label: &str, amount: &str, identifiers: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            amount: amount.to_string(),
            identifiers: identifiers.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Return the label column name.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Return the amount column name.
    #[must_use]
    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// Return the identifier column names.
    #[must_use]
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    /// Return `true` if `name` is an identifier column.
    #[must_use]
    pub fn is_identifier(&self, name: &str) -> bool {
        self.identifiers.iter().any(|id| id == name)
    }

    /// Names of the feature columns of `table`: everything except the label
    /// and identifiers, in header order.
    #[must_use]
    pub fn feature_columns(&self, table: &Table) -> Vec<String> {
        table
            .column_names()
            .iter()
            .filter(|n| **n != self.label && !self.is_identifier(n))
            .cloned()
            .collect()
    }

    /// Check that `table` has every required column and that every
    /// non-identifier column is numeric.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::MissingColumn`] | Label, amount or an identifier column is absent |
    /// | [`IoError::ColumnNotNumeric`] | A label, amount or feature column holds text |
    pub fn validate(&self, table: &Table) -> Result<(), IoError> {
        let required = [self.label.as_str(), self.amount.as_str()]
            .into_iter()
            .chain(self.identifiers.iter().map(String::as_str));
        for column in required {
            if table.column(column).is_none() {
                return Err(IoError::MissingColumn {
                    column: column.to_string(),
                });
            }
        }

        for (name, column) in table.iter() {
            if self.is_identifier(name) {
                continue;
            }
            if let Column::Text(cells) = column {
                let example = cells.iter().flatten().next().cloned().unwrap_or_default();
                return Err(IoError::ColumnNotNumeric {
                    column: name.to_string(),
                    example,
                });
            }
        }
        Ok(())
    }
}

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
