//! Delimited table reader with full input validation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{Column, Table};

/// Cell values read as missing.
pub const MISSING_TOKENS: [&str; 7] = ["NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Reads a delimited text file into a [`Table`].
///
/// Expected format:
/// - Header row required, names must be unique
/// - Every data row has as many cells as the header
/// - Empty cells and [`MISSING_TOKENS`] are missing values
///
/// A column is numeric when every present cell parses as a finite `f64`;
/// otherwise it is kept as text.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed record |
/// | [`IoError::EmptyHeader`] | No header row, or a header with zero cells |
/// | [`IoError::DuplicateColumn`] | Two header cells share a name |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
pub struct TableReader {
    path: PathBuf,
    delimiter: u8,
}

impl TableReader {
    /// Create a new comma-delimited reader for the given path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            delimiter: b',',
        }
    }

    /// Set the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }

    /// Read and validate the file, returning a [`Table`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Table, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets our own InconsistentRowLength check fire
        // instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?.clone();
        if header.is_empty() || header.iter().all(str::is_empty) {
            return Err(IoError::EmptyHeader {
                path: self.path.clone(),
            });
        }
        let mut seen = HashSet::new();
        for name in &header {
            if !seen.insert(name) {
                return Err(IoError::DuplicateColumn {
                    path: self.path.clone(),
                    name: name.to_string(),
                });
            }
        }
        let expected = header.len();
        debug!(expected, "read header");

        let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); expected];
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;
            if record.len() != expected {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected,
                    got: record.len(),
                });
            }
            for (cells, cell) in raw.iter_mut().zip(record.iter()) {
                cells.push(parse_cell(cell));
            }
        }

        let n_rows = raw.first().map_or(0, Vec::len);
        if n_rows == 0 {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let columns: Vec<(String, Column)> = header
            .iter()
            .zip(raw)
            .map(|(name, cells)| (name.to_string(), infer_column(cells)))
            .collect();
        let n_numeric = columns.iter().filter(|(_, c)| c.is_numeric()).count();

        let table = Table::new(columns)?;
        info!(
            n_rows,
            n_columns = table.n_columns(),
            n_numeric,
            n_missing = table.total_missing(),
            "table loaded"
        );
        Ok(table)
    }
}

fn parse_cell(cell: &str) -> Option<String> {
    if cell.is_empty() || MISSING_TOKENS.contains(&cell) {
        None
    } else {
        Some(cell.to_string())
    }
}

/// Numeric if every present cell is a finite float, text otherwise.
fn infer_column(cells: Vec<Option<String>>) -> Column {
    let parsed: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(s) => s.parse::<f64>().ok().filter(|v| v.is_finite()).map(Some),
        })
        .collect();
    match parsed {
        Some(values) => Column::Numeric(values),
        None => Column::Text(cells),
    }
}
