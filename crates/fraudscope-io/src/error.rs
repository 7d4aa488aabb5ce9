//! I/O error types for fraudscope-io.

use std::path::PathBuf;

/// Errors from file I/O, CSV parsing, schema checks, and artifact output.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the header row is missing or has no columns.
    #[error("missing or empty header row in {path}")]
    EmptyHeader {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when two header cells carry the same name.
    #[error("duplicate column \"{name}\" in {path}")]
    DuplicateColumn {
        /// Path to the CSV file, or `<memory>` for in-memory tables.
        path: PathBuf,
        /// The repeated column name.
        name: String,
    },

    /// Returned when an in-memory column's length disagrees with the table.
    #[error("column \"{column}\" has {got} rows, expected {expected}")]
    ColumnLengthMismatch {
        /// Column name.
        column: String,
        /// Row count of the table.
        expected: usize,
        /// Row count of this column.
        got: usize,
    },

    /// Returned when a column the schema requires is absent.
    #[error("required column \"{column}\" not found")]
    MissingColumn {
        /// Name of the absent column.
        column: String,
    },

    /// Returned when a column the schema treats as numeric holds text.
    #[error("column \"{column}\" must be numeric, found text value \"{example}\"")]
    ColumnNotNumeric {
        /// Name of the offending column.
        column: String,
        /// First non-numeric value seen.
        example: String,
    },

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a report cannot be serialized to JSON.
    #[error("cannot serialize report for {path}")]
    Serialize {
        /// Destination path.
        path: PathBuf,
        /// Underlying serde_json error.
        source: serde_json::Error,
    },

    /// Returned when the chart backend fails to render.
    #[error("cannot render chart {path}: {message}")]
    Plot {
        /// Destination path.
        path: PathBuf,
        /// Backend error description.
        message: String,
    },
}
