/// Errors from cleaning, feature extraction and partitioning.
#[derive(Debug, thiserror::Error)]
pub enum PrepError {
    /// Returned when a named column is absent from the table.
    #[error("column \"{column}\" not found")]
    ColumnNotFound {
        /// Name that was looked up.
        column: String,
    },

    /// Returned when a column has missing cells but no present value to
    /// derive a fill value from.
    #[error("column \"{column}\" has no present values to impute from")]
    AllMissing {
        /// Column name.
        column: String,
    },

    /// Returned when a numeric column was required but the column holds text.
    #[error("column \"{column}\" is not numeric")]
    NotNumeric {
        /// Column name.
        column: String,
    },

    /// Returned when a numeric value is required but the cell is missing.
    #[error("missing value in column \"{column}\" at row {row}")]
    MissingValue {
        /// Column name.
        column: String,
        /// Zero-based row index.
        row: usize,
    },

    /// Returned when the IQR factor is negative or not finite.
    #[error("IQR factor must be finite and non-negative, got {factor}")]
    InvalidIqrFactor {
        /// The invalid factor provided.
        factor: f64,
    },

    /// Returned when trimming leaves no rows.
    #[error("no rows of \"{column}\" fall within [{lower}, {upper}]")]
    EmptyAfterTrimming {
        /// Column the bounds were computed on.
        column: String,
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
    },

    /// Returned when the label holds a value other than 0 or 1.
    #[error("label \"{column}\" at row {row} is {value}, expected 0 or 1")]
    InvalidLabel {
        /// Label column name.
        column: String,
        /// Zero-based row index.
        row: usize,
        /// Offending value.
        value: f64,
    },

    /// Returned when every column is either the label or an identifier.
    #[error("table has no feature columns")]
    NoFeatures,

    /// Returned when the table has no rows.
    #[error("table has no rows")]
    EmptyTable,

    /// Returned when the test fraction lies outside the open interval (0, 1).
    #[error("test_fraction must be in (0, 1), got {test_fraction}")]
    InvalidTestFraction {
        /// The invalid fraction provided.
        test_fraction: f64,
    },

    /// Returned when a split would leave the train or test partition empty.
    #[error("splitting {n_rows} rows leaves {n_test} for test and {n_train} for training")]
    EmptyPartition {
        /// Total number of rows.
        n_rows: usize,
        /// Rows assigned to the test partition.
        n_test: usize,
        /// Rows assigned to the training partition.
        n_train: usize,
    },
}
