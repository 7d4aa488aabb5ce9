use std::path::PathBuf;

use fraudscope_io::IoError;
use fraudscope_prep::PrepError;
use fraudscope_rf::RfError;

/// Errors from a pipeline run, tagged with the stage that failed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Returned when the input file cannot be read or fails the schema check.
    #[error("failed to load {path}")]
    Load {
        /// Input file.
        path: PathBuf,
        /// Underlying I/O or schema error.
        source: IoError,
    },

    /// Returned when imputation, trimming or feature extraction fails.
    #[error("cleaning failed")]
    Clean {
        /// Underlying preparation error.
        #[from]
        source: PrepError,
    },

    /// Returned when the default forest cannot be trained.
    #[error("baseline training failed")]
    Train {
        /// Underlying forest error.
        source: RfError,
    },

    /// Returned when the grid search fails.
    #[error("hyperparameter search failed")]
    Tune {
        /// Underlying forest error.
        source: RfError,
    },

    /// Returned when scoring a model on the test rows fails.
    #[error("evaluation of the {model} model failed")]
    Evaluate {
        /// Which model was being evaluated.
        model: &'static str,
        /// Underlying forest error.
        source: RfError,
    },

    /// Returned when a report artifact cannot be written.
    #[error("failed to write run artifacts")]
    Output {
        /// Underlying I/O error.
        #[from]
        source: IoError,
    },
}
