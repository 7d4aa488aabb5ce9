//! End-to-end fraud classification workflow.
//!
//! [`Pipeline`] runs the stages in order on one delimited file:
//! load and schema check, median imputation, IQR trimming of the amount
//! column, VIF report, seeded train/test split, a default random forest,
//! a cross-validated grid search, and evaluation of both models on the
//! held-out rows. The resulting [`PipelineReport`] renders as text and
//! writes a JSON report and ROC chart through
//! [`fraudscope_io::ResultWriter`].

mod artifact;
mod config;
mod error;
mod evaluate;
mod pipeline;
mod summary;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use evaluate::EvaluationReport;
pub use pipeline::{CleaningReport, InspectReport, Pipeline, PipelineReport, TuningSummary};
