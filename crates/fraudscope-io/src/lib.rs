//! File I/O, table model, and output artifacts for the fraudscope workflow.

mod domain;
mod error;
mod plot;
mod reader;
mod writer;

pub use domain::{Column, ExperimentName, Schema, Table};
pub use error::IoError;
pub use reader::{MISSING_TOKENS, TableReader};
pub use writer::ResultWriter;
