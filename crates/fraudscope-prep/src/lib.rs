//! Data preparation for the fraudscope workflow.
//!
//! Cleans a loaded [`fraudscope_io::Table`] in place (median imputation and
//! IQR trimming of one column), reports variance inflation factors for the
//! feature columns, extracts the numeric feature matrix and labels, and
//! partitions rows into a seeded train/test split.

mod design;
mod error;
mod impute;
mod outlier;
mod split;
mod stats;
mod vif;

pub use design::FeatureMatrix;
pub use error::PrepError;
pub use impute::{ColumnFill, FillValue, ImputationReport, impute_median};
pub use outlier::{IqrFilter, OutlierReport};
pub use split::{TrainTestSplit, train_test_split};
pub use stats::{median, quantile};
pub use vif::{VifEntry, VifTable};
