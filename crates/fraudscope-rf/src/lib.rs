//! Random forest classification: train, tune, evaluate.
//!
//! Provides a CART-based random forest with bootstrap sampling and parallel
//! tree construction via rayon, stratified k-fold cross-validation, an
//! exhaustive grid search over forest hyperparameters, confusion-matrix
//! metrics with a classification report, and ROC/AUC analysis.

mod config;
mod confusion;
mod cv;
mod error;
mod forest;
mod grid;
mod node;
mod predict;
mod roc;
mod split;
mod tree;

pub use config::{ForestParams, MaxFeatures, RandomForestConfig};
pub use confusion::{AveragedMetrics, ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use cv::{CrossValidation, CvScore};
pub use error::RfError;
pub use forest::RandomForest;
pub use grid::{CandidateScore, GridSearch, GridSearchResult, ParamGrid};
pub use node::{FeatureIndex, Node, NodeIndex};
pub use predict::ClassDistribution;
pub use roc::{RocCurve, RocPoint, auc};
pub use tree::DecisionTree;
