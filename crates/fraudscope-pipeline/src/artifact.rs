//! JSON and SVG output of a finished run.

use std::path::PathBuf;

use fraudscope_io::ResultWriter;
use fraudscope_prep::{ImputationReport, OutlierReport, VifEntry};
use fraudscope_rf::{AveragedMetrics, CandidateScore, ClassMetrics, CvScore, ForestParams, RocPoint};
use serde::Serialize;

use crate::error::PipelineError;
use crate::evaluate::EvaluationReport;
use crate::pipeline::PipelineReport;

#[derive(Serialize)]
struct ReportArtifact<'a> {
    experiment: &'a str,
    data: DataArtifact<'a>,
    split: SplitArtifact,
    baseline: ModelArtifact,
    tuning: TuningArtifact<'a>,
    tuned: ModelArtifact,
}

#[derive(Serialize)]
struct DataArtifact<'a> {
    rows_loaded: usize,
    rows_after_cleaning: usize,
    missing_before: &'a [(String, usize)],
    imputation: &'a ImputationReport,
    outliers: &'a OutlierReport,
    features: &'a [String],
    class_counts: [usize; 2],
    vif: &'a [VifEntry],
}

#[derive(Serialize)]
struct SplitArtifact {
    n_train: usize,
    n_test: usize,
}

#[derive(Serialize)]
struct ModelArtifact {
    params: ForestParams,
    accuracy: f64,
    auc: f64,
    confusion_matrix: Vec<Vec<usize>>,
    class_metrics: Vec<ClassMetrics>,
    macro_avg: AveragedMetrics,
    weighted_avg: AveragedMetrics,
    roc: Vec<RocPoint>,
}

#[derive(Serialize)]
struct TuningArtifact<'a> {
    n_folds: usize,
    n_candidates: usize,
    best_params: ForestParams,
    best_score: &'a CvScore,
    candidates: &'a [CandidateScore],
}

impl ModelArtifact {
    fn new(params: ForestParams, eval: &EvaluationReport) -> Self {
        Self {
            params,
            accuracy: eval.accuracy(),
            auc: eval.auc(),
            confusion_matrix: eval.confusion().as_rows().to_vec(),
            class_metrics: eval.class_metrics(),
            macro_avg: eval.macro_average(),
            weighted_avg: eval.weighted_average(),
            roc: eval.roc().points().to_vec(),
        }
    }
}

impl PipelineReport {
    /// Write `{experiment}_report.json` and the tuned model's
    /// `{experiment}_roc.svg`, returning both paths.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Output`] wrapping the I/O error of the first
    /// artifact that fails to write.
    pub fn write_artifacts(
        &self,
        writer: &ResultWriter,
    ) -> Result<(PathBuf, PathBuf), PipelineError> {
        let cleaning = &self.inspect.cleaning;
        let artifact = ReportArtifact {
            experiment: writer.experiment().as_str(),
            data: DataArtifact {
                rows_loaded: cleaning.rows_loaded,
                rows_after_cleaning: cleaning.outliers.rows_after,
                missing_before: &cleaning.missing_before,
                imputation: &cleaning.imputation,
                outliers: &cleaning.outliers,
                features: &self.inspect.features,
                class_counts: self.inspect.class_counts,
                vif: self.inspect.vif.entries(),
            },
            split: SplitArtifact {
                n_train: self.n_train,
                n_test: self.n_test,
            },
            baseline: ModelArtifact::new(self.baseline_params, &self.baseline),
            tuning: TuningArtifact {
                n_folds: self.tuning.n_folds,
                n_candidates: self.tuning.candidates.len(),
                best_params: self.tuning.best_params,
                best_score: &self.tuning.best_score,
                candidates: &self.tuning.candidates,
            },
            tuned: ModelArtifact::new(self.tuning.best_params, &self.tuned),
        };
        let report_path = writer.write_report(&artifact)?;
        let roc_path = writer.write_roc_plot(&self.tuned.roc().coordinates(), self.tuned.auc())?;
        Ok((report_path, roc_path))
    }
}
