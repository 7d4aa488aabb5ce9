//! Artifact writer: JSON evaluation report and ROC chart.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;
use crate::plot::render_roc;

/// Writes run artifacts into one output directory.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_report.json` and
/// `{experiment}_roc.svg`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Return the experiment name.
    #[must_use]
    pub fn experiment(&self) -> &ExperimentName {
        &self.experiment
    }

    /// Path of the JSON report: `{output_dir}/{experiment}_report.json`.
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_report.json", self.experiment.as_str()))
    }

    /// Path of the ROC chart: `{output_dir}/{experiment}_roc.svg`.
    #[must_use]
    pub fn roc_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_roc.svg", self.experiment.as_str()))
    }

    /// Serialize `report` as pretty JSON to [`ResultWriter::report_path`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | `report` fails to serialize |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all)]
    pub fn write_report<T: Serialize>(&self, report: &T) -> Result<PathBuf, IoError> {
        let path = self.report_path();
        let json = serde_json::to_string_pretty(report).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "report written");
        Ok(path)
    }

    /// Render the ROC curve `(fpr, tpr)` points to [`ResultWriter::roc_path`],
    /// with the AUC in the legend.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Plot`] if the chart cannot be rendered or saved.
    #[instrument(skip_all, fields(n_points = points.len(), auc = auc))]
    pub fn write_roc_plot(&self, points: &[(f64, f64)], auc: f64) -> Result<PathBuf, IoError> {
        let path = self.roc_path();
        render_roc(&path, points, auc)?;
        info!(path = %path.display(), "ROC chart written");
        Ok(path)
    }
}
