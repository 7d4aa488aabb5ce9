//! Stage orchestration.

use std::path::Path;

use fraudscope_io::{Table, TableReader};
use fraudscope_prep::{
    FeatureMatrix, ImputationReport, IqrFilter, OutlierReport, VifTable, impute_median,
    train_test_split,
};
use fraudscope_rf::{CandidateScore, CvScore, ForestParams, GridSearch};
use tracing::{info, instrument, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::evaluate::EvaluationReport;

/// VIF above which a feature is logged as strongly collinear.
const VIF_WARN_THRESHOLD: f64 = 10.0;

/// Outcome of imputation and trimming.
#[derive(Debug, Clone)]
pub struct CleaningReport {
    /// Rows read from the input file.
    pub rows_loaded: usize,
    /// Missing cells per column before imputation, in header order.
    pub missing_before: Vec<(String, usize)>,
    /// Fill values per imputed column.
    pub imputation: ImputationReport,
    /// Amount fences and rows removed.
    pub outliers: OutlierReport,
}

/// Everything known about the data before any model is fit.
#[derive(Debug, Clone)]
pub struct InspectReport {
    /// Imputation and trimming outcome.
    pub cleaning: CleaningReport,
    /// Collinearity of the feature columns.
    pub vif: VifTable,
    /// Feature names in column order.
    pub features: Vec<String>,
    /// Rows labelled 0 and 1 after cleaning.
    pub class_counts: [usize; 2],
}

/// Grid search outcome.
#[derive(Debug, Clone)]
pub struct TuningSummary {
    /// Winning combination.
    pub best_params: ForestParams,
    /// Its cross-validation score.
    pub best_score: CvScore,
    /// Fold count used.
    pub n_folds: usize,
    /// Every combination's score in enumeration order.
    pub candidates: Vec<CandidateScore>,
}

/// Full result of [`Pipeline::run`].
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Data and cleaning summary.
    pub inspect: InspectReport,
    /// Training partition size.
    pub n_train: usize,
    /// Test partition size.
    pub n_test: usize,
    /// Hyperparameters of the default forest.
    pub baseline_params: ForestParams,
    /// Test scores of the default forest.
    pub baseline: EvaluationReport,
    /// Grid search outcome.
    pub tuning: TuningSummary,
    /// Test scores of the refit best forest.
    pub tuned: EvaluationReport,
}

/// Runs the workflow stages in order on one input file.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load, clean and report VIF without fitting any model.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PipelineError::Load`] | The file is unreadable or fails the schema check |
    /// | [`PipelineError::Clean`] | Imputation, trimming or feature extraction fails |
    pub fn inspect(&self, path: &Path) -> Result<InspectReport, PipelineError> {
        self.prepare(path).map(|(report, _)| report)
    }

    /// Run every stage and evaluate both the default and the tuned forest
    /// on the held-out rows.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PipelineError::Load`] | The file is unreadable or fails the schema check |
    /// | [`PipelineError::Clean`] | Cleaning fails or the split leaves a partition empty |
    /// | [`PipelineError::Train`] | The default forest cannot be fit |
    /// | [`PipelineError::Tune`] | The grid search fails, e.g. too few fraud rows per fold |
    /// | [`PipelineError::Evaluate`] | Scoring fails, e.g. the test rows hold one class only |
    #[instrument(skip_all, fields(path = %path.display(), seed = self.config.seed()))]
    pub fn run(&self, path: &Path) -> Result<PipelineReport, PipelineError> {
        let (inspect, features) = self.prepare(path)?;

        let split = train_test_split(
            features.n_rows(),
            self.config.test_fraction(),
            self.config.seed(),
        )?;
        let train = features.subset(split.train());

        let baseline_config = self.config.forest_config();
        let baseline_forest = baseline_config
            .fit(train.rows(), train.labels())
            .map_err(|source| PipelineError::Train { source })?;
        info!(n_trees = baseline_forest.n_trees(), "baseline forest trained");

        let search = GridSearch::new(self.config.grid().clone())
            .with_cv(
                self.config
                    .cross_validation()
                    .map_err(|source| PipelineError::Tune { source })?,
            )
            .with_base_config(self.config.forest_config());
        let result = search
            .fit(train.rows(), train.labels())
            .map_err(|source| PipelineError::Tune { source })?;
        let tuning = TuningSummary {
            best_params: result.best_params(),
            best_score: result.best_score().clone(),
            n_folds: self.config.cv_folds(),
            candidates: result.candidates().to_vec(),
        };
        let tuned_forest = result.into_best_forest();

        let test = features.subset(split.test());
        let baseline = EvaluationReport::evaluate(&baseline_forest, &test)
            .map_err(|source| PipelineError::Evaluate {
                model: "baseline",
                source,
            })?;
        let tuned = EvaluationReport::evaluate(&tuned_forest, &test).map_err(|source| {
            PipelineError::Evaluate {
                model: "tuned",
                source,
            }
        })?;

        info!(
            baseline_accuracy = baseline.accuracy(),
            tuned_accuracy = tuned.accuracy(),
            tuned_auc = tuned.auc(),
            best_params = %tuning.best_params,
            "pipeline complete"
        );

        Ok(PipelineReport {
            inspect,
            n_train: split.n_train(),
            n_test: split.n_test(),
            baseline_params: baseline_config.params(),
            baseline,
            tuning,
            tuned,
        })
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    fn prepare(&self, path: &Path) -> Result<(InspectReport, FeatureMatrix), PipelineError> {
        let mut table = self.load(path)?;
        let cleaning = self.clean(&mut table)?;

        let features = FeatureMatrix::from_table(&table, self.config.schema())?;
        let vif = VifTable::compute(&features);
        for entry in vif.above(VIF_WARN_THRESHOLD) {
            warn!(feature = %entry.feature, vif = entry.vif, "strong collinearity");
        }

        let report = InspectReport {
            cleaning,
            features: features.feature_names().to_vec(),
            class_counts: features.class_counts(),
            vif,
        };
        Ok((report, features))
    }

    fn load(&self, path: &Path) -> Result<Table, PipelineError> {
        let load_error = |source| PipelineError::Load {
            path: path.to_path_buf(),
            source,
        };
        let table = TableReader::new(path)
            .with_delimiter(self.config.delimiter())
            .read()
            .map_err(load_error)?;
        self.config.schema().validate(&table).map_err(load_error)?;
        Ok(table)
    }

    fn clean(&self, table: &mut Table) -> Result<CleaningReport, PipelineError> {
        let rows_loaded = table.n_rows();
        let missing_before = table.missing_counts();
        let imputation = impute_median(table)?;
        let outliers = IqrFilter::new(self.config.schema().amount())
            .with_factor(self.config.iqr_factor())
            .apply(table)?;
        Ok(CleaningReport {
            rows_loaded,
            missing_before,
            imputation,
            outliers,
        })
    }
}
