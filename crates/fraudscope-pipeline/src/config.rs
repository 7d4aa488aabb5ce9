use fraudscope_io::Schema;
use fraudscope_rf::{CrossValidation, ParamGrid, RandomForestConfig, RfError};

/// Settings for one pipeline run.
///
/// Construct via [`PipelineConfig::new`] or [`Default`], then chain `with_*`
/// methods. Values are checked when the stage that uses them runs.
///
/// # Defaults
///
/// | Parameter | Default |
/// |---|---|
/// | `seed` | 42 |
/// | `test_fraction` | 0.3 |
/// | `cv_folds` | 3 |
/// | `iqr_factor` | 1.5 |
/// | `delimiter` | `,` |
/// | `grid` | [`ParamGrid::default`] (216 combinations) |
/// | `schema` | [`Schema::fraud`] |
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    seed: u64,
    test_fraction: f64,
    cv_folds: usize,
    iqr_factor: f64,
    delimiter: u8,
    grid: ParamGrid,
    schema: Schema,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.3,
            cv_folds: 3,
            iqr_factor: 1.5,
            delimiter: b',',
            grid: ParamGrid::default(),
            schema: Schema::fraud(),
        }
    }
}

impl PipelineConfig {
    /// Create a config with every default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the seed shared by the split, the forests and the CV folds.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the share of rows held out for testing.
    #[must_use]
    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    /// Set the number of cross-validation folds used by the grid search.
    #[must_use]
    pub fn with_cv_folds(mut self, cv_folds: usize) -> Self {
        self.cv_folds = cv_folds;
        self
    }

    /// Set the IQR fence multiplier for amount trimming.
    #[must_use]
    pub fn with_iqr_factor(mut self, iqr_factor: f64) -> Self {
        self.iqr_factor = iqr_factor;
        self
    }

    /// Set the input field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the hyperparameter grid.
    #[must_use]
    pub fn with_grid(mut self, grid: ParamGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Set the column roles.
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    #[must_use]
    pub fn cv_folds(&self) -> usize {
        self.cv_folds
    }

    #[must_use]
    pub fn iqr_factor(&self) -> f64 {
        self.iqr_factor
    }

    #[must_use]
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    #[must_use]
    pub fn grid(&self) -> &ParamGrid {
        &self.grid
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Forest with library defaults, seeded from this config.
    pub(crate) fn forest_config(&self) -> RandomForestConfig {
        RandomForestConfig::default().with_seed(self.seed)
    }

    /// Cross-validation scheme for the grid search.
    pub(crate) fn cross_validation(&self) -> Result<CrossValidation, RfError> {
        Ok(CrossValidation::new(self.cv_folds)?.with_seed(self.seed))
    }
}
