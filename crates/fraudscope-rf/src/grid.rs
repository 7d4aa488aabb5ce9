//! Exhaustive cross-validated hyperparameter search.

use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::{ForestParams, RandomForestConfig};
use crate::cv::{CrossValidation, CvScore};
use crate::error::RfError;
use crate::forest::{RandomForest, validate_dataset};

/// Candidate values for each tunable forest parameter.
///
/// # Defaults
///
/// | Parameter           | Values                 |
/// |---------------------|------------------------|
/// | `bootstrap`         | `true`, `false`        |
/// | `max_depth`         | 10, 20, 30, `None`     |
/// | `min_samples_leaf`  | 1, 2, 4                |
/// | `min_samples_split` | 2, 5, 10               |
/// | `n_estimators`      | 100, 200, 300          |
///
/// 216 combinations in total.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ParamGrid {
    bootstrap: Vec<bool>,
    max_depth: Vec<Option<usize>>,
    min_samples_leaf: Vec<usize>,
    min_samples_split: Vec<usize>,
    n_estimators: Vec<usize>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            bootstrap: vec![true, false],
            max_depth: vec![Some(10), Some(20), Some(30), None],
            min_samples_leaf: vec![1, 2, 4],
            min_samples_split: vec![2, 5, 10],
            n_estimators: vec![100, 200, 300],
        }
    }
}

impl ParamGrid {
    /// Replace the tree-count candidates.
    #[must_use]
    pub fn with_n_estimators(mut self, values: Vec<usize>) -> Self {
        self.n_estimators = values;
        self
    }

    /// Replace the depth-limit candidates (`None` is unbounded).
    #[must_use]
    pub fn with_max_depth(mut self, values: Vec<Option<usize>>) -> Self {
        self.max_depth = values;
        self
    }

    /// Replace the min-samples-split candidates.
    #[must_use]
    pub fn with_min_samples_split(mut self, values: Vec<usize>) -> Self {
        self.min_samples_split = values;
        self
    }

    /// Replace the min-samples-leaf candidates.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, values: Vec<usize>) -> Self {
        self.min_samples_leaf = values;
        self
    }

    /// Replace the bootstrap candidates.
    #[must_use]
    pub fn with_bootstrap(mut self, values: Vec<bool>) -> Self {
        self.bootstrap = values;
        self
    }

    /// Number of combinations the grid enumerates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bootstrap.len()
            * self.max_depth.len()
            * self.min_samples_leaf.len()
            * self.min_samples_split.len()
            * self.n_estimators.len()
    }

    /// Return `true` if any parameter has no candidate values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerate every combination.
    ///
    /// Parameters are nested in name order (`bootstrap` outermost,
    /// `n_estimators` innermost), each in the order its values were given.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::EmptyGrid`] naming the first parameter with no values.
    pub fn candidates(&self) -> Result<Vec<ForestParams>, RfError> {
        for (parameter, len) in [
            ("bootstrap", self.bootstrap.len()),
            ("max_depth", self.max_depth.len()),
            ("min_samples_leaf", self.min_samples_leaf.len()),
            ("min_samples_split", self.min_samples_split.len()),
            ("n_estimators", self.n_estimators.len()),
        ] {
            if len == 0 {
                return Err(RfError::EmptyGrid { parameter });
            }
        }

        let mut out = Vec::with_capacity(self.len());
        for &bootstrap in &self.bootstrap {
            for &max_depth in &self.max_depth {
                for &min_samples_leaf in &self.min_samples_leaf {
                    for &min_samples_split in &self.min_samples_split {
                        for &n_estimators in &self.n_estimators {
                            out.push(ForestParams {
                                n_estimators,
                                max_depth,
                                min_samples_split,
                                min_samples_leaf,
                                bootstrap,
                            });
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    /// Return `true` if `params` is one of this grid's combinations.
    #[must_use]
    pub fn contains(&self, params: &ForestParams) -> bool {
        self.bootstrap.contains(&params.bootstrap)
            && self.max_depth.contains(&params.max_depth)
            && self.min_samples_leaf.contains(&params.min_samples_leaf)
            && self.min_samples_split.contains(&params.min_samples_split)
            && self.n_estimators.contains(&params.n_estimators)
    }
}

/// Cross-validated score of one grid combination.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CandidateScore {
    /// Position in enumeration order.
    pub index: usize,
    /// The combination scored.
    pub params: ForestParams,
    /// Its cross-validation accuracy.
    pub score: CvScore,
}

/// Outcome of a grid search.
#[derive(Debug)]
pub struct GridSearchResult {
    best_index: usize,
    candidates: Vec<CandidateScore>,
    best_forest: RandomForest,
}

impl GridSearchResult {
    /// Return the winning combination.
    #[must_use]
    pub fn best_params(&self) -> ForestParams {
        self.candidates[self.best_index].params
    }

    /// Return the winning combination's cross-validation score.
    #[must_use]
    pub fn best_score(&self) -> &CvScore {
        &self.candidates[self.best_index].score
    }

    /// Return the forest refit on the full training set with the best params.
    #[must_use]
    pub fn best_forest(&self) -> &RandomForest {
        &self.best_forest
    }

    /// Consume the result and return the refit forest.
    #[must_use]
    pub fn into_best_forest(self) -> RandomForest {
        self.best_forest
    }

    /// Return every candidate's score in enumeration order.
    #[must_use]
    pub fn candidates(&self) -> &[CandidateScore] {
        &self.candidates
    }
}

/// Exhaustive grid search scored by stratified k-fold accuracy.
///
/// Construct via [`GridSearch::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter | Default |
/// |---|---|
/// | `cv` | 3 folds, seed 42 |
/// | `base` | [`RandomForestConfig::default`] |
#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: ParamGrid,
    cv: CrossValidation,
    base: RandomForestConfig,
}

impl GridSearch {
    /// Create a search over `grid` with 3-fold cross-validation.
    #[must_use]
    pub fn new(grid: ParamGrid) -> Self {
        Self {
            grid,
            cv: CrossValidation::default(),
            base: RandomForestConfig::default(),
        }
    }

    /// Set the cross-validation scheme.
    #[must_use]
    pub fn with_cv(mut self, cv: CrossValidation) -> Self {
        self.cv = cv;
        self
    }

    /// Set the config whose non-grid settings (seed and max_features)
    /// every candidate inherits.
    #[must_use]
    pub fn with_base_config(mut self, base: RandomForestConfig) -> Self {
        self.base = base;
        self
    }

    /// Return the grid being searched.
    #[must_use]
    pub fn grid(&self) -> &ParamGrid {
        &self.grid
    }

    /// Score every combination, pick the best and refit it on all of
    /// `features`.
    ///
    /// Candidates run in parallel. The best candidate has the highest mean
    /// CV accuracy; ties go to the earliest in enumeration order.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyGrid`] | A grid parameter has no values |
    /// | [`RfError::TooFewSamplesForFolds`] | Every class is smaller than the fold count |
    /// | Other RF errors | Invalid candidate params or training data |
    #[instrument(skip_all, fields(n_candidates = self.grid.len(), n_folds = self.cv.n_folds(), n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<GridSearchResult, RfError> {
        let candidates = self.grid.candidates()?;
        validate_dataset(features, labels)?;
        let assignment = self.cv.fold_assignments(labels)?;

        info!(n_candidates = candidates.len(), "starting grid search");

        let scored: Vec<CandidateScore> = candidates
            .into_par_iter()
            .enumerate()
            .map(|(index, params)| {
                let config = self.base.clone().with_params(params);
                config.validate()?;
                let score = self
                    .cv
                    .evaluate_with_folds(&config, features, labels, &assignment)?;
                debug!(index, %params, mean_accuracy = score.mean_accuracy, "candidate scored");
                Ok(CandidateScore {
                    index,
                    params,
                    score,
                })
            })
            .collect::<Result<_, RfError>>()?;

        let mut best_index = 0;
        for (i, candidate) in scored.iter().enumerate() {
            if candidate.score.mean_accuracy > scored[best_index].score.mean_accuracy {
                best_index = i;
            }
        }
        let best = &scored[best_index];
        info!(
            best_index,
            best_params = %best.params,
            best_mean_accuracy = best.score.mean_accuracy,
            "grid search complete, refitting best candidate"
        );

        let best_forest = self
            .base
            .clone()
            .with_params(best.params)
            .fit(features, labels)?;

        Ok(GridSearchResult {
            best_index,
            candidates: scored,
            best_forest,
        })
    }
}
