//! Classification regression tests for fraudscope-rf.
//!
//! Run the full train / cross-validate / tune / score chain on a
//! deterministic, imbalanced two-class dataset shaped like fraud data.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use fraudscope_rf::{
    ConfusionMatrix, CrossValidation, GridSearch, ParamGrid, RandomForestConfig, RocCurve,
};

// ---------------------------------------------------------------------------
// Helper: deterministic synthetic fraud dataset
// ---------------------------------------------------------------------------

/// Generate `n_samples` rows with 6 features, every tenth row positive.
///
/// Features 0-1 are informative (shifted by the label), features 2-5 are
/// uniform noise in [0, 1).
fn make_fraud_like(n_samples: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let label = usize::from(i % 10 == 0);
        labels.push(label);
        let row: Vec<f64> = (0..6)
            .map(|f| {
                let shift = match f {
                    0 => 3.0,
                    1 => 2.0,
                    _ => 0.0,
                };
                label as f64 * shift + rng.r#gen::<f64>()
            })
            .collect();
        features.push(row);
    }
    (features, labels)
}

fn split_half(
    features: &[Vec<f64>],
    labels: &[usize],
) -> (Vec<Vec<f64>>, Vec<usize>, Vec<Vec<f64>>, Vec<usize>) {
    let mid = features.len() / 2;
    (
        features[..mid].to_vec(),
        labels[..mid].to_vec(),
        features[mid..].to_vec(),
        labels[mid..].to_vec(),
    )
}

// ---------------------------------------------------------------------------
// a) default forest generalizes
// ---------------------------------------------------------------------------

#[test]
fn default_forest_holdout_metrics() {
    let (features, labels) = make_fraud_like(600, 42);
    let (train_x, train_y, test_x, test_y) = split_half(&features, &labels);

    let forest = RandomForestConfig::default().fit(&train_x, &train_y).unwrap();
    let predictions = forest.predict_batch(&test_x).unwrap();
    let cm = ConfusionMatrix::from_labels(&test_y, &predictions, 2).unwrap();
    assert!(cm.accuracy() > 0.95, "holdout accuracy {}", cm.accuracy());

    let scores = forest.class_scores(&test_x, 1).unwrap();
    let roc = RocCurve::from_scores(&test_y, &scores, 1).unwrap();
    assert!(roc.auc() > 0.95, "holdout auc {}", roc.auc());
    assert!(roc.auc() <= 1.0);
}

// ---------------------------------------------------------------------------
// b) cross-validation
// ---------------------------------------------------------------------------

#[test]
fn stratified_cv_accuracy_above_threshold() {
    let (features, labels) = make_fraud_like(300, 7);
    let config = RandomForestConfig::new(30).unwrap();
    let score = CrossValidation::new(3)
        .unwrap()
        .evaluate(&config, &features, &labels)
        .unwrap();
    assert_eq!(score.fold_accuracies.len(), 3);
    assert!(score.mean_accuracy > 0.9, "cv mean {}", score.mean_accuracy);
}

// ---------------------------------------------------------------------------
// c) grid search
// ---------------------------------------------------------------------------

#[test]
fn reduced_grid_search_returns_grid_member() {
    let (features, labels) = make_fraud_like(240, 3);
    let grid = ParamGrid::default()
        .with_n_estimators(vec![100])
        .with_max_depth(vec![Some(10), None])
        .with_min_samples_split(vec![2, 10])
        .with_min_samples_leaf(vec![1])
        .with_bootstrap(vec![true, false]);

    let result = GridSearch::new(grid.clone()).fit(&features, &labels).unwrap();

    assert_eq!(result.candidates().len(), 8);
    assert!(grid.contains(&result.best_params()));
    assert!(ParamGrid::default().contains(&result.best_params()));
    assert!(result.best_score().mean_accuracy > 0.9);
    for (i, candidate) in result.candidates().iter().enumerate() {
        assert_eq!(candidate.index, i);
        assert!((0.0..=1.0).contains(&candidate.score.mean_accuracy));
    }
}

// ---------------------------------------------------------------------------
// d) determinism
// ---------------------------------------------------------------------------

#[test]
fn deterministic_probabilities() {
    let (features, labels) = make_fraud_like(200, 11);
    let config = RandomForestConfig::new(40).unwrap().with_seed(5);
    let a = config.fit(&features, &labels).unwrap();
    let b = config.fit(&features, &labels).unwrap();
    assert_eq!(
        a.class_scores(&features, 1).unwrap(),
        b.class_scores(&features, 1).unwrap()
    );
}
