//! Criterion benchmarks for fraudscope-rf: forest training and grid search.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use fraudscope_rf::{GridSearch, ParamGrid, RandomForestConfig};

fn make_fraud_like(n_samples: usize, n_features: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let label = usize::from(i % 20 == 0);
        labels.push(label);
        let row: Vec<f64> = (0..n_features)
            .map(|f| {
                let shift = if f < 2 { label as f64 * 1.5 } else { 0.0 };
                shift + rng.r#gen::<f64>()
            })
            .collect();
        features.push(row);
    }
    (features, labels)
}

fn bench_rf_train(c: &mut Criterion) {
    let (features, labels) = make_fraud_like(1000, 8, 42);
    let cfg = RandomForestConfig::default();

    c.bench_function("rf_train_1000x8_100trees", |b| {
        b.iter(|| cfg.fit(&features, &labels).unwrap());
    });
}

fn bench_rf_predict_proba(c: &mut Criterion) {
    let (features, labels) = make_fraud_like(1000, 8, 42);
    let forest = RandomForestConfig::default().fit(&features, &labels).unwrap();

    c.bench_function("rf_class_scores_1000x8_100trees", |b| {
        b.iter(|| forest.class_scores(&features, 1).unwrap());
    });
}

fn bench_grid_search(c: &mut Criterion) {
    let (features, labels) = make_fraud_like(300, 8, 42);
    let grid = ParamGrid::default()
        .with_n_estimators(vec![20])
        .with_max_depth(vec![Some(10), None])
        .with_min_samples_leaf(vec![1, 4]);
    let search = GridSearch::new(grid);

    let mut group = c.benchmark_group("grid_search");
    group.sample_size(10);
    group.bench_function("grid_24_candidates_300x8", |b| {
        b.iter(|| search.fit(&features, &labels).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_rf_train, bench_rf_predict_proba, bench_grid_search);
criterion_main!(benches);
