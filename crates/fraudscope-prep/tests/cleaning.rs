//! Cleaning stages chained on one transaction table.

use std::collections::HashSet;

use fraudscope_io::{Column, Schema, Table};
use fraudscope_prep::{
    FeatureMatrix, FillValue, IqrFilter, VifTable, impute_median, median, train_test_split,
};

fn transactions(n: usize) -> Table {
    let amount: Vec<Option<f64>> = (0..n)
        .map(|i| match i {
            _ if i % 17 == 3 => None,
            _ if i % 50 == 49 => Some(1.0e7),
            _ => Some(100.0 + (i % 23) as f64 * 10.0),
        })
        .collect();
    let balance: Vec<Option<f64>> = (0..n)
        .map(|i| (i % 11 != 0).then_some((i * 7 % 31) as f64))
        .collect();
    let step: Vec<Option<f64>> = (0..n).map(|i| Some((i / 10) as f64)).collect();
    let name_orig: Vec<Option<String>> = (0..n)
        .map(|i| (i % 13 != 5).then(|| format!("C{i:04}")))
        .collect();
    let name_dest: Vec<Option<String>> = (0..n).map(|i| Some(format!("M{}", i % 9))).collect();
    let fraud: Vec<Option<f64>> = (0..n).map(|i| Some(f64::from(u8::from(i % 20 == 0)))).collect();

    Table::new(vec![
        ("step".into(), Column::Numeric(step)),
        ("amount".into(), Column::Numeric(amount)),
        ("nameOrig".into(), Column::Text(name_orig)),
        ("oldbalanceOrg".into(), Column::Numeric(balance)),
        ("nameDest".into(), Column::Text(name_dest)),
        ("isFraud".into(), Column::Numeric(fraud)),
    ])
    .unwrap()
}

#[test]
fn clean_extract_and_split() {
    let schema = Schema::fraud();
    let mut table = transactions(400);
    let original_amounts: Vec<f64> = table
        .column("amount")
        .unwrap()
        .as_numeric()
        .unwrap()
        .iter()
        .flatten()
        .copied()
        .collect();
    let expected_fill = median(&original_amounts).unwrap();

    let imputation = impute_median(&mut table).unwrap();
    assert_eq!(table.total_missing(), 0);
    assert_eq!(
        imputation.get("amount").unwrap().value,
        FillValue::Numeric(expected_fill)
    );
    assert!(imputation.get("nameOrig").is_some());
    assert!(imputation.get("nameDest").is_none());

    let outliers = IqrFilter::new(schema.amount()).apply(&mut table).unwrap();
    assert_eq!(outliers.rows_removed(), 8);
    assert_eq!(table.n_rows(), 392);
    assert!(
        table
            .column("amount")
            .unwrap()
            .as_numeric()
            .unwrap()
            .iter()
            .flatten()
            .all(|v| *v >= outliers.lower && *v <= outliers.upper)
    );

    let features = FeatureMatrix::from_table(&table, &schema).unwrap();
    assert_eq!(features.feature_names(), &["step", "amount", "oldbalanceOrg"]);
    assert_eq!(features.n_rows(), 392);

    let vif = VifTable::compute(&features);
    assert_eq!(vif.entries().len(), 3);
    assert!(vif.entries().iter().all(|e| e.vif >= 1.0 - 1e-9));

    let split = train_test_split(features.n_rows(), 0.3, 42).unwrap();
    assert_eq!(split.n_test(), 118);
    assert_eq!(split.n_train(), 274);
    let train: HashSet<_> = split.train().iter().collect();
    assert!(split.test().iter().all(|i| !train.contains(i)));

    let test_set = features.subset(split.test());
    assert_eq!(test_set.n_rows(), 118);
}
