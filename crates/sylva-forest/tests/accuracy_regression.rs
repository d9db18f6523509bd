//! Accuracy regression tests for sylva-forest.
//!
//! These tests verify that algorithmic changes do not degrade classification
//! accuracy on a deterministic synthetic dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use sylva_forest::{Category, DecisionTreeConfig, Model, RandomForestConfig, Record};

// ---------------------------------------------------------------------------
// Helper: deterministic synthetic classification dataset
// ---------------------------------------------------------------------------

const CLASSES: [&str; 3] = ["setosa", "versicolor", "virginica"];

/// Generate a 300-record, 3-class dataset.
///
/// `f0`-`f2` are informative (class * 3.0 + noise in [0, 0.5]), `f3`-`f6`
/// are pure noise, and `colour` agrees with the class four times out of five.
/// Records are assigned round-robin across classes.
fn make_classification() -> Vec<Record> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    (0..300)
        .map(|i| {
            let class = i % CLASSES.len();
            let mut record = Record::new();
            for f in 0..7 {
                let base = if f < 3 { class as f64 * 3.0 } else { 0.0 };
                record.insert(format!("f{f}"), base + rng.r#gen::<f64>() * 0.5);
            }
            let colour = if rng.r#gen::<f64>() < 0.8 {
                class
            } else {
                rng.gen_range(0..CLASSES.len())
            };
            record.insert("colour", format!("c{colour}"));
            record.insert("species", CLASSES[class]);
            record
        })
        .collect()
}

fn accuracy(model: &Model, test: &[Record]) -> f64 {
    let correct = test
        .iter()
        .filter(|r| {
            let truth = Category::from(r.get("species").unwrap());
            model.predict(r).winner() == Some(&truth)
        })
        .count();
    correct as f64 / test.len() as f64
}

// ---------------------------------------------------------------------------
// a) tree_holdout_accuracy_above_threshold
// ---------------------------------------------------------------------------

/// A single tree trained on 200 records must exceed 0.95 on the other 100.
#[test]
fn tree_holdout_accuracy_above_threshold() {
    let data = make_classification();
    let (train, test) = data.split_at(200);
    let tree = DecisionTreeConfig::new("species").fit(train).unwrap();
    let acc = accuracy(&Model::from_tree(tree, "species"), test);
    assert!(acc > 0.95, "tree holdout accuracy {acc} <= 0.95");
}

// ---------------------------------------------------------------------------
// b) forest_holdout_accuracy_above_threshold
// ---------------------------------------------------------------------------

/// A 5-tree forest (40 records per tree) must exceed 0.95 on the holdout.
#[test]
fn forest_holdout_accuracy_above_threshold() {
    let data = make_classification();
    let (train, test) = data.split_at(200);
    let forest = RandomForestConfig::new(DecisionTreeConfig::new("species"))
        .with_n_trees(5)
        .fit(train)
        .unwrap();
    assert_eq!(forest.n_trees(), 5);
    let acc = accuracy(&Model::from(forest), test);
    assert!(acc > 0.95, "forest holdout accuracy {acc} <= 0.95");
}

// ---------------------------------------------------------------------------
// c) noise_attributes_are_not_the_root
// ---------------------------------------------------------------------------

/// The root split must test an informative attribute.
#[test]
fn noise_attributes_are_not_the_root() {
    let data = make_classification();
    let tree = DecisionTreeConfig::new("species").fit(&data).unwrap();
    let sylva_forest::Tree::Node { attribute, .. } = &tree else {
        panic!("expected a split at the root");
    };
    assert!(
        ["f0", "f1", "f2"].contains(&attribute.as_str()),
        "root splits on {attribute}"
    );
}

// ---------------------------------------------------------------------------
// d) ignoring_informative_attributes_degrades_gracefully
// ---------------------------------------------------------------------------

/// With the numeric signal ignored the tree falls back on `colour`, which is
/// still far better than chance.
#[test]
fn ignoring_informative_attributes_degrades_gracefully() {
    let data = make_classification();
    let (train, test) = data.split_at(200);
    let tree = DecisionTreeConfig::new("species")
        .with_ignored_keys(["f0", "f1", "f2"])
        .with_max_depth(2)
        .fit(train)
        .unwrap();
    let acc = accuracy(&Model::from_tree(tree, "species"), test);
    assert!(acc > 0.6, "colour-only accuracy {acc} <= 0.6");
}
