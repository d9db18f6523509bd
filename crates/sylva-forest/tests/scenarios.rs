//! End-to-end tree and forest behaviour on small hand-checked datasets.

use serde_json::json;

use sylva_forest::{
    Category, DecisionTreeConfig, Operator, RandomForestConfig, Record, Tree, Value, entropy,
    information_gain,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn records(value: serde_json::Value) -> Vec<Record> {
    serde_json::from_value(value).unwrap()
}

fn hair_lengths() -> Vec<Record> {
    records(json!([
        {"hairLength": 0, "sex": "male"},
        {"hairLength": 5, "sex": "male"},
        {"hairLength": 10, "sex": "male"},
        {"hairLength": 25, "sex": "female"},
        {"hairLength": 27, "sex": "female"},
        {"hairLength": 45, "sex": "female"}
    ]))
}

fn hair_and_weight() -> Vec<Record> {
    records(json!([
        {"hairLength": 0, "sex": "male", "weight": 75},
        {"hairLength": 5, "sex": "male", "weight": 78},
        {"hairLength": 9, "sex": "male", "weight": 80},
        {"hairLength": 9, "sex": "female", "weight": 72},
        {"hairLength": 10, "sex": "female", "weight": 75}
    ]))
}

fn simpsons() -> Vec<Record> {
    records(json!([
        {"person": "Homer", "hairLength": 0, "weight": 250, "age": 36, "sex": "male"},
        {"person": "Marge", "hairLength": 10, "weight": 150, "age": 34, "sex": "female"},
        {"person": "Bart", "hairLength": 2, "weight": 90, "age": 10, "sex": "male"},
        {"person": "Lisa", "hairLength": 6, "weight": 78, "age": 8, "sex": "female"},
        {"person": "Maggie", "hairLength": 4, "weight": 20, "age": 1, "sex": "female"},
        {"person": "Abe", "hairLength": 1, "weight": 170, "age": 70, "sex": "male"},
        {"person": "Selma", "hairLength": 8, "weight": 160, "age": 41, "sex": "female"},
        {"person": "Otto", "hairLength": 10, "weight": 180, "age": 38, "sex": "male"},
        {"person": "Krusty", "hairLength": 6, "weight": 200, "age": 45, "sex": "male"}
    ]))
}

fn record(value: serde_json::Value) -> Record {
    serde_json::from_value(value).unwrap()
}

/// Destructure a split node, panicking on a leaf.
fn split(tree: &Tree) -> (&str, Operator, &Value, &Tree, &Tree) {
    match tree {
        Tree::Node {
            attribute,
            operator,
            pivot,
            matched,
            unmatched,
        } => (attribute, *operator, pivot, matched, unmatched),
        Tree::Leaf { .. } => panic!("expected a split, got {tree:?}"),
    }
}

fn label(tree: &Tree) -> Option<&str> {
    assert!(tree.is_leaf(), "expected a leaf, got {tree:?}");
    tree.category().map(Category::as_str)
}

// ---------------------------------------------------------------------------
// Decision tree
// ---------------------------------------------------------------------------

#[test]
fn hair_length_root_split() {
    let tree = DecisionTreeConfig::new("sex").fit(&hair_lengths()).unwrap();
    let (attribute, operator, pivot, matched, unmatched) = split(&tree);
    assert_eq!(attribute, "hairLength");
    assert_eq!(operator, Operator::GreaterOrEqual);
    assert_eq!(*pivot, Value::Number(25.0));
    assert_eq!(label(matched), Some("female"));
    assert_eq!(label(unmatched), Some("male"));
}

#[test]
fn hair_length_predictions() {
    let tree = DecisionTreeConfig::new("sex").fit(&hair_lengths()).unwrap();
    let predict = |r: serde_json::Value| tree.predict(&record(r)).map(Category::as_str);
    assert_eq!(predict(json!({"hairLength": 12})), Some("male"));
    assert_eq!(predict(json!({"hairLength": 9})), Some("male"));
    assert_eq!(predict(json!({"hairLength": 120})), Some("female"));
    // Absent attribute follows the unmatched branch.
    assert_eq!(predict(json!({"weight": 60})), Some("male"));
}

#[test]
fn weight_then_hair_length() {
    let tree = DecisionTreeConfig::new("sex").fit(&hair_and_weight()).unwrap();
    let (attribute, operator, pivot, matched, unmatched) = split(&tree);
    assert_eq!((attribute, operator), ("weight", Operator::GreaterOrEqual));
    assert_eq!(*pivot, Value::Number(78.0));
    assert_eq!(label(matched), Some("male"));

    let (attribute, operator, pivot, matched, unmatched) = split(unmatched);
    assert_eq!((attribute, operator), ("hairLength", Operator::GreaterOrEqual));
    assert_eq!(*pivot, Value::Number(9.0));
    assert_eq!(label(matched), Some("female"));
    assert_eq!(label(unmatched), Some("male"));
}

#[test]
fn simpsons_fit_classifies_training_set() {
    let training = simpsons();
    let tree = DecisionTreeConfig::new("sex")
        .with_ignored_keys(["person"])
        .fit(&training)
        .unwrap();
    for r in &training {
        assert_eq!(
            tree.predict(r),
            Some(&Category::from(r.get("sex").unwrap())),
            "misclassified {r:?}"
        );
    }
    assert!(!tree.to_string().contains("person"));
}

#[test]
fn fitting_is_deterministic() {
    let config = DecisionTreeConfig::new("sex").with_ignored_keys(["person"]);
    let first = config.fit(&simpsons()).unwrap();
    let second = config.fit(&simpsons()).unwrap();
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Structural laws
// ---------------------------------------------------------------------------

/// Recompute each split's gain on the records that reach it.
fn check_positive_gain(tree: &Tree, records: &[Record], category_key: &str) {
    let Tree::Node {
        attribute,
        operator,
        pivot,
        matched,
        unmatched,
    } = tree
    else {
        return;
    };
    let (m, u): (Vec<&Record>, Vec<&Record>) = records
        .iter()
        .partition(|r| operator.holds(r.get(attribute), pivot));
    let gain = information_gain(entropy(records, category_key), &m, &u, category_key);
    assert!(gain > 0.0, "split {attribute} {operator} {pivot} has gain {gain}");

    let m: Vec<Record> = m.into_iter().cloned().collect();
    let u: Vec<Record> = u.into_iter().cloned().collect();
    check_positive_gain(matched, &m, category_key);
    check_positive_gain(unmatched, &u, category_key);
}

#[test]
fn every_split_has_positive_gain() {
    for (training, key) in [(hair_lengths(), "sex"), (hair_and_weight(), "sex"), (simpsons(), "sex")] {
        let tree = DecisionTreeConfig::new(key)
            .with_ignored_keys(["person"])
            .fit(&training)
            .unwrap();
        let working: Vec<Record> = training
            .iter()
            .map(|r| r.without(&["person".to_string()]))
            .collect();
        check_positive_gain(&tree, &working, key);
    }
}

#[test]
fn pure_training_set_is_single_leaf() {
    let training = records(json!([
        {"x": 1, "kind": "a"},
        {"x": 2, "kind": "a"},
        {"x": "three", "kind": "a"}
    ]));
    let tree = DecisionTreeConfig::new("kind").fit(&training).unwrap();
    assert_eq!(label(&tree), Some("a"));
    assert_eq!(tree.n_nodes(), 1);
}

#[test]
fn mixed_value_kinds_in_one_attribute() {
    let training = records(json!([
        {"size": "small", "kind": "mouse"},
        {"size": 3, "kind": "cat"},
        {"size": "4.5", "kind": "cat"},
        {"size": "small", "kind": "mouse"}
    ]));
    let tree = DecisionTreeConfig::new("kind").fit(&training).unwrap();
    for r in &training {
        assert_eq!(tree.predict(r), Some(&Category::from(r.get("kind").unwrap())));
    }
}

// ---------------------------------------------------------------------------
// Random forest
// ---------------------------------------------------------------------------

#[test]
fn forest_of_three_on_six_records() {
    let forest = RandomForestConfig::new(DecisionTreeConfig::new("sex"))
        .with_n_trees(3)
        .fit(&hair_lengths())
        .unwrap();
    assert_eq!(forest.n_trees(), 3);

    // Buckets are {0, 25}, {5, 27}, {10, 45}.
    let pivots: Vec<&Value> = forest.trees().iter().map(|t| split(t).2).collect();
    assert_eq!(
        pivots,
        [&Value::Number(25.0), &Value::Number(27.0), &Value::Number(45.0)]
    );
    for tree in forest.trees() {
        let (attribute, _, _, matched, unmatched) = split(tree);
        assert_eq!(attribute, "hairLength");
        assert_eq!(label(matched), Some("female"));
        assert_eq!(label(unmatched), Some("male"));
    }
}

#[test]
fn forest_votes_sum_to_tree_count() {
    let forest = RandomForestConfig::new(DecisionTreeConfig::new("sex"))
        .with_n_trees(3)
        .fit(&hair_lengths())
        .unwrap();

    let votes = forest.predict(&record(json!({"hairLength": 26})));
    // 26 >= 25 only in the first tree.
    assert_eq!(votes.get("female"), 1);
    assert_eq!(votes.get("male"), 2);
    assert_eq!(votes.total(), forest.n_trees());
    assert_eq!(votes.winner().map(Category::as_str), Some("male"));

    let votes = forest.predict(&record(json!({"hairLength": 100})));
    assert_eq!(votes.get("female"), 3);
    assert!(votes.get("male") == 0);
}

#[test]
fn forest_trees_match_bucket_trees() {
    let training = simpsons();
    let tree_config = DecisionTreeConfig::new("sex").with_ignored_keys(["person"]);
    let forest = RandomForestConfig::new(tree_config.clone())
        .with_n_trees(4)
        .fit(&training)
        .unwrap();

    for (b, tree) in forest.trees().iter().enumerate() {
        let bucket: Vec<Record> = training.iter().skip(b).step_by(4).cloned().collect();
        assert_eq!(*tree, tree_config.fit(&bucket).unwrap(), "tree {b}");
    }
}
