//! Random forest training over round-robin partitions of the training set.

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{info, instrument};

use crate::error::ForestError;
use crate::node::Tree;
use crate::tree::DecisionTreeConfig;
use crate::value::Record;

/// Number of trees when none is given.
pub const DEFAULT_N_TREES: usize = 3;

/// A fitted forest: one tree per non-empty training bucket, in bucket order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RandomForest {
    pub(crate) trees: Vec<Tree>,
    pub(crate) category_key: String,
}

impl RandomForest {
    /// Assemble a forest from already-fitted trees.
    #[must_use]
    pub fn from_trees(trees: Vec<Tree>, category_key: impl Into<String>) -> Self {
        Self {
            trees,
            category_key: category_key.into(),
        }
    }

    /// Borrow the trees in bucket order.
    #[must_use]
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the category key the forest predicts.
    #[must_use]
    pub fn category_key(&self) -> &str {
        &self.category_key
    }
}

/// Configuration for forest training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_n_trees`.
/// Every tree is fitted with the same [`DecisionTreeConfig`].
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) tree: DecisionTreeConfig,
    pub(crate) n_trees: usize,
}

impl RandomForestConfig {
    /// Create a forest config of [`DEFAULT_N_TREES`] trees.
    #[must_use]
    pub fn new(tree: DecisionTreeConfig) -> Self {
        Self {
            tree,
            n_trees: DEFAULT_N_TREES,
        }
    }

    /// Set the number of buckets (and so the maximum number of trees).
    #[must_use]
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    /// Return the per-tree configuration.
    #[must_use]
    pub fn tree(&self) -> &DecisionTreeConfig {
        &self.tree
    }

    /// Return the number of buckets.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Train a forest on `training_set`.
    ///
    /// Record `i` goes to bucket `i % n_trees`, keeping its relative order.
    /// Each non-empty bucket is fitted independently on the rayon pool, and
    /// the trees are returned in bucket order, so a training set shorter than
    /// `n_trees` yields fewer trees.
    ///
    /// # Errors
    ///
    /// | Variant                                  | When                                        |
    /// |------------------------------------------|---------------------------------------------|
    /// | [`ForestError::InvalidTreeCount`]        | `n_trees` is zero                           |
    /// | [`ForestError::InvalidEntropyThreshold`] | threshold is negative or NaN                |
    /// | [`ForestError::CategoryKeyIgnored`]      | the category key is among the ignored keys  |
    /// | [`ForestError::MissingCategory`]         | a record has no value for the category key  |
    #[instrument(skip_all, fields(n_trees = self.n_trees, n_records = training_set.len()))]
    pub fn fit(&self, training_set: &[Record]) -> Result<RandomForest, ForestError> {
        if self.n_trees == 0 {
            return Err(ForestError::InvalidTreeCount {
                n_trees: self.n_trees,
            });
        }
        self.tree.validate(training_set)?;

        let buckets = partition(training_set, self.n_trees);
        let tree_config = &self.tree;

        // Buckets share nothing, so they fit in parallel; collect keeps order.
        let trees: Vec<Tree> = buckets
            .into_par_iter()
            .filter(|bucket| !bucket.is_empty())
            .map(|bucket| tree_config.fit_validated(&bucket))
            .collect();

        info!(
            n_trees = trees.len(),
            n_records = training_set.len(),
            "random forest trained"
        );

        Ok(RandomForest {
            trees,
            category_key: self.tree.category_key.clone(),
        })
    }
}

/// Split `records` round-robin into `n_buckets` ordered buckets.
///
/// Bucket `b` holds records `b, b + n, b + 2n, ...`. Buckets past the end of
/// a short training set are empty.
pub(crate) fn partition(records: &[Record], n_buckets: usize) -> Vec<Vec<Record>> {
    let mut buckets: Vec<Vec<Record>> = vec![Vec::new(); n_buckets];
    for (i, record) in records.iter().enumerate() {
        buckets[i % n_buckets].push(record.clone());
    }
    buckets
}
