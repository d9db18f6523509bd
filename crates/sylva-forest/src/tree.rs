use tracing::{debug, instrument, trace};

use crate::entropy::{LabelCounts, entropy};
use crate::error::ForestError;
use crate::node::Tree;
use crate::split::find_best_split;
use crate::value::Record;

/// Configuration for a single information-gain decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default |
/// |---------------------|---------|
/// | `ignored_keys`      | none    |
/// | `min_items_count`   | 0       |
/// | `entropy_threshold` | 0.01    |
/// | `max_depth`         | 90      |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) category_key: String,
    pub(crate) ignored_keys: Vec<String>,
    pub(crate) min_items_count: usize,
    pub(crate) entropy_threshold: f64,
    pub(crate) max_depth: usize,
}

impl DecisionTreeConfig {
    /// Create a new config predicting the attribute named `category_key`.
    #[must_use]
    pub fn new(category_key: impl Into<String>) -> Self {
        Self {
            category_key: category_key.into(),
            ignored_keys: Vec::new(),
            min_items_count: 0,
            entropy_threshold: 0.01,
            max_depth: 90,
        }
    }

    /// Set the attributes excluded from splitting.
    #[must_use]
    pub fn with_ignored_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Set the record count at or below which a node becomes a leaf.
    #[must_use]
    pub fn with_min_items_count(mut self, min_items_count: usize) -> Self {
        self.min_items_count = min_items_count;
        self
    }

    /// Set the entropy at or below which a node becomes a leaf.
    #[must_use]
    pub fn with_entropy_threshold(mut self, entropy_threshold: f64) -> Self {
        self.entropy_threshold = entropy_threshold;
        self
    }

    /// Set the maximum number of split levels. `0` always yields a single leaf.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    // --- Getters ---

    /// Return the category key.
    #[must_use]
    pub fn category_key(&self) -> &str {
        &self.category_key
    }

    /// Return the ignored keys.
    #[must_use]
    pub fn ignored_keys(&self) -> &[String] {
        &self.ignored_keys
    }

    /// Return the minimum record count for splitting.
    #[must_use]
    pub fn min_items_count(&self) -> usize {
        self.min_items_count
    }

    /// Return the entropy threshold.
    #[must_use]
    pub fn entropy_threshold(&self) -> f64 {
        self.entropy_threshold
    }

    /// Return the maximum depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Check the configuration and the training set before fitting.
    pub(crate) fn validate(&self, training_set: &[Record]) -> Result<(), ForestError> {
        if self.entropy_threshold.is_nan() || self.entropy_threshold < 0.0 {
            return Err(ForestError::InvalidEntropyThreshold {
                threshold: self.entropy_threshold,
            });
        }
        if self.ignored_keys.contains(&self.category_key) {
            return Err(ForestError::CategoryKeyIgnored {
                category_key: self.category_key.clone(),
            });
        }
        if let Some(record_index) = training_set
            .iter()
            .position(|r| !r.contains_key(&self.category_key))
        {
            return Err(ForestError::MissingCategory {
                record_index,
                category_key: self.category_key.clone(),
            });
        }
        Ok(())
    }

    /// Fit a decision tree on `training_set`.
    ///
    /// Stops growing a branch when the depth budget is spent, when it holds
    /// `min_items_count` records or fewer, when its label entropy is at most
    /// `entropy_threshold`, or when no split has positive information gain.
    /// An empty training set yields a leaf without a category.
    ///
    /// # Errors
    ///
    /// | Variant                                  | When                                        |
    /// |------------------------------------------|---------------------------------------------|
    /// | [`ForestError::InvalidEntropyThreshold`] | threshold is negative or NaN                |
    /// | [`ForestError::CategoryKeyIgnored`]      | the category key is among the ignored keys  |
    /// | [`ForestError::MissingCategory`]         | a record has no value for the category key  |
    #[instrument(skip(self, training_set), fields(n_records = training_set.len(), category_key = %self.category_key))]
    pub fn fit(&self, training_set: &[Record]) -> Result<Tree, ForestError> {
        self.validate(training_set)?;
        Ok(self.fit_validated(training_set))
    }

    /// Fit on a training set already accepted by [`Self::validate`].
    pub(crate) fn fit_validated(&self, training_set: &[Record]) -> Tree {
        let working: Vec<Record> = training_set
            .iter()
            .map(|r| r.without(&self.ignored_keys))
            .collect();

        let tree = self.grow(&working, self.max_depth);

        debug!(
            n_records = training_set.len(),
            n_nodes = tree.n_nodes(),
            depth = tree.depth(),
            "decision tree built"
        );
        tree
    }

    /// Recursively build the subtree for `records` with `depth_remaining`
    /// split levels left.
    fn grow(&self, records: &[Record], depth_remaining: usize) -> Tree {
        let make_leaf = || Tree::Leaf {
            category: LabelCounts::from_records(records, &self.category_key)
                .most_frequent()
                .cloned(),
        };

        if depth_remaining == 0 || records.len() <= self.min_items_count {
            return make_leaf();
        }

        let parent_entropy = entropy(records, &self.category_key);
        if parent_entropy <= self.entropy_threshold {
            return make_leaf();
        }

        let Some(split) = find_best_split(records, &self.category_key, parent_entropy) else {
            return make_leaf();
        };

        trace!(
            attribute = %split.attribute,
            operator = %split.operator,
            pivot = %split.pivot,
            gain = split.gain,
            n_matched = split.matched.len(),
            n_unmatched = split.unmatched.len(),
            "split chosen"
        );

        let matched = self.grow(&split.matched, depth_remaining - 1);
        let unmatched = self.grow(&split.unmatched, depth_remaining - 1);

        Tree::Node {
            attribute: split.attribute,
            operator: split.operator,
            pivot: split.pivot,
            matched: Box::new(matched),
            unmatched: Box::new(unmatched),
        }
    }
}
