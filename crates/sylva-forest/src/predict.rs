//! Prediction methods for trees and the forest ensemble.

use rayon::iter::{IntoParallelIterator, IntoParallelRefIterator, ParallelIterator};

use crate::forest::RandomForest;
use crate::node::{Category, Tree};
use crate::value::Record;

/// Strategy for classifying one record with one tree.
///
/// [`ForestPredictor`] applies it to every tree of a forest. The default,
/// [`Traversal`], walks the tree; tests and alternative traversals can plug
/// in their own.
pub trait TreePredictor: Sync {
    /// Predict the category of `record` using `tree`.
    fn predict(&self, tree: &Tree, record: &Record) -> Option<Category>;
}

/// Root-to-leaf traversal via [`Tree::predict`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Traversal;

impl TreePredictor for Traversal {
    fn predict(&self, tree: &Tree, record: &Record) -> Option<Category> {
        tree.predict(record).cloned()
    }
}

impl<F> TreePredictor for F
where
    F: Fn(&Tree, &Record) -> Option<Category> + Sync,
{
    fn predict(&self, tree: &Tree, record: &Record) -> Option<Category> {
        self(tree, record)
    }
}

/// Vote tally of a forest prediction.
///
/// Categories appear in the order their first vote was cast (tree order).
/// Trees that produced no category are counted as undecided, so
/// [`Votes::total`] always equals the number of trees consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Votes {
    tally: Vec<(Category, usize)>,
    undecided: usize,
}

impl Votes {
    /// Record one tree's prediction.
    pub fn cast(&mut self, prediction: Option<Category>) {
        let Some(category) = prediction else {
            self.undecided += 1;
            return;
        };
        match self.tally.iter_mut().find(|(c, _)| *c == category) {
            Some((_, n)) => *n += 1,
            None => self.tally.push((category, 1)),
        }
    }

    /// Number of votes for `category`.
    #[must_use]
    pub fn get(&self, category: &str) -> usize {
        self.tally
            .iter()
            .find(|(c, _)| c.as_str() == category)
            .map_or(0, |&(_, n)| n)
    }

    /// Iterate over `(category, votes)` in first-vote order.
    pub fn iter(&self) -> impl Iterator<Item = (&Category, usize)> {
        self.tally.iter().map(|(c, n)| (c, *n))
    }

    /// Number of distinct categories voted for.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tally.len()
    }

    /// Return `true` if no tree voted for any category.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tally.is_empty()
    }

    /// Number of trees that produced no category.
    #[must_use]
    pub fn undecided(&self) -> usize {
        self.undecided
    }

    /// Total number of trees consulted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.tally.iter().map(|(_, n)| n).sum::<usize>() + self.undecided
    }

    /// The category with the most votes; the earliest-voted category wins ties.
    #[must_use]
    pub fn winner(&self) -> Option<&Category> {
        let mut best: Option<(&Category, usize)> = None;
        for (category, n) in self.iter() {
            if best.is_none_or(|(_, best_n)| n > best_n) {
                best = Some((category, n));
            }
        }
        best.map(|(category, _)| category)
    }

    /// Fraction of all trees that voted for `category`. Zero for an empty tally.
    #[must_use]
    pub fn share(&self, category: &str) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.get(category) as f64 / total as f64,
        }
    }
}

impl FromIterator<Option<Category>> for Votes {
    fn from_iter<I: IntoIterator<Item = Option<Category>>>(iter: I) -> Self {
        let mut votes = Votes::default();
        for prediction in iter {
            votes.cast(prediction);
        }
        votes
    }
}

/// Majority-vote predictor over a forest.
///
/// Trees are evaluated in parallel; votes are tallied in tree order.
#[derive(Debug, Clone)]
pub struct ForestPredictor<'f, P = Traversal> {
    forest: &'f RandomForest,
    predictor: P,
}

impl<'f> ForestPredictor<'f, Traversal> {
    /// Create a predictor that traverses each tree.
    #[must_use]
    pub fn new(forest: &'f RandomForest) -> Self {
        Self {
            forest,
            predictor: Traversal,
        }
    }
}

impl<'f, P: TreePredictor> ForestPredictor<'f, P> {
    /// Create a predictor with a custom per-tree strategy.
    #[must_use]
    pub fn with_predictor(forest: &'f RandomForest, predictor: P) -> Self {
        Self { forest, predictor }
    }

    /// Tally every tree's prediction for `record`.
    #[must_use]
    pub fn predict(&self, record: &Record) -> Votes {
        let predictions: Vec<Option<Category>> = self
            .forest
            .trees
            .par_iter()
            .map(|tree| self.predictor.predict(tree, record))
            .collect();
        predictions.into_iter().collect()
    }

    /// Tally predictions for a batch of records in parallel.
    #[must_use]
    pub fn predict_batch(&self, records: &[Record]) -> Vec<Votes> {
        records
            .into_par_iter()
            .map(|record| self.predict(record))
            .collect()
    }
}

impl RandomForest {
    /// Tally every tree's prediction for `record`.
    #[must_use]
    pub fn predict(&self, record: &Record) -> Votes {
        ForestPredictor::new(self).predict(record)
    }

    /// Tally predictions for a batch of records in parallel.
    #[must_use]
    pub fn predict_batch(&self, records: &[Record]) -> Vec<Votes> {
        ForestPredictor::new(self).predict_batch(records)
    }
}

impl Tree {
    /// Predict a batch of records in parallel.
    #[must_use]
    pub fn predict_batch(&self, records: &[Record]) -> Vec<Option<Category>> {
        records
            .into_par_iter()
            .map(|record| self.predict(record).cloned())
            .collect()
    }
}
