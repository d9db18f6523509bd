//! Label distributions, Shannon entropy and information gain.

use std::borrow::Borrow;

use crate::node::Category;
use crate::value::Record;

/// Per-label record counts for one record set.
///
/// Records are visited from the last to the first, and labels are kept in the
/// order they are first seen during that walk.
#[derive(Debug, Clone, Default)]
pub(crate) struct LabelCounts {
    counts: Vec<(Category, usize)>,
    total: usize,
}

impl LabelCounts {
    /// Count the values of `category_key` across `records`.
    ///
    /// Records lacking the key do not contribute.
    pub(crate) fn from_records<R: Borrow<Record>>(records: &[R], category_key: &str) -> Self {
        let mut label_counts = Self::default();
        for record in records.iter().rev() {
            if let Some(value) = record.borrow().get(category_key) {
                label_counts.add(Category::from(value));
            }
        }
        label_counts
    }

    fn add(&mut self, category: Category) {
        self.total += 1;
        match self.counts.iter_mut().find(|(c, _)| *c == category) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((category, 1)),
        }
    }

    /// The label with the highest count; the earliest-seen label wins ties.
    pub(crate) fn most_frequent(&self) -> Option<&Category> {
        let mut best: Option<(&Category, usize)> = None;
        for (category, n) in &self.counts {
            if best.is_none_or(|(_, best_n)| *n > best_n) {
                best = Some((category, *n));
            }
        }
        best.map(|(category, _)| category)
    }

    /// Shannon entropy `-Σ p·ln(p)` in nats. Zero for zero or one label.
    pub(crate) fn entropy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let n = self.total as f64;
        self.counts
            .iter()
            .map(|&(_, c)| {
                let p = c as f64 / n;
                -p * p.ln()
            })
            .sum()
    }
}

/// Entropy of the `category_key` label distribution in `records`.
#[must_use]
pub fn entropy<R: Borrow<Record>>(records: &[R], category_key: &str) -> f64 {
    LabelCounts::from_records(records, category_key).entropy()
}

/// Information gain of splitting a parent set into `matched` and `unmatched`.
///
/// `parent_entropy - (H(matched)·|matched| + H(unmatched)·|unmatched|) / n_parent`.
/// May be zero or negative. Returns 0 for an empty parent.
#[must_use]
pub fn information_gain<R: Borrow<Record>>(
    parent_entropy: f64,
    matched: &[R],
    unmatched: &[R],
    category_key: &str,
) -> f64 {
    let n = matched.len() + unmatched.len();
    if n == 0 {
        return 0.0;
    }
    let weighted = entropy(matched, category_key) * matched.len() as f64
        + entropy(unmatched, category_key) * unmatched.len() as f64;
    parent_entropy - weighted / n as f64
}
