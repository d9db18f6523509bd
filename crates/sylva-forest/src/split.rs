use std::collections::HashSet;

use crate::entropy::information_gain;
use crate::node::Operator;
use crate::value::{Record, Value};

/// Gains within this margin of the current best count as ties, so rounding
/// noise never turns a zero-gain split into a winner.
const GAIN_TOLERANCE: f64 = 1e-12;

/// The winning candidate of one node's split search.
#[derive(Debug, Clone)]
pub(crate) struct Split {
    /// Attribute the split tests.
    pub(crate) attribute: String,
    /// Comparison used by the split.
    pub(crate) operator: Operator,
    /// Value the attribute is compared against.
    pub(crate) pivot: Value,
    /// Records for which the comparison holds.
    pub(crate) matched: Vec<Record>,
    /// Records for which it does not.
    pub(crate) unmatched: Vec<Record>,
    /// Information gain of the split; always above [`GAIN_TOLERANCE`].
    pub(crate) gain: f64,
}

/// Identity of a candidate for deduplication: `(attribute, operator, pivot)`.
#[derive(Debug, PartialEq, Eq, Hash)]
enum PivotKey {
    Bool(bool),
    Number(u64),
    Text(String),
}

impl PivotKey {
    fn of(pivot: &Value) -> Self {
        match pivot {
            Value::Bool(b) => PivotKey::Bool(*b),
            // -0.0 and 0.0 compare equal, so they are one candidate.
            Value::Number(n) if *n == 0.0 => PivotKey::Number(0f64.to_bits()),
            Value::Number(n) => PivotKey::Number(n.to_bits()),
            Value::Text(s) => PivotKey::Text(s.clone()),
        }
    }
}

/// Turn an observed attribute value into a candidate `(operator, pivot)`.
///
/// Decimal-looking values become numeric `>=` pivots, everything else an
/// equality pivot on the raw value.
pub(crate) fn candidate_for(value: &Value) -> (Operator, Value) {
    match value.as_decimal() {
        Some(n) => (Operator::GreaterOrEqual, Value::Number(n)),
        None => (Operator::Equal, value.clone()),
    }
}

/// Search every `(attribute, operator, pivot)` candidate drawn from `records`
/// and return the one with the highest positive information gain.
///
/// Candidates are enumerated record by record, attribute by attribute, in
/// order; the category key is never a candidate. Each distinct candidate is
/// scored once. On equal gains (within [`GAIN_TOLERANCE`]) the earliest
/// candidate wins.
///
/// Returns `None` when no candidate has positive gain.
pub(crate) fn find_best_split(
    records: &[Record],
    category_key: &str,
    parent_entropy: f64,
) -> Option<Split> {
    let mut seen: HashSet<(&str, Operator, PivotKey)> = HashSet::new();
    let mut best_gain = 0.0f64;
    let mut best: Option<(&str, Operator, Value)> = None;

    for record in records {
        for (attribute, value) in record.iter() {
            if attribute == category_key {
                continue;
            }
            let (operator, pivot) = candidate_for(value);
            if !seen.insert((attribute, operator, PivotKey::of(&pivot))) {
                continue;
            }

            let (matched, unmatched): (Vec<&Record>, Vec<&Record>) = records
                .iter()
                .partition(|r| operator.holds(r.get(attribute), &pivot));
            let gain = information_gain(parent_entropy, &matched, &unmatched, category_key);

            if gain > best_gain + GAIN_TOLERANCE {
                best_gain = gain;
                best = Some((attribute, operator, pivot));
            }
        }
    }

    let (attribute, operator, pivot) = best?;
    let (matched, unmatched): (Vec<Record>, Vec<Record>) = records
        .iter()
        .cloned()
        .partition(|r| operator.holds(r.get(attribute), &pivot));

    Some(Split {
        attribute: attribute.to_string(),
        operator,
        pivot,
        matched,
        unmatched,
        gain: best_gain,
    })
}
