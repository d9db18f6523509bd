use std::fmt;

use crate::value::{Record, Value};

/// Comparison applied between a record's attribute and a node's pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Operator {
    /// Loose equality, used for categorical pivots.
    #[serde(rename = "==")]
    Equal,
    /// Numeric `>=`, used for decimal pivots.
    #[serde(rename = ">=")]
    GreaterOrEqual,
}

impl Operator {
    /// Evaluate the comparison. An absent attribute never holds.
    #[must_use]
    pub fn holds(self, value: Option<&Value>, pivot: &Value) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            Operator::Equal => value.loosely_equals(pivot),
            Operator::GreaterOrEqual => match (value.to_number(), pivot.to_number()) {
                (Some(v), Some(p)) => v >= p,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::Equal => "==",
            Operator::GreaterOrEqual => ">=",
        })
    }
}

/// A predicted class label.
///
/// Holds the rendered form of a category-key value, so the numeric label `1`
/// and the text label `"1"` are the same category.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Return the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&Value> for Category {
    fn from(value: &Value) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fitted decision tree: either an interior split or a terminal leaf.
///
/// Each child is owned by exactly one parent, so the value is a finite,
/// acyclic binary tree that serializes as nested JSON.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tree {
    /// An interior split node.
    Node {
        /// Attribute tested at this node.
        attribute: String,
        /// Comparison applied to the attribute.
        operator: Operator,
        /// Value the attribute is compared against.
        pivot: Value,
        /// Subtree for records where the comparison holds.
        matched: Box<Tree>,
        /// Subtree for records where it does not.
        unmatched: Box<Tree>,
    },
    /// A terminal leaf.
    Leaf {
        /// Most frequent label among the leaf's training records; `None` when
        /// the leaf was built from no records at all.
        category: Option<Category>,
    },
}

impl Tree {
    /// Classify one record.
    ///
    /// Descends from the root: at each node the stored comparison is applied
    /// to the record's attribute, going to `matched` when it holds and to
    /// `unmatched` otherwise (including when the attribute is absent).
    #[must_use]
    pub fn predict(&self, record: &Record) -> Option<&Category> {
        let mut current = self;
        loop {
            match current {
                Tree::Leaf { category } => return category.as_ref(),
                Tree::Node {
                    attribute,
                    operator,
                    pivot,
                    matched,
                    unmatched,
                } => {
                    current = if operator.holds(record.get(attribute), pivot) {
                        matched.as_ref()
                    } else {
                        unmatched.as_ref()
                    };
                }
            }
        }
    }

    /// Return `true` if this tree is a single leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Tree::Leaf { .. })
    }

    /// Return the leaf category, or `None` for interior nodes and empty leaves.
    #[must_use]
    pub fn category(&self) -> Option<&Category> {
        match self {
            Tree::Leaf { category } => category.as_ref(),
            Tree::Node { .. } => None,
        }
    }

    /// Return the total number of nodes (splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        match self {
            Tree::Leaf { .. } => 1,
            Tree::Node {
                matched, unmatched, ..
            } => 1 + matched.n_nodes() + unmatched.n_nodes(),
        }
    }

    /// Return the number of leaves.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        match self {
            Tree::Leaf { .. } => 1,
            Tree::Node {
                matched, unmatched, ..
            } => matched.n_leaves() + unmatched.n_leaves(),
        }
    }

    /// Return the maximum depth. A single leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Tree::Leaf { .. } => 0,
            Tree::Node {
                matched, unmatched, ..
            } => 1 + matched.depth().max(unmatched.depth()),
        }
    }
}

impl fmt::Display for Tree {
    /// Render the tree as an indented outline, one line per node.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn walk(tree: &Tree, indent: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match tree {
                Tree::Leaf { category: Some(c) } => writeln!(f, "{:indent$}-> {c}", ""),
                Tree::Leaf { category: None } => writeln!(f, "{:indent$}-> (none)", ""),
                Tree::Node {
                    attribute,
                    operator,
                    pivot,
                    matched,
                    unmatched,
                } => {
                    writeln!(f, "{:indent$}{attribute} {operator} {pivot}", "")?;
                    walk(matched, indent + 2, f)?;
                    writeln!(f, "{:indent$}else", "")?;
                    walk(unmatched, indent + 2, f)
                }
            }
        }
        walk(self, 0, f)
    }
}
