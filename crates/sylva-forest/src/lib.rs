//! Information-gain decision trees and round-robin random forests.
//!
//! Trees are grown greedily over schemaless records: every observed
//! `(attribute, value)` pair is a candidate split (`>=` for decimal values,
//! `==` otherwise) and the one with the highest information gain wins. A
//! forest partitions the training set round-robin, fits one tree per bucket
//! in parallel via rayon, and predicts by tallying the trees' votes.

mod entropy;
mod error;
mod forest;
mod node;
mod predict;
mod serialize;
mod split;
mod tree;
mod value;

pub use entropy::{entropy, information_gain};
pub use error::ForestError;
pub use forest::{DEFAULT_N_TREES, RandomForest, RandomForestConfig};
pub use node::{Category, Operator, Tree};
pub use predict::{ForestPredictor, Traversal, TreePredictor, Votes};
pub use serialize::{FORMAT_VERSION, Model};
pub use tree::DecisionTreeConfig;
pub use value::{Record, Value};
