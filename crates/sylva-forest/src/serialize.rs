//! Model serialization and deserialization via serde_json.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::ForestError;
use crate::forest::RandomForest;
use crate::node::Tree;
use crate::predict::Votes;
use crate::value::Record;

/// Current model file format version.
pub const FORMAT_VERSION: u32 = 1;

/// A fitted model: a single decision tree or a forest.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Model {
    /// A single decision tree.
    Tree {
        /// Attribute the tree predicts.
        category_key: String,
        /// The fitted tree.
        tree: Tree,
    },
    /// A random forest.
    Forest(RandomForest),
}

/// Versioned envelope for the serialized model.
#[derive(serde::Serialize, serde::Deserialize)]
struct ModelEnvelope {
    /// Format version for compatibility checking.
    format_version: u32,
    /// Attribute the model predicts.
    category_key: String,
    /// Number of trees in the model.
    n_trees: usize,
    /// The serialized model.
    model: Model,
}

/// Only the version field, read before the full envelope.
#[derive(serde::Deserialize)]
struct VersionProbe {
    format_version: u32,
}

impl Model {
    /// Wrap a fitted tree.
    #[must_use]
    pub fn from_tree(tree: Tree, category_key: impl Into<String>) -> Self {
        Model::Tree {
            category_key: category_key.into(),
            tree,
        }
    }

    /// Return the attribute the model predicts.
    #[must_use]
    pub fn category_key(&self) -> &str {
        match self {
            Model::Tree { category_key, .. } => category_key,
            Model::Forest(forest) => forest.category_key(),
        }
    }

    /// Return the number of trees: 1 for a single tree.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        match self {
            Model::Tree { .. } => 1,
            Model::Forest(forest) => forest.n_trees(),
        }
    }

    /// Tally the model's prediction for `record`. A single tree casts one vote.
    #[must_use]
    pub fn predict(&self, record: &Record) -> Votes {
        match self {
            Model::Tree { tree, .. } => std::iter::once(tree.predict(record).cloned()).collect(),
            Model::Forest(forest) => forest.predict(record),
        }
    }

    /// Tally predictions for a batch of records.
    #[must_use]
    pub fn predict_batch(&self, records: &[Record]) -> Vec<Votes> {
        match self {
            Model::Tree { tree, .. } => tree
                .predict_batch(records)
                .into_iter()
                .map(|prediction| std::iter::once(prediction).collect())
                .collect(),
            Model::Forest(forest) => forest.predict_batch(records),
        }
    }

    /// Save the model to a JSON file wrapped in a versioned envelope.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::SerializeModel`] | JSON encoding failed |
    /// | [`ForestError::WriteModel`] | file write failed |
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ForestError> {
        let path = path.as_ref();

        let envelope = ModelEnvelope {
            format_version: FORMAT_VERSION,
            category_key: self.category_key().to_string(),
            n_trees: self.n_trees(),
            model: self.clone(),
        };

        let bytes = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| ForestError::SerializeModel { source: e })?;

        std::fs::write(path, &bytes).map_err(|e| ForestError::WriteModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(
            size_bytes = bytes.len(),
            n_trees = self.n_trees(),
            "model saved"
        );

        Ok(())
    }

    /// Load a model from a JSON file.
    ///
    /// The format version is checked before the model body is decoded.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::ReadModel`] | file read failed |
    /// | [`ForestError::DeserializeModel`] | JSON decoding failed |
    /// | [`ForestError::IncompatibleModelVersion`] | format version mismatch |
    #[instrument(fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ForestError> {
        let path = path.as_ref();

        let bytes = std::fs::read(path).map_err(|e| ForestError::ReadModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        let probe: VersionProbe =
            serde_json::from_slice(&bytes).map_err(|e| ForestError::DeserializeModel {
                path: path.to_path_buf(),
                source: e,
            })?;
        if probe.format_version != FORMAT_VERSION {
            return Err(ForestError::IncompatibleModelVersion {
                expected: FORMAT_VERSION,
                found: probe.format_version,
                path: path.to_path_buf(),
            });
        }

        let envelope: ModelEnvelope =
            serde_json::from_slice(&bytes).map_err(|e| ForestError::DeserializeModel {
                path: path.to_path_buf(),
                source: e,
            })?;

        debug!(
            n_trees = envelope.n_trees,
            category_key = %envelope.category_key,
            "model loaded"
        );

        Ok(envelope.model)
    }
}

impl From<RandomForest> for Model {
    fn from(forest: RandomForest) -> Self {
        Model::Forest(forest)
    }
}
