use std::path::PathBuf;

/// Errors from tree and forest fitting and model persistence.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when the forest size is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when the entropy threshold is negative or NaN.
    #[error("entropy_threshold must be a non-negative number, got {threshold}")]
    InvalidEntropyThreshold {
        /// The invalid threshold provided.
        threshold: f64,
    },

    /// Returned when the category key is also listed as an ignored key.
    #[error("category key \"{category_key}\" is listed among the ignored keys")]
    CategoryKeyIgnored {
        /// The category key.
        category_key: String,
    },

    /// Returned when a training record has no value for the category key.
    #[error("record {record_index} has no value for category key \"{category_key}\"")]
    MissingCategory {
        /// The zero-based index of the offending record.
        record_index: usize,
        /// The category key that was looked up.
        category_key: String,
    },

    /// Returned when model serialization fails.
    #[error("failed to serialize model")]
    SerializeModel {
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when model deserialization fails.
    #[error("failed to deserialize model from {path}")]
    DeserializeModel {
        /// Path to the model file that could not be deserialized.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when writing the model file fails.
    #[error("failed to write model to {path}")]
    WriteModel {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when reading the model file fails.
    #[error("failed to read model from {path}")]
    ReadModel {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when loading a model with an incompatible format version.
    #[error("incompatible model version in {path}: expected {expected}, found {found}")]
    IncompatibleModelVersion {
        /// The model format version this build expects.
        expected: u32,
        /// The model format version found in the file.
        found: u32,
        /// Path to the model file with the incompatible version.
        path: PathBuf,
    },
}
