//! I/O error types for sylva-io.

use std::path::PathBuf;

/// Errors from record loading, result writing, and model persistence.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the file extension is neither `.json` nor `.csv`.
    #[error("unsupported data format for {path}: expected a .json or .csv file")]
    UnsupportedFormat {
        /// Path whose extension was not recognised.
        path: PathBuf,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a JSON data file is not an array of flat objects.
    #[error("JSON parse error in {path} at line {line}")]
    JsonParse {
        /// Path to the JSON file.
        path: PathBuf,
        /// One-based line where the error occurred.
        line: usize,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when the file holds no records.
    #[error("empty dataset (no records) in {path}")]
    EmptyDataset {
        /// Path to the data file.
        path: PathBuf,
    },

    /// Returned when a CSV data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result artifact cannot be encoded.
    #[error("cannot serialize result for {path}")]
    SerializeResult {
        /// Path the artifact was destined for.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when saving the model artifact fails.
    #[error("cannot save model")]
    SaveModel {
        /// Underlying model persistence error.
        source: sylva_forest::ForestError,
    },
}
