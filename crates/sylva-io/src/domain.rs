//! Domain types for sylva-io.

use std::path::Path;

use serde::Serialize;
use sylva_forest::{Category, Record, Votes};

use crate::IoError;

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// On-disk layout of a record file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// A JSON array of flat objects.
    Json,
    /// A CSV file whose header names the attributes.
    Csv,
}

impl DataFormat {
    /// Detect the format from the file extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(DataFormat::Json),
            Some("csv") => Ok(DataFormat::Csv),
            _ => Err(IoError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// One record's prediction, with the known label when the record has one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionEntry {
    /// Zero-based position of the record in the input.
    pub index: usize,
    /// Majority category, if any tree decided.
    pub winner: Option<String>,
    /// The record's own category value, if present.
    pub actual: Option<String>,
    /// `(category, votes)` in first-vote order.
    pub votes: Vec<(String, usize)>,
    /// Trees that produced no category.
    pub undecided: usize,
}

/// Predictions for a batch of records, with accuracy over labelled records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    category_key: String,
    n_records: usize,
    n_labelled: usize,
    n_correct: usize,
    accuracy: Option<f64>,
    predictions: Vec<PredictionEntry>,
}

impl PredictionReport {
    /// Build a report from the tallies of `records`, in order.
    ///
    /// Records carrying `category_key` count toward accuracy: a record is
    /// correct when its category equals the winning vote.
    #[must_use]
    pub fn new(category_key: &str, records: &[Record], votes: &[Votes]) -> Self {
        debug_assert_eq!(records.len(), votes.len(), "one tally per record");

        let mut n_labelled = 0;
        let mut n_correct = 0;
        let predictions: Vec<PredictionEntry> = records
            .iter()
            .zip(votes)
            .enumerate()
            .map(|(index, (record, votes))| {
                let actual = record.get(category_key).map(Category::from);
                let winner = votes.winner();
                if let Some(actual) = &actual {
                    n_labelled += 1;
                    if winner == Some(actual) {
                        n_correct += 1;
                    }
                }
                PredictionEntry {
                    index,
                    winner: winner.map(ToString::to_string),
                    actual: actual.map(|c| c.to_string()),
                    votes: votes.iter().map(|(c, n)| (c.to_string(), n)).collect(),
                    undecided: votes.undecided(),
                }
            })
            .collect();

        let accuracy = (n_labelled > 0).then(|| n_correct as f64 / n_labelled as f64);

        Self {
            category_key: category_key.to_string(),
            n_records: predictions.len(),
            n_labelled,
            n_correct,
            accuracy,
            predictions,
        }
    }

    /// Return the category key the predictions are for.
    #[must_use]
    pub fn category_key(&self) -> &str {
        &self.category_key
    }

    /// Return the number of records predicted.
    #[must_use]
    pub fn n_records(&self) -> usize {
        self.n_records
    }

    /// Return the number of records that carried the category key.
    #[must_use]
    pub fn n_labelled(&self) -> usize {
        self.n_labelled
    }

    /// Return the number of labelled records predicted correctly.
    #[must_use]
    pub fn n_correct(&self) -> usize {
        self.n_correct
    }

    /// Fraction of labelled records predicted correctly; `None` without labels.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    /// Return the per-record predictions.
    #[must_use]
    pub fn predictions(&self) -> &[PredictionEntry] {
        &self.predictions
    }
}
