//! JSON result writer for trained models and predictions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sylva_forest::Model;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{ExperimentName, PredictionEntry, PredictionReport};

/// Writes model and prediction artifacts to an output directory.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_model.json` and
/// `{experiment}_predictions.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Return the path of the model artifact, `{output_dir}/{experiment}_model.json`.
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_model.json", self.experiment.as_str()))
    }

    /// Return the path of the predictions artifact.
    #[must_use]
    pub fn predictions_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_predictions.json", self.experiment.as_str()))
    }

    /// Save `model` to [`Self::model_path`] and return that path.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::SaveModel`] if the model cannot be encoded or written.
    #[instrument(skip_all)]
    pub fn write_model(&self, model: &Model) -> Result<PathBuf, IoError> {
        let path = self.model_path();
        model
            .save(&path)
            .map_err(|e| IoError::SaveModel { source: e })?;
        Ok(path)
    }

    /// Write a prediction report to `{experiment}_predictions.json`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::SerializeResult`] | JSON encoding failed |
    /// | [`IoError::WriteFile`] | file write failed |
    #[instrument(skip_all, fields(n_records = report.n_records()))]
    pub fn write_predictions(&self, report: &PredictionReport) -> Result<PathBuf, IoError> {
        let path = self.predictions_path();

        let artifact = PredictArtifact {
            experiment: self.experiment.as_str(),
            category_key: report.category_key(),
            n_records: report.n_records(),
            n_labelled: report.n_labelled(),
            accuracy: report.accuracy(),
            predictions: report.predictions(),
        };

        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::SerializeResult {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "predictions written");
        Ok(path)
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct PredictArtifact<'a> {
    experiment: &'a str,
    category_key: &'a str,
    n_records: usize,
    n_labelled: usize,
    accuracy: Option<f64>,
    predictions: &'a [PredictionEntry],
}
