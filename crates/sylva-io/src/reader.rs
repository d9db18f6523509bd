//! Record reader for JSON and CSV data files.

use std::path::{Path, PathBuf};

use sylva_forest::{Record, Value};
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::DataFormat;

/// Reads schemaless records from a `.json` or `.csv` file.
///
/// JSON files hold an array of flat objects; `null` members are treated as
/// absent. CSV files need a header row naming the attributes. Each cell is
/// typed on its own:
///
/// | Cell | Attribute |
/// |---|---|
/// | empty | absent |
/// | `true` / `false` | boolean |
/// | matches `^[+-]?\d+(\.\d+)?$` | number |
/// | anything else | text |
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::UnsupportedFormat`] | Extension is neither `.json` nor `.csv` |
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::JsonParse`] | JSON is not an array of flat objects |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::EmptyDataset`] | Zero records |
pub struct RecordReader {
    path: PathBuf,
}

impl RecordReader {
    /// Create a new reader for the given file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the file, returning its records in file order.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<Record>, IoError> {
        let format = DataFormat::from_path(&self.path)?;
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let records = match format {
            DataFormat::Json => self.read_json(file)?,
            DataFormat::Csv => self.read_csv(file)?,
        };

        if records.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(n_records = records.len(), ?format, "records loaded");
        Ok(records)
    }

    fn read_json(&self, file: std::fs::File) -> Result<Vec<Record>, IoError> {
        serde_json::from_reader(std::io::BufReader::new(file)).map_err(|e| IoError::JsonParse {
            path: self.path.clone(),
            line: e.line(),
            source: e,
        })
    }

    fn read_csv(&self, file: std::fs::File) -> Result<Vec<Record>, IoError> {
        // flexible(true) so that our own InconsistentRowLength check fires
        // instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header: Vec<String> = rdr
            .headers()
            .map_err(|e| self.csv_error(e))?
            .iter()
            .map(String::from)
            .collect();
        debug!(n_columns = header.len(), "read CSV header");

        let mut records = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let row = result.map_err(|e| self.csv_error(e))?;
            if row.len() != header.len() {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: header.len(),
                    got: row.len(),
                });
            }
            let record: Record = header
                .iter()
                .zip(row.iter())
                .filter_map(|(name, cell)| parse_cell(cell).map(|v| (name.as_str(), v)))
                .collect();
            records.push(record);
        }
        Ok(records)
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

/// Type one CSV cell; `None` for an empty cell.
fn parse_cell(cell: &str) -> Option<Value> {
    match cell {
        "" => None,
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        _ => {
            let text = Value::from(cell);
            Some(text.as_decimal().map_or(text, Value::Number))
        }
    }
}
