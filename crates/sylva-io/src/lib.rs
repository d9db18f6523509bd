//! File I/O, validation, and serialization for the sylva pipeline.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{DataFormat, ExperimentName, PredictionEntry, PredictionReport};
pub use error::IoError;
pub use reader::RecordReader;
pub use writer::ResultWriter;
