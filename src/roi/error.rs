use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading ROI label definitions
#[derive(Error, Debug, Clone)]
pub enum RoiError {
    #[error("CSV error in {path}: {message}")]
    Csv { path: PathBuf, message: String },
    /// A label cell is not an integer
    #[error("Invalid label {value:?} for ROI on row {row} of {path}")]
    InvalidLabel {
        path: PathBuf,
        row: usize,
        value: String,
    },
    #[error("No ROI definitions found in {path}")]
    EmptyDefinition { path: PathBuf },
}
