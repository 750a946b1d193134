use std::path::PathBuf;

use thiserror::Error;

use crate::roi::RoiError;
use crate::timing::TimingError;

#[derive(Error, Debug)]
pub enum PetgaError {
    /// Two arrays that must agree in shape do not
    #[error("Shape mismatch in {context}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        context: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    /// A masked per-frame mean had no qualifying voxels
    #[error("Mask has no qualifying voxels in frame {frame} ({context})")]
    EmptyMask { context: String, frame: usize },
    #[error("Invalid parameter: {param} = {value}")]
    InvalidParameter { param: String, value: String },
    #[error("Time points must be non-decreasing (index {index})")]
    InvalidTimeSequence { index: usize },
    #[error(transparent)]
    Timing(#[from] TimingError),
    #[error(transparent)]
    Roi(#[from] RoiError),
    #[error("NIfTI error in {path}: {source}")]
    Nifti {
        path: PathBuf,
        #[source]
        source: nifti::NiftiError,
    },
    #[error("I/O error in {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error in {path}: {message}")]
    Csv { path: PathBuf, message: String },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PetgaError {
    pub(crate) fn shape_mismatch(
        context: impl Into<String>,
        expected: &[usize],
        found: &[usize],
    ) -> Self {
        PetgaError::ShapeMismatch {
            context: context.into(),
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }

    pub(crate) fn invalid_parameter(param: impl Into<String>, value: impl ToString) -> Self {
        PetgaError::InvalidParameter {
            param: param.into(),
            value: value.to_string(),
        }
    }
}
