use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or parsing a frame timing table
#[derive(Error, Debug, Clone)]
pub enum TimingError {
    /// The table could not be parsed into at least four numeric columns
    #[error("Malformed timing table {path}: {reason}")]
    MalformedTimingTable { path: PathBuf, reason: String },
    /// Two rows share the same frame index
    #[error("Duplicate frame index {frame} in timing table")]
    DuplicateFrame { frame: usize },
    /// Start times decrease once rows are sorted by frame index
    #[error("Frame {frame} starts at {start} before the previous frame ({previous})")]
    UnorderedFrames { frame: usize, start: f64, previous: f64 },
    /// `stop != start + duration`; only an error in strict mode
    #[error("Frame {frame}: stop {stop} differs from start + duration ({expected})")]
    StopMismatch { frame: usize, stop: f64, expected: f64 },
    #[error("CSV error in {path}: {message}")]
    Csv { path: PathBuf, message: String },
}

impl TimingError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        TimingError::MalformedTimingTable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, err: impl ToString) -> Self {
        TimingError::Csv {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
