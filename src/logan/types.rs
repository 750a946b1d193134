//! Logan analysis types: options, per-voxel fits and run summaries

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PetgaError;

// ============================================================================
// Configuration
// ============================================================================

/// Logan analysis configuration
///
/// Loaded from JSON or built with the `with_*` methods.
///
/// ```rust
/// use petga::logan::LoganOptions;
///
/// let options = LoganOptions::default().with_k2ref(0.2).with_window(40.0, 90.0);
/// assert_eq!(options.k2ref, 0.2);
/// assert_eq!(options.window, (40.0, 90.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoganOptions {
    /// Reference-region efflux rate constant, per minute (default: 0.15)
    pub k2ref: f64,
    /// Steady-state window `(start, end)` in minutes, inclusive (default: 35-90)
    pub window: (f64, f64),
    /// Draw a progress bar during the voxel regression
    pub show_progress: bool,
    /// Regress voxels on the rayon thread pool
    pub parallel: bool,
}

impl Default for LoganOptions {
    fn default() -> Self {
        Self {
            k2ref: 0.15,
            window: (35.0, 90.0),
            show_progress: false,
            parallel: true,
        }
    }
}

impl LoganOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from a JSON file; missing fields take their defaults
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self, PetgaError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PetgaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let options: Self = serde_json::from_str(&text).map_err(|source| PetgaError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        options.validate()?;
        Ok(options)
    }

    pub fn with_k2ref(mut self, k2ref: f64) -> Self {
        self.k2ref = k2ref;
        self
    }

    pub fn with_window(mut self, start: f64, end: f64) -> Self {
        self.window = (start, end);
        self
    }

    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    /// Run the regression on the calling thread only
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn validate(&self) -> Result<(), PetgaError> {
        if !(self.k2ref.is_finite() && self.k2ref > 0.0) {
            return Err(PetgaError::invalid_parameter("k2ref", self.k2ref));
        }
        let (start, end) = self.window;
        if !(start.is_finite() && end.is_finite()) || start > end {
            return Err(PetgaError::invalid_parameter(
                "window",
                format!("({}, {})", start, end),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Regression results
// ============================================================================

/// Ordinary least squares fit of `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Logan slope (DVR under the bound-compartment convention)
    pub slope: f64,
    pub intercept: f64,
    /// Residual sum of squares; `None` with zero residual degrees of freedom
    pub residual: Option<f64>,
    /// Number of windowed points used
    pub n_points: usize,
}

impl RegressionResult {
    /// The zero triple reported for voxels without usable signal
    pub const NO_SIGNAL: RegressionResult = RegressionResult {
        slope: 0.0,
        intercept: 0.0,
        residual: Some(0.0),
        n_points: 0,
    };
}

/// Outcome of regressing a single voxel (or region)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VoxelFit {
    Fitted(RegressionResult),
    /// Empty window, or all windowed x or y exactly zero
    NoSignal,
}

impl VoxelFit {
    pub fn result(&self) -> RegressionResult {
        match self {
            VoxelFit::Fitted(r) => *r,
            VoxelFit::NoSignal => RegressionResult::NO_SIGNAL,
        }
    }

    pub fn slope(&self) -> f64 {
        self.result().slope
    }

    /// Residual sum of squares, zero when unavailable
    pub fn residual(&self) -> f64 {
        self.result().residual.unwrap_or(0.0)
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self, VoxelFit::Fitted(_))
    }
}

/// Regional Logan fit for one ROI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalFit {
    pub name: String,
    pub n_voxels: usize,
    pub fit: VoxelFit,
}

// ============================================================================
// Summary
// ============================================================================

/// Counts and parameters describing one voxelwise run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoganSummary {
    /// Voxels passing the tissue validity mask
    pub n_voxels: usize,
    pub n_fitted: usize,
    pub n_no_signal: usize,
    /// Voxels dropped by the transform for a zero denominator
    pub n_degenerate: usize,
    /// Number of Logan columns inside the steady-state window
    pub window_frames: usize,
    pub k2ref: f64,
    pub window: (f64, f64),
    /// Timing integrity warnings carried by the frame table
    pub timing_warnings: Vec<String>,
}

impl fmt::Display for LoganSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Logan analysis")?;
        writeln!(f, "  k2ref:          {:.4} /min", self.k2ref)?;
        writeln!(
            f,
            "  window:         {}-{} min ({} frames)",
            self.window.0, self.window.1, self.window_frames
        )?;
        writeln!(f, "  voxels:         {}", self.n_voxels)?;
        writeln!(f, "  fitted:         {}", self.n_fitted)?;
        writeln!(f, "  no signal:      {}", self.n_no_signal)?;
        write!(f, "  degenerate:     {}", self.n_degenerate)?;
        for w in &self.timing_warnings {
            write!(f, "\n  warning:        {}", w)?;
        }
        Ok(())
    }
}
