//! Steady-state window selection and per-voxel least squares

use indicatif::{ProgressBar, ProgressStyle};
use ndarray::ArrayView1;
use rayon::prelude::*;

use super::transform::LoganCoordinates;
use super::types::{LoganOptions, RegressionResult, VoxelFit};
use crate::error::PetgaError;
use crate::timing::{FrameTimeTable, TimeUnit};

// ============================================================================
// Window selection
// ============================================================================

/// Logan columns used for the regression, shared by every voxel
#[derive(Debug, Clone, PartialEq)]
pub struct SteadyStateWindow {
    columns: Vec<usize>,
    n_columns: usize,
}

impl SteadyStateWindow {
    /// Select columns whose frame lies within `bounds` (minutes, inclusive)
    ///
    /// Column `j` belongs to frame `j + 1`: it is selected when that frame
    /// starts at or after `bounds.0` and stops at or before `bounds.1`.
    pub fn select(table: &FrameTimeTable, bounds: (f64, f64)) -> Result<Self, PetgaError> {
        let (start, end) = bounds;
        if !(start.is_finite() && end.is_finite()) || start > end {
            return Err(PetgaError::invalid_parameter(
                "window",
                format!("({}, {})", start, end),
            ));
        }

        let starts = table.starts_in(TimeUnit::Minutes);
        let stops = table.stops_in(TimeUnit::Minutes);
        let n_columns = table.len().saturating_sub(1);
        let columns = (0..n_columns)
            .filter(|&j| starts[j + 1] >= start && stops[j + 1] <= end)
            .collect();

        Ok(Self { columns, n_columns })
    }

    /// Window covering all `n_columns` columns
    pub fn full(n_columns: usize) -> Self {
        Self {
            columns: (0..n_columns).collect(),
            n_columns,
        }
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Total number of Logan columns the window was selected from
    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Boolean column mask of length [`n_columns`](Self::n_columns)
    pub fn mask(&self) -> Vec<bool> {
        let mut mask = vec![false; self.n_columns];
        for &j in &self.columns {
            mask[j] = true;
        }
        mask
    }
}

// ============================================================================
// Least squares
// ============================================================================

/// Least squares fit of `y = slope * x + intercept`
///
/// Returns `None` for empty input. With a rank-deficient design (one point,
/// or all x equal) the minimum-norm solution is returned; the residual is
/// only reported when there are more points than parameters.
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<RegressionResult> {
    let n = x.len().min(y.len());
    if n == 0 {
        return None;
    }
    let x = &x[..n];
    let y = &y[..n];
    let nf = n as f64;

    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;
    let sxx: f64 = x.iter().map(|xi| (xi - mean_x).powi(2)).sum();
    let sxy: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    let sum_x2: f64 = x.iter().map(|xi| xi * xi).sum();

    if sxx <= nf * f64::EPSILON * sum_x2 {
        // Solutions satisfy mean_x * slope + intercept = mean_y; take the shortest
        let scale = mean_y / (mean_x * mean_x + 1.0);
        return Some(RegressionResult {
            slope: mean_x * scale,
            intercept: scale,
            residual: None,
            n_points: n,
        });
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let residual = if n > 2 {
        Some(
            x.iter()
                .zip(y)
                .map(|(xi, yi)| (yi - (slope * xi + intercept)).powi(2))
                .sum(),
        )
    } else {
        None
    };

    Some(RegressionResult {
        slope,
        intercept,
        residual,
        n_points: n,
    })
}

/// Regress one voxel's Logan row over the window
pub fn fit_voxel(x: ArrayView1<f64>, y: ArrayView1<f64>, window: &SteadyStateWindow) -> VoxelFit {
    if window.is_empty() {
        return VoxelFit::NoSignal;
    }
    let xs: Vec<f64> = window.columns().iter().map(|&j| x[j]).collect();
    let ys: Vec<f64> = window.columns().iter().map(|&j| y[j]).collect();
    if xs.iter().all(|&v| v == 0.0) || ys.iter().all(|&v| v == 0.0) {
        return VoxelFit::NoSignal;
    }
    match fit_line(&xs, &ys) {
        Some(result) => VoxelFit::Fitted(result),
        None => VoxelFit::NoSignal,
    }
}

fn progress_bar(total: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message("Logan regression");
    pb
}

/// Regress every voxel of `coords`, results in row order
///
/// Voxels are independent; with `options.parallel` they are distributed over
/// the rayon pool with shared read-only access to the coordinates.
pub fn solve(
    coords: &LoganCoordinates,
    window: &SteadyStateWindow,
    options: &LoganOptions,
) -> Result<Vec<VoxelFit>, PetgaError> {
    if window.n_columns() != coords.n_columns() {
        return Err(PetgaError::shape_mismatch(
            "steady-state window vs Logan columns",
            &[coords.n_columns()],
            &[window.n_columns()],
        ));
    }

    let x = coords.x().view();
    let y = coords.y().view();
    let n = coords.n_voxels();
    let pb = progress_bar(n, options.show_progress);

    let fit = |i: usize| {
        let result = fit_voxel(x.row(i), y.row(i), window);
        pb.inc(1);
        result
    };

    let fits: Vec<VoxelFit> = if options.parallel {
        (0..n).into_par_iter().map(&fit).collect()
    } else {
        (0..n).map(&fit).collect()
    };

    pb.finish_and_clear();
    Ok(fits)
}
