//! Logan coordinates for a reference-region model
//!
//! For each tissue voxel with curve `C` and reference curve `R`:
//!
//! ```text
//! y[t] = ∫C(0..t+1) / C[t+1]
//! x[t] = ∫R(0..t+1) / C[t+1] + (1 / k2ref) * R[t+1] / C[t+1]
//! ```
//!
//! Integrals drop their leading zero sample, so column `t` of x and y belongs
//! to original frame `t + 1`; the denominators are taken from that same
//! shifted frame.

use ndarray::{Array1, Array2};

use super::integrate::{cumulative_trapezoid, cumulative_trapezoid_rows};
use crate::error::PetgaError;

/// Logan x/y pairs, one row per kept voxel and T - 1 columns
#[derive(Debug, Clone, PartialEq)]
pub struct LoganCoordinates {
    x: Array2<f64>,
    y: Array2<f64>,
    degenerate: Vec<usize>,
}

impl LoganCoordinates {
    /// Transform a tissue matrix (N × T) against a reference curve (T)
    ///
    /// Voxels with a zero or non-finite denominator are dropped and their
    /// input row indices reported by [`degenerate`](Self::degenerate).
    pub fn compute(
        reference: &Array1<f64>,
        tissue: &Array2<f64>,
        midframes: &Array1<f64>,
        k2ref: f64,
    ) -> Result<Self, PetgaError> {
        if !(k2ref.is_finite() && k2ref > 0.0) {
            return Err(PetgaError::invalid_parameter("k2ref", k2ref));
        }
        let n_frames = tissue.ncols();
        if reference.len() != n_frames {
            return Err(PetgaError::shape_mismatch(
                "reference curve vs tissue frames",
                &[n_frames],
                &[reference.len()],
            ));
        }
        if midframes.len() != n_frames {
            return Err(PetgaError::shape_mismatch(
                "midframes vs tissue frames",
                &[n_frames],
                &[midframes.len()],
            ));
        }

        let int_ref = cumulative_trapezoid(reference.view(), midframes.view())?;
        let int_tissue = cumulative_trapezoid_rows(tissue, midframes.view())?;
        let n_cols = n_frames.saturating_sub(1);
        let inv_k2ref = 1.0 / k2ref;

        let degenerate: Vec<usize> = tissue
            .rows()
            .into_iter()
            .enumerate()
            .filter(|(_, row)| row.iter().skip(1).any(|&d| d == 0.0 || !d.is_finite()))
            .map(|(i, _)| i)
            .collect();

        let n_kept = tissue.nrows() - degenerate.len();
        let mut x = Array2::zeros((n_kept, n_cols));
        let mut y = Array2::zeros((n_kept, n_cols));

        let mut skip = degenerate.iter().peekable();
        let mut out = 0;
        for v in 0..tissue.nrows() {
            if skip.peek() == Some(&&v) {
                skip.next();
                continue;
            }
            for t in 0..n_cols {
                let denom = tissue[[v, t + 1]];
                y[[out, t]] = int_tissue[[v, t]] / denom;
                x[[out, t]] = int_ref[t] / denom + inv_k2ref * reference[t + 1] / denom;
            }
            out += 1;
        }

        if !degenerate.is_empty() {
            tracing::warn!(
                "{} degenerate voxel(s) with a zero denominator excluded from the Logan transform",
                degenerate.len()
            );
        }

        Ok(Self { x, y, degenerate })
    }

    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn y(&self) -> &Array2<f64> {
        &self.y
    }

    /// Input rows dropped for a zero or non-finite denominator, ascending
    pub fn degenerate(&self) -> &[usize] {
        &self.degenerate
    }

    /// Number of kept voxels
    pub fn n_voxels(&self) -> usize {
        self.x.nrows()
    }

    /// Number of Logan columns (frames - 1)
    pub fn n_columns(&self) -> usize {
        self.x.ncols()
    }
}
