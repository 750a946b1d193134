//! Logan analysis orchestrator
//!
//! Chains the pipeline stages for one run: reference TAC, tissue matrix,
//! Logan transform, windowed regression and reassembly into volumes.

use ndarray::{Array1, Array3, Array4, Axis};

use super::regression::{fit_voxel, solve, SteadyStateWindow};
use super::transform::LoganCoordinates;
use super::types::{LoganOptions, LoganSummary, RegionalFit, VoxelFit};
use crate::error::PetgaError;
use crate::roi::RoiLabels;
use crate::tac::{masked_tissue_matrix, reference_curve, region_curve};
use crate::timing::FrameTimeTable;
use crate::volume::{scatter, ValidityMask};

/// Source of the reference time-activity curve
#[derive(Debug, Clone)]
pub enum Reference<'a> {
    /// Reference-region mask over the same grid as the data
    Mask(&'a Array3<f64>),
    /// Precomputed curve, one value per frame
    Curve(Array1<f64>),
}

/// Output of a voxelwise Logan run
#[derive(Debug, Clone)]
pub struct LoganResult {
    pub reference: Array1<f64>,
    /// Midframe times in the timing table's unit
    pub midframes: Array1<f64>,
    /// Logan slope per voxel, zero outside the validity mask
    pub dvr: Array3<f64>,
    pub residuals: Array3<f64>,
    /// Fits in validity-mask order
    pub fits: Vec<VoxelFit>,
    pub validity: ValidityMask,
    pub summary: LoganSummary,
}

/// Voxelwise Logan analysis over a tissue mask
///
/// # Example
///
/// ```rust,ignore
/// use petga::logan::{LoganAnalysis, LoganOptions, Reference};
///
/// let result = LoganAnalysis::new(&data, &timing, Reference::Mask(&cerebellum), &brain)
///     .with_options(LoganOptions::default().with_window(35.0, 90.0))
///     .run()?;
/// println!("{}", result.summary);
/// ```
#[derive(Debug, Clone)]
pub struct LoganAnalysis<'a> {
    data: &'a Array4<f64>,
    timing: &'a FrameTimeTable,
    reference: Reference<'a>,
    tissue_mask: &'a Array3<f64>,
    options: LoganOptions,
}

impl<'a> LoganAnalysis<'a> {
    pub fn new(
        data: &'a Array4<f64>,
        timing: &'a FrameTimeTable,
        reference: Reference<'a>,
        tissue_mask: &'a Array3<f64>,
    ) -> Self {
        Self {
            data,
            timing,
            reference,
            tissue_mask,
            options: LoganOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LoganOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &LoganOptions {
        &self.options
    }

    pub fn run(&self) -> Result<LoganResult, PetgaError> {
        self.options.validate()?;
        check_frame_count(self.data, self.timing)?;

        let midframes = self.timing.midframes();
        let reference = match &self.reference {
            Reference::Mask(mask) => reference_curve(self.data, mask)?,
            Reference::Curve(curve) => {
                if curve.len() != self.timing.len() {
                    return Err(PetgaError::shape_mismatch(
                        "reference curve vs timing table",
                        &[self.timing.len()],
                        &[curve.len()],
                    ));
                }
                curve.clone()
            }
        };

        let (tissue, mut validity) = masked_tissue_matrix(self.data, self.tissue_mask)?;
        let n_voxels = validity.count();

        let coords = LoganCoordinates::compute(&reference, &tissue, &midframes, self.options.k2ref)?;
        validity.exclude_rows(coords.degenerate());

        let window = SteadyStateWindow::select(self.timing, self.options.window)?;
        if window.is_empty() {
            tracing::warn!(
                "steady-state window {:?} min selects no frames; every voxel reports no signal",
                self.options.window
            );
        }

        let fits = solve(&coords, &window, &self.options)?;
        let slopes: Vec<f64> = fits.iter().map(VoxelFit::slope).collect();
        let residuals: Vec<f64> = fits.iter().map(VoxelFit::residual).collect();
        let dvr = scatter(&slopes, &validity)?;
        let residuals = scatter(&residuals, &validity)?;

        let n_fitted = fits.iter().filter(|f| f.is_fitted()).count();
        let summary = LoganSummary {
            n_voxels,
            n_fitted,
            n_no_signal: fits.len() - n_fitted,
            n_degenerate: coords.degenerate().len(),
            window_frames: window.len(),
            k2ref: self.options.k2ref,
            window: self.options.window,
            timing_warnings: self.timing.warnings().iter().map(|w| w.to_string()).collect(),
        };
        tracing::info!(
            "Logan: {} voxels, {} fitted, {} no signal, {} degenerate",
            summary.n_voxels,
            summary.n_fitted,
            summary.n_no_signal,
            summary.n_degenerate
        );

        Ok(LoganResult {
            reference,
            midframes,
            dvr,
            residuals,
            fits,
            validity,
            summary,
        })
    }
}

fn check_frame_count(data: &Array4<f64>, timing: &FrameTimeTable) -> Result<(), PetgaError> {
    let n_frames = data.len_of(Axis(3));
    if n_frames != timing.len() {
        return Err(PetgaError::shape_mismatch(
            "time axis vs timing table",
            &[timing.len()],
            &[n_frames],
        ));
    }
    Ok(())
}

/// Logan fit of each ROI's mean time-activity curve
///
/// Every ROI is handled independently: an ROI with an empty frame or a
/// degenerate curve is reported as [`VoxelFit::NoSignal`] and the others
/// still run.
pub fn regional_logan(
    data: &Array4<f64>,
    timing: &FrameTimeTable,
    labels: &Array3<f64>,
    rois: &RoiLabels,
    reference: &Array1<f64>,
    options: &LoganOptions,
) -> Result<Vec<RegionalFit>, PetgaError> {
    options.validate()?;
    check_frame_count(data, timing)?;
    let expected = &data.shape()[..3];
    if labels.shape() != expected {
        return Err(PetgaError::shape_mismatch(
            "label image",
            expected,
            labels.shape(),
        ));
    }

    let midframes = timing.midframes();
    let window = SteadyStateWindow::select(timing, options.window)?;

    let mut fits = Vec::with_capacity(rois.len());
    for roi in rois.iter() {
        let region = roi.mask(labels);
        let n_voxels = region.iter().filter(|&&v| v).count();

        let curve = match region_curve(data, &region) {
            Ok(curve) => curve,
            Err(PetgaError::EmptyMask { frame, .. }) => {
                tracing::warn!("region {} has no positive voxels in frame {}", roi.name, frame);
                fits.push(RegionalFit {
                    name: roi.name.clone(),
                    n_voxels,
                    fit: VoxelFit::NoSignal,
                });
                continue;
            }
            Err(e) => return Err(e),
        };

        let tissue = curve.insert_axis(Axis(0));
        let coords = LoganCoordinates::compute(reference, &tissue, &midframes, options.k2ref)?;
        let fit = if coords.n_voxels() == 1 {
            fit_voxel(coords.x().row(0), coords.y().row(0), &window)
        } else {
            VoxelFit::NoSignal
        };

        fits.push(RegionalFit {
            name: roi.name.clone(),
            n_voxels,
            fit,
        });
    }
    Ok(fits)
}
