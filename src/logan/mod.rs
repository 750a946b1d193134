//! Logan graphical analysis with a reference region
//!
//! The voxelwise pipeline:
//!
//! 1. Reference TAC from a mask ([`crate::tac::reference_curve`]) or supplied directly
//! 2. Tissue matrix of voxels valid for all frames ([`crate::tac::masked_tissue_matrix`])
//! 3. Cumulative trapezoidal integrals and Logan x/y ([`LoganCoordinates`])
//! 4. Least squares over the steady-state window ([`SteadyStateWindow`], [`solve`])
//! 5. Scatter of slopes and residuals into volumes ([`crate::volume::scatter`])
//!
//! [`LoganAnalysis`] runs all of it; [`regional_logan`] applies the same model
//! to ROI-averaged curves.
//!
//! # Usage
//!
//! ```rust
//! use ndarray::{Array1, Array3, Array4};
//! use petga::logan::{LoganAnalysis, LoganOptions, Reference};
//! use petga::timing::{FrameTime, FrameTimeTable, TimeUnit};
//!
//! let frames: Vec<FrameTime> = (0..12)
//!     .map(|i| FrameTime::new(i + 1, i as f64 * 10.0, 10.0, (i + 1) as f64 * 10.0))
//!     .collect();
//! let timing = FrameTimeTable::new(frames, TimeUnit::Minutes).unwrap();
//!
//! let data = Array4::from_shape_fn((2, 2, 1, 12), |(_, _, _, t)| 1.0 + t as f64);
//! let mask = Array3::<f64>::ones((2, 2, 1));
//!
//! let result = LoganAnalysis::new(&data, &timing, Reference::Curve(Array1::ones(12)), &mask)
//!     .with_options(LoganOptions::default())
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(result.summary.n_voxels, 4);
//! assert_eq!(result.dvr.dim(), (2, 2, 1));
//! ```

mod analyze;
mod integrate;
mod regression;
mod transform;
mod types;

pub use analyze::{regional_logan, LoganAnalysis, LoganResult, Reference};
pub use integrate::{cumulative_trapezoid, cumulative_trapezoid_rows};
pub use regression::{fit_line, fit_voxel, solve, SteadyStateWindow};
pub use transform::LoganCoordinates;
pub use types::{LoganOptions, LoganSummary, RegionalFit, RegressionResult, VoxelFit};
