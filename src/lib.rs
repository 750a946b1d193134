//! Logan graphical analysis for dynamic PET
//!
//! `petga` computes distribution volume ratios from a dynamic PET series and
//! a reference region, voxel by voxel or per anatomical region.
//!
//! - [`timing`]: frame timing tables and midframe times
//! - [`tac`]: reference curves and masked tissue matrices
//! - [`logan`]: Logan transform, windowed regression and the full pipeline
//! - [`volume`]: NIfTI I/O, frame aggregation and result reassembly
//! - [`roi`]: label-based regions, statistics and normalization

pub mod error;
pub mod logan;
pub mod roi;
pub mod tac;
pub mod timing;
pub mod volume;

pub use error::PetgaError;

pub mod prelude {
    pub use crate::error::PetgaError;
    pub use crate::logan::{
        regional_logan, LoganAnalysis, LoganOptions, LoganResult, LoganSummary, Reference,
        RegionalFit, VoxelFit,
    };
    pub use crate::roi::{region_stats, RegionStatsOptions, RoiLabels};
    pub use crate::tac::{masked_tissue_matrix, reference_curve, write_tac};
    pub use crate::timing::{read_frametimes, FrameTime, FrameTimeTable, TimeUnit};
    pub use crate::volume::{load_mask, load_series, save_volume, VolumeSource};
}
