//! Region-of-interest definitions and region statistics
//!
//! ROIs are named groups of integer labels from a segmentation image
//! (e.g. FreeSurfer aparc+aseg). Statistics are taken over positive, finite
//! voxels.

mod error;
mod labels;
mod stats;

pub use error::RoiError;
pub use labels::{Roi, RoiLabels};
pub use stats::{
    normalize_by_region, region_stats, write_region_stats, write_regional_fits, RegionStats,
    RegionStatsOptions, ALL_REGIONS,
};
