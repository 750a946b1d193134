//! Spatial volumes: NIfTI I/O, frame aggregation and result reassembly

mod frames;
mod io;
mod reassemble;

pub use frames::{mean_frames, sum_frames};
pub use io::{load_mask, load_series, save_volume, VolumeSource};
pub use reassemble::{scatter, ValidityMask};

pub use nifti::NiftiHeader;
