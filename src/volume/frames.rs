//! Static images from a dynamic series

use ndarray::{s, Array3, Array4, Axis};

use crate::error::PetgaError;

fn frame_range(data: &Array4<f64>, first: usize, last: usize) -> Result<(), PetgaError> {
    let n_frames = data.len_of(Axis(3));
    if first > last || last >= n_frames {
        return Err(PetgaError::invalid_parameter(
            "frame range",
            format!("{}..={} of {} frames", first, last, n_frames),
        ));
    }
    Ok(())
}

/// Voxelwise sum over frames `first..=last` (0-based)
pub fn sum_frames(data: &Array4<f64>, first: usize, last: usize) -> Result<Array3<f64>, PetgaError> {
    frame_range(data, first, last)?;
    Ok(data.slice(s![.., .., .., first..=last]).sum_axis(Axis(3)))
}

/// Voxelwise mean over frames `first..=last` (0-based)
pub fn mean_frames(data: &Array4<f64>, first: usize, last: usize) -> Result<Array3<f64>, PetgaError> {
    let sum = sum_frames(data, first, last)?;
    let n = (last - first + 1) as f64;
    Ok(sum / n)
}
