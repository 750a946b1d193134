//! Time-activity curve extraction
//!
//! Reduces a 4D `(x, y, z, time)` series either to a single curve (per-frame
//! mean over a region) or to a voxel × time matrix restricted to voxels that
//! are valid for their entire time course.

use std::path::Path;

use ndarray::{s, Array1, Array2, Array3, Array4, Axis};

use crate::error::PetgaError;
use crate::timing::TimeUnit;
use crate::volume::ValidityMask;

fn check_spatial_shape<T>(
    context: &str,
    data: &Array4<f64>,
    mask: &Array3<T>,
) -> Result<(), PetgaError> {
    let expected = &data.shape()[..3];
    if mask.shape() != expected {
        return Err(PetgaError::shape_mismatch(context, expected, mask.shape()));
    }
    Ok(())
}

/// Mean of each frame over voxels where `mask > 0` and the value is positive
/// and finite
///
/// NaN in the mask never qualifies. A frame without qualifying voxels is an
/// [`PetgaError::EmptyMask`] error.
pub fn reference_curve(data: &Array4<f64>, mask: &Array3<f64>) -> Result<Array1<f64>, PetgaError> {
    check_spatial_shape("reference mask", data, mask)?;
    let region = mask.mapv(|v| v > 0.0);
    masked_curve(data, &region, "reference region")
}

/// Per-frame mean over a boolean region, same rule as [`reference_curve`]
pub fn region_curve(data: &Array4<f64>, region: &Array3<bool>) -> Result<Array1<f64>, PetgaError> {
    check_spatial_shape("region", data, region)?;
    masked_curve(data, region, "region")
}

fn masked_curve(
    data: &Array4<f64>,
    region: &Array3<bool>,
    context: &str,
) -> Result<Array1<f64>, PetgaError> {
    let mut curve = Array1::zeros(data.len_of(Axis(3)));
    for (t, frame) in data.axis_iter(Axis(3)).enumerate() {
        let (sum, count) = frame
            .iter()
            .zip(region.iter())
            .filter(|&(&v, &inside)| inside && v.is_finite() && v > 0.0)
            .fold((0.0, 0usize), |(s, n), (&v, _)| (s + v, n + 1));
        if count == 0 {
            return Err(PetgaError::EmptyMask {
                context: context.to_string(),
                frame: t,
            });
        }
        curve[t] = sum / count as f64;
    }
    Ok(curve)
}

/// Gather the full time course of every valid tissue voxel
///
/// A voxel is valid when `mask > 0` and every frame is finite and positive.
/// Rows follow the enumeration order of the returned [`ValidityMask`].
pub fn masked_tissue_matrix(
    data: &Array4<f64>,
    mask: &Array3<f64>,
) -> Result<(Array2<f64>, ValidityMask), PetgaError> {
    check_spatial_shape("tissue mask", data, mask)?;

    let valid = Array3::from_shape_fn(mask.dim(), |(i, j, k)| {
        mask[[i, j, k]] > 0.0
            && data
                .slice(s![i, j, k, ..])
                .iter()
                .all(|v| v.is_finite() && *v > 0.0)
    });
    let validity = ValidityMask::new(valid);

    let mut matrix = Array2::zeros((validity.count(), data.len_of(Axis(3))));
    for (row, (i, j, k)) in validity.positions().enumerate() {
        matrix.row_mut(row).assign(&data.slice(s![i, j, k, ..]));
    }

    tracing::debug!(
        "tissue matrix: {} voxels x {} frames",
        matrix.nrows(),
        matrix.ncols()
    );
    Ok((matrix, validity))
}

/// Write a time-activity curve as CSV for inspection
///
/// Columns: midframe in `unit`, midframe in minutes, value.
pub fn write_tac(
    path: impl AsRef<Path>,
    midframes: &Array1<f64>,
    unit: TimeUnit,
    values: &Array1<f64>,
) -> Result<(), PetgaError> {
    let path = path.as_ref();
    if midframes.len() != values.len() {
        return Err(PetgaError::shape_mismatch(
            "TAC output",
            &[midframes.len()],
            &[values.len()],
        ));
    }
    let csv_err = |e: csv::Error| PetgaError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer
        .write_record([
            format!("midframe_{}", unit.suffix()),
            "midframe_min".to_string(),
            "value".to_string(),
        ])
        .map_err(csv_err)?;
    let to_minutes = unit.factor_to(TimeUnit::Minutes);
    for (&t, &v) in midframes.iter().zip(values.iter()) {
        writer
            .write_record([t.to_string(), (t * to_minutes).to_string(), v.to_string()])
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| PetgaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
