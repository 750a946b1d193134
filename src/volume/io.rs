//! NIfTI loading and saving
//!
//! Arrays are indexed `[x, y, z]` / `[x, y, z, t]` as stored on disk. NaN is
//! replaced by zero here and nowhere else.

use std::path::{Path, PathBuf};

use ndarray::{Array3, Array4, ArrayD, Axis, Ix3, Ix4};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::error::PetgaError;

/// Where a dynamic series comes from
///
/// Chosen explicitly by the caller rather than detected from the input.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeSource {
    /// One 4D file with time on the last axis
    SingleVolume(PathBuf),
    /// One 3D file per frame, in frame order
    VolumeSequence(Vec<PathBuf>),
}

fn nifti_err(path: &Path) -> impl FnOnce(nifti::NiftiError) -> PetgaError + '_ {
    move |source| PetgaError::Nifti {
        path: path.to_path_buf(),
        source,
    }
}

fn read_raw(path: &Path) -> Result<(ArrayD<f64>, NiftiHeader), PetgaError> {
    let obj = ReaderOptions::new().read_file(path).map_err(nifti_err(path))?;
    let header = obj.header().clone();
    let data = obj
        .into_volume()
        .into_ndarray::<f64>()
        .map_err(nifti_err(path))?;
    tracing::debug!("read {} with shape {:?}", path.display(), data.shape());
    Ok((data, header))
}

/// Drop trailing length-1 axes down to `ndim` dimensions
fn squeeze_trailing(mut data: ArrayD<f64>, ndim: usize) -> ArrayD<f64> {
    while data.ndim() > ndim && data.shape()[data.ndim() - 1] == 1 {
        let last = data.ndim() - 1;
        data = data.index_axis_move(Axis(last), 0);
    }
    data
}

fn sanitize(data: &mut ArrayD<f64>) {
    data.mapv_inplace(|v| if v.is_nan() { 0.0 } else { v });
}

fn into_volume(path: &Path, data: ArrayD<f64>) -> Result<Array3<f64>, PetgaError> {
    let found = data.shape().to_vec();
    data.into_dimensionality::<Ix3>().map_err(|_| PetgaError::ShapeMismatch {
        context: format!("3D volume {}", path.display()),
        expected: vec![0, 0, 0],
        found,
    })
}

/// Load a 3D image (mask, label image, static frame)
pub fn load_mask(path: impl AsRef<Path>) -> Result<(Array3<f64>, NiftiHeader), PetgaError> {
    let path = path.as_ref();
    let (data, header) = read_raw(path)?;
    let mut data = squeeze_trailing(data, 3);
    sanitize(&mut data);
    Ok((into_volume(path, data)?, header))
}

/// Load a dynamic series as `(x, y, z, t)`
///
/// The returned header belongs to the single volume, or to the first file of
/// a sequence.
pub fn load_series(source: &VolumeSource) -> Result<(Array4<f64>, NiftiHeader), PetgaError> {
    match source {
        VolumeSource::SingleVolume(path) => {
            let (data, header) = read_raw(path)?;
            let mut data = squeeze_trailing(data, 4);
            if data.ndim() == 3 {
                data = data.insert_axis(Axis(3));
            }
            sanitize(&mut data);
            let found = data.shape().to_vec();
            let series = data.into_dimensionality::<Ix4>().map_err(|_| {
                PetgaError::ShapeMismatch {
                    context: format!("4D series {}", path.display()),
                    expected: vec![0, 0, 0, 0],
                    found,
                }
            })?;
            Ok((series, header))
        }
        VolumeSource::VolumeSequence(paths) => {
            let Some(first) = paths.first() else {
                return Err(PetgaError::invalid_parameter("frames", "empty sequence"));
            };
            let (volume, header) = load_mask(first)?;
            let shape = volume.shape().to_vec();
            let mut frames = vec![volume];
            for path in &paths[1..] {
                let (volume, _) = load_mask(path)?;
                if volume.shape() != shape.as_slice() {
                    return Err(PetgaError::shape_mismatch(
                        format!("frame {}", path.display()),
                        &shape,
                        volume.shape(),
                    ));
                }
                frames.push(volume);
            }
            let views: Vec<_> = frames.iter().map(|f| f.view()).collect();
            let series = ndarray::stack(Axis(3), &views).map_err(|_| {
                PetgaError::shape_mismatch("frame sequence", &shape, &[frames.len()])
            })?;
            tracing::debug!("stacked {} frames into {:?}", paths.len(), series.shape());
            Ok((series, header))
        }
    }
}

/// Write a 3D result volume with the geometry of `reference_header`
pub fn save_volume(
    path: impl AsRef<Path>,
    volume: &Array3<f64>,
    reference_header: &NiftiHeader,
) -> Result<(), PetgaError> {
    let path = path.as_ref();
    WriterOptions::new(path)
        .reference_header(reference_header)
        .write_nifti(volume)
        .map_err(nifti_err(path))?;
    tracing::debug!("wrote {}", path.display());
    Ok(())
}
