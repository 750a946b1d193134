use std::path::Path;

use ndarray::{Array3, Zip};
use serde::{Deserialize, Serialize};

use super::labels::RoiLabels;
use crate::error::PetgaError;
use crate::logan::RegionalFit;

/// Name of the entry covering the union of all ROIs
pub const ALL_REGIONS: &str = "ALL";

/// Summary of the positive voxels of one region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStats {
    #[serde(rename = "region")]
    pub name: String,
    /// `None` when the region has no qualifying voxels
    pub mean: Option<f64>,
    /// Population standard deviation
    pub std: Option<f64>,
    #[serde(rename = "nvox")]
    pub n_voxels: usize,
}

impl RegionStats {
    fn from_values(name: &str, values: &[f64]) -> Self {
        let n = values.len();
        let (mean, std) = if n == 0 {
            (None, None)
        } else {
            let mean = values.iter().sum::<f64>() / n as f64;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
            (Some(mean), Some(var.sqrt()))
        };
        Self {
            name: name.to_string(),
            mean,
            std,
            n_voxels: n,
        }
    }
}

fn check_shape(context: &str, expected: &Array3<f64>, found: &Array3<f64>) -> Result<(), PetgaError> {
    if expected.shape() != found.shape() {
        return Err(PetgaError::shape_mismatch(
            context,
            expected.shape(),
            found.shape(),
        ));
    }
    Ok(())
}

/// Voxel selection for [`region_stats`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionStatsOptions {
    /// The extra mask must exceed this value (default: 0.0)
    pub other_threshold: f64,
    /// Keep only this fraction of each ROI's highest values, in (0, 1]
    pub top_fraction: Option<f64>,
}

impl Default for RegionStatsOptions {
    fn default() -> Self {
        Self {
            other_threshold: 0.0,
            top_fraction: None,
        }
    }
}

impl RegionStatsOptions {
    pub fn with_other_threshold(mut self, threshold: f64) -> Self {
        self.other_threshold = threshold;
        self
    }

    pub fn with_top_fraction(mut self, fraction: f64) -> Self {
        self.top_fraction = Some(fraction);
        self
    }

    pub fn validate(&self) -> Result<(), PetgaError> {
        if !self.other_threshold.is_finite() {
            return Err(PetgaError::invalid_parameter(
                "other_threshold",
                self.other_threshold,
            ));
        }
        if let Some(fraction) = self.top_fraction {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(PetgaError::invalid_parameter("top_fraction", fraction));
            }
        }
        Ok(())
    }
}

/// The highest `ceil(n * fraction)` of `values`, at least one when non-empty
fn top_values(mut values: Vec<f64>, fraction: f64) -> Vec<f64> {
    values.sort_by(|a, b| a.total_cmp(b));
    let keep = ((values.len() as f64) * fraction).ceil() as usize;
    let keep = keep.clamp(1, values.len().max(1));
    values.split_off(values.len().saturating_sub(keep))
}

/// Mean, std and voxel count of `data` within each ROI
///
/// A voxel belongs to a ROI when its label is one of the ROI's labels, its
/// data value is positive and finite and, if `other_mask` is given, the other
/// mask exceeds `options.other_threshold` there. With `options.top_fraction`
/// each ROI is summarised over its highest values only. Each ROI is evaluated
/// on its own; the trailing [`ALL_REGIONS`] entry covers every eligible voxel
/// of their union.
pub fn region_stats(
    labels: &Array3<f64>,
    data: &Array3<f64>,
    rois: &RoiLabels,
    other_mask: Option<&Array3<f64>>,
    options: &RegionStatsOptions,
) -> Result<Vec<RegionStats>, PetgaError> {
    options.validate()?;
    check_shape("data vs label image", labels, data)?;
    if let Some(other) = other_mask {
        check_shape("extra mask vs label image", labels, other)?;
    }

    let threshold = options.other_threshold;
    let eligible = match other_mask {
        Some(other) => Zip::from(data)
            .and(other)
            .map_collect(|&d, &m| d.is_finite() && d > 0.0 && m > threshold),
        None => data.mapv(|d| d.is_finite() && d > 0.0),
    };

    let mut union = Array3::from_elem(labels.dim(), false);
    let mut stats = Vec::with_capacity(rois.len() + 1);
    for roi in rois.iter() {
        let mut region = roi.mask(labels);
        Zip::from(&mut region)
            .and(&eligible)
            .and(&mut union)
            .for_each(|r, &e, u| {
                *r = *r && e;
                *u = *u || *r;
            });
        let mut values: Vec<f64> = Zip::from(data)
            .and(&region)
            .fold(Vec::new(), |mut acc, &d, &inside| {
                if inside {
                    acc.push(d);
                }
                acc
            });
        if values.is_empty() {
            tracing::warn!("ROI {} has no positive voxels", roi.name);
        } else if let Some(fraction) = options.top_fraction {
            values = top_values(values, fraction);
        }
        stats.push(RegionStats::from_values(&roi.name, &values));
    }

    let all: Vec<f64> = data
        .iter()
        .zip(union.iter())
        .filter_map(|(&d, &inside)| inside.then_some(d))
        .collect();
    stats.push(RegionStats::from_values(ALL_REGIONS, &all));
    Ok(stats)
}

fn csv_writer(path: &Path) -> Result<csv::Writer<std::fs::File>, PetgaError> {
    csv::Writer::from_path(path).map_err(|e| PetgaError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<(), PetgaError> {
    let csv_err = |e: csv::Error| PetgaError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut writer = csv_writer(path)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| PetgaError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write region statistics as CSV with columns `region,mean,std,nvox`
pub fn write_region_stats(stats: &[RegionStats], path: impl AsRef<Path>) -> Result<(), PetgaError> {
    write_rows(path.as_ref(), stats)
}

#[derive(Serialize)]
struct RegionalRow<'a> {
    region: &'a str,
    dvr: f64,
    intercept: f64,
    residual: Option<f64>,
    npoints: usize,
    nvox: usize,
    fitted: bool,
}

/// Write regional Logan fits as CSV
///
/// Columns: `region,dvr,intercept,residual,npoints,nvox,fitted`.
pub fn write_regional_fits(fits: &[RegionalFit], path: impl AsRef<Path>) -> Result<(), PetgaError> {
    write_rows(
        path.as_ref(),
        fits.iter().map(|f| {
            let r = f.fit.result();
            RegionalRow {
                region: &f.name,
                dvr: r.slope,
                intercept: r.intercept,
                residual: r.residual,
                npoints: r.n_points,
                nvox: f.n_voxels,
                fitted: f.fit.is_fitted(),
            }
        }),
    )
}

/// Divide `image` by its mean over voxels where `image` is positive and
/// finite and `mask > 0`
pub fn normalize_by_region(image: &Array3<f64>, mask: &Array3<f64>) -> Result<Array3<f64>, PetgaError> {
    check_shape("normalization mask", image, mask)?;
    let (sum, n) = Zip::from(image)
        .and(mask)
        .fold((0.0, 0usize), |(s, n), &v, &m| {
            if v.is_finite() && v > 0.0 && m > 0.0 {
                (s + v, n + 1)
            } else {
                (s, n)
            }
        });
    if n == 0 {
        return Err(PetgaError::EmptyMask {
            context: "normalization region".to_string(),
            frame: 0,
        });
    }
    let mean = sum / n as f64;
    tracing::info!("normalizing by region mean {:.4} over {} voxels", mean, n);
    Ok(image / mean)
}
