//! Scatter per-voxel results back into spatial volumes

use ndarray::Array3;

use crate::error::PetgaError;

/// Boolean volume of voxels that entered the tissue matrix
///
/// Positions are enumerated in ndarray logical (row-major) order, the same
/// order used to gather rows, so the i-th true position owns the i-th result.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidityMask {
    mask: Array3<bool>,
    count: usize,
}

impl ValidityMask {
    pub fn new(mask: Array3<bool>) -> Self {
        let count = mask.iter().filter(|&&v| v).count();
        Self { mask, count }
    }

    /// Number of true positions
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        self.mask.dim()
    }

    pub fn as_array(&self) -> &Array3<bool> {
        &self.mask
    }

    /// True positions in gather/scatter order
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.mask
            .indexed_iter()
            .filter_map(|(idx, &inside)| inside.then_some(idx))
    }

    /// Clear the positions owned by the given row indices
    ///
    /// Rows refer to the enumeration order of [`positions`](Self::positions)
    /// before the call.
    pub fn exclude_rows(&mut self, rows: &[usize]) {
        if rows.is_empty() {
            return;
        }
        let positions: Vec<_> = self.positions().collect();
        for &row in rows {
            if let Some(&idx) = positions.get(row) {
                self.mask[idx] = false;
            }
        }
        self.count = self.mask.iter().filter(|&&v| v).count();
    }
}

/// Write `values[i]` into the i-th true position of `mask`, zero elsewhere
///
/// # Example
///
/// ```rust
/// use ndarray::Array3;
/// use petga::volume::{scatter, ValidityMask};
///
/// let mut m = Array3::from_elem((2, 1, 1), false);
/// m[[1, 0, 0]] = true;
/// let volume = scatter(&[2.5], &ValidityMask::new(m)).unwrap();
/// assert_eq!(volume[[0, 0, 0]], 0.0);
/// assert_eq!(volume[[1, 0, 0]], 2.5);
/// ```
pub fn scatter(values: &[f64], mask: &ValidityMask) -> Result<Array3<f64>, PetgaError> {
    if values.len() != mask.count() {
        return Err(PetgaError::shape_mismatch(
            "result reassembly",
            &[mask.count()],
            &[values.len()],
        ));
    }

    let mut volume = Array3::zeros(mask.shape());
    for (idx, &value) in mask.positions().zip(values) {
        volume[idx] = value;
    }
    Ok(volume)
}
