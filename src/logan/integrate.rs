//! Cumulative trapezoidal integration
//!
//! The running integral at the first sample is zero by definition and is
//! dropped, so a curve of length T integrates to T - 1 values: element `t`
//! holds the integral from the first sample up to sample `t + 1`.

use ndarray::{Array1, Array2, ArrayView1, Zip};

use crate::error::PetgaError;

/// Linear trapezoidal area of a single segment
#[inline]
fn trapezoid(c1: f64, c2: f64, dt: f64) -> f64 {
    (c1 + c2) / 2.0 * dt
}

fn check_times(times: ArrayView1<f64>) -> Result<(), PetgaError> {
    for i in 1..times.len() {
        if times[i] < times[i - 1] {
            return Err(PetgaError::InvalidTimeSequence { index: i });
        }
    }
    Ok(())
}

/// Running trapezoidal integral of `values` over `times`
///
/// ```rust
/// use ndarray::array;
/// use petga::logan::cumulative_trapezoid;
///
/// let integral = cumulative_trapezoid(array![0.0, 2.0, 2.0].view(), array![0.0, 1.0, 3.0].view()).unwrap();
/// assert_eq!(integral.to_vec(), vec![1.0, 5.0]);
/// ```
pub fn cumulative_trapezoid(
    values: ArrayView1<f64>,
    times: ArrayView1<f64>,
) -> Result<Array1<f64>, PetgaError> {
    if values.len() != times.len() {
        return Err(PetgaError::shape_mismatch(
            "trapezoid abscissae",
            &[values.len()],
            &[times.len()],
        ));
    }
    check_times(times)?;

    let n = values.len().saturating_sub(1);
    let mut out = Array1::zeros(n);
    let mut acc = 0.0;
    for t in 0..n {
        acc += trapezoid(values[t], values[t + 1], times[t + 1] - times[t]);
        out[t] = acc;
    }
    Ok(out)
}

/// [`cumulative_trapezoid`] applied to every row of an N × T matrix
pub fn cumulative_trapezoid_rows(
    values: &Array2<f64>,
    times: ArrayView1<f64>,
) -> Result<Array2<f64>, PetgaError> {
    if values.ncols() != times.len() {
        return Err(PetgaError::shape_mismatch(
            "trapezoid abscissae",
            &[values.ncols()],
            &[times.len()],
        ));
    }
    check_times(times)?;

    let n_cols = values.ncols().saturating_sub(1);
    let mut out = Array2::zeros((values.nrows(), n_cols));
    let mut acc = Array1::<f64>::zeros(values.nrows());
    for t in 0..n_cols {
        let dt = times[t + 1] - times[t];
        Zip::from(&mut acc)
            .and(values.column(t))
            .and(values.column(t + 1))
            .for_each(|a, &c1, &c2| *a += trapezoid(c1, c2, dt));
        out.column_mut(t).assign(&acc);
    }
    Ok(out)
}
