use approx::assert_relative_eq;
use ndarray::{Array1, Array3};
use petga::logan::{LoganAnalysis, LoganOptions, Reference, SteadyStateWindow};
use petga::tac::reference_curve;
use petga::PetgaError;

use crate::common::{direct_logan_slope, forty_frames, linear_series, voxel_scale};

#[test]
fn test_window_covers_last_ten_frames() {
    let table = forty_frames();
    let window = SteadyStateWindow::select(&table, (35.0, 90.0)).unwrap();
    assert_eq!(window.len(), 10);
    assert_eq!(window.columns(), &(29..39).collect::<Vec<_>>()[..]);
}

#[test]
fn test_forty_frame_end_to_end() {
    let table = forty_frames();
    let data = linear_series((3, 2, 2), 40);
    let mask = Array3::<f64>::ones((3, 2, 2));
    let reference = Array1::<f64>::ones(40);

    let result = LoganAnalysis::new(&data, &table, Reference::Curve(reference.clone()), &mask)
        .run()
        .unwrap();

    assert_eq!(result.summary.n_voxels, 12);
    assert_eq!(result.summary.n_fitted, 12);
    assert_eq!(result.summary.n_degenerate, 0);
    assert_eq!(result.summary.window_frames, 10);

    let times = table.midframes().to_vec();
    let columns: Vec<usize> = (29..39).collect();
    let unit_slope = direct_logan_slope(
        reference.as_slice().unwrap(),
        &(1..=40).map(|t| t as f64).collect::<Vec<_>>(),
        &times,
        0.15,
        &columns,
    );
    assert!(unit_slope.is_finite() && unit_slope != 0.0);

    for ((i, j, k), &dvr) in result.dvr.indexed_iter() {
        let scale = voxel_scale(i, j, k);
        let tissue: Vec<f64> = (1..=40).map(|t| scale * t as f64).collect();
        let expected = direct_logan_slope(
            reference.as_slice().unwrap(),
            &tissue,
            &times,
            0.15,
            &columns,
        );
        assert_relative_eq!(dvr, expected, max_relative = 1e-9);
        // y is scale free and x scales with 1 / scale
        assert_relative_eq!(dvr, unit_slope * scale, max_relative = 1e-9);
    }
}

#[test]
fn test_rerun_is_identical() {
    let table = forty_frames();
    let data = linear_series((2, 2, 2), 40);
    let mask = Array3::<f64>::ones((2, 2, 2));
    let analysis = LoganAnalysis::new(&data, &table, Reference::Curve(Array1::ones(40)), &mask);

    let first = analysis.run().unwrap();
    let second = analysis.run().unwrap();
    assert_eq!(first.dvr, second.dvr);
    assert_eq!(first.residuals, second.residuals);
}

#[test]
fn test_reference_mask_matches_precomputed_curve() {
    let table = forty_frames();
    let data = linear_series((3, 3, 1), 40);
    let mut reference_mask = Array3::<f64>::zeros((3, 3, 1));
    reference_mask[[0, 0, 0]] = 1.0;
    reference_mask[[1, 0, 0]] = 1.0;
    let tissue_mask = Array3::<f64>::ones((3, 3, 1));

    let curve = reference_curve(&data, &reference_mask).unwrap();
    // voxel scales 1 and 2
    assert_relative_eq!(curve[0], 1.5);

    let options = LoganOptions::default().sequential();
    let from_mask = LoganAnalysis::new(&data, &table, Reference::Mask(&reference_mask), &tissue_mask)
        .with_options(options.clone())
        .run()
        .unwrap();
    let from_curve = LoganAnalysis::new(&data, &table, Reference::Curve(curve), &tissue_mask)
        .with_options(options)
        .run()
        .unwrap();
    assert_eq!(from_mask.dvr, from_curve.dvr);
    assert_eq!(from_mask.reference, from_curve.reference);
}

#[test]
fn test_invalid_voxel_left_at_zero() {
    let table = forty_frames();
    let mut data = linear_series((2, 2, 1), 40);
    data[[1, 1, 0, 17]] = 0.0;
    let mask = Array3::<f64>::ones((2, 2, 1));

    let result = LoganAnalysis::new(&data, &table, Reference::Curve(Array1::ones(40)), &mask)
        .run()
        .unwrap();
    assert_eq!(result.summary.n_voxels, 3);
    assert_eq!(result.fits.len(), 3);
    assert_eq!(result.dvr[[1, 1, 0]], 0.0);
    assert!(!result.validity.as_array()[[1, 1, 0]]);
    assert!(result.dvr[[0, 0, 0]] != 0.0);
}

#[test]
fn test_empty_window_reports_no_signal() {
    let table = forty_frames();
    let data = linear_series((2, 1, 1), 40);
    let mask = Array3::<f64>::ones((2, 1, 1));

    let result = LoganAnalysis::new(&data, &table, Reference::Curve(Array1::ones(40)), &mask)
        .with_options(LoganOptions::default().with_window(100.0, 200.0))
        .run()
        .unwrap();
    assert_eq!(result.summary.window_frames, 0);
    assert_eq!(result.summary.n_no_signal, 2);
    assert!(result.dvr.iter().all(|&v| v == 0.0));
    assert!(result.residuals.iter().all(|&v| v == 0.0));
}

#[test]
fn test_mask_shape_must_match_series() {
    let table = forty_frames();
    let data = linear_series((2, 2, 2), 40);
    let mask = Array3::<f64>::ones((2, 2, 3));

    let err = LoganAnalysis::new(&data, &table, Reference::Curve(Array1::ones(40)), &mask)
        .run()
        .unwrap_err();
    assert!(matches!(err, PetgaError::ShapeMismatch { .. }));
}

#[test]
fn test_empty_reference_region_is_fatal() {
    let table = forty_frames();
    let data = linear_series((2, 2, 2), 40);
    let reference_mask = Array3::<f64>::zeros((2, 2, 2));
    let tissue_mask = Array3::<f64>::ones((2, 2, 2));

    let err = LoganAnalysis::new(&data, &table, Reference::Mask(&reference_mask), &tissue_mask)
        .run()
        .unwrap_err();
    assert!(matches!(err, PetgaError::EmptyMask { frame: 0, .. }));
}

#[test]
fn test_infinite_reference_voxel_keeps_dvr_finite() {
    let table = forty_frames();
    let mut data = linear_series((2, 2, 1), 40);
    data[[0, 0, 0, 5]] = f64::INFINITY;
    let mut reference_mask = Array3::<f64>::zeros((2, 2, 1));
    reference_mask[[0, 0, 0]] = 1.0;
    reference_mask[[1, 0, 0]] = 1.0;
    let tissue_mask = Array3::<f64>::ones((2, 2, 1));

    let result = LoganAnalysis::new(&data, &table, Reference::Mask(&reference_mask), &tissue_mask)
        .run()
        .unwrap();
    // frame 5 falls back to the remaining finite reference voxel
    assert_relative_eq!(result.reference[5], 2.0 * 6.0);
    assert!(result.reference.iter().all(|v| v.is_finite()));
    assert_eq!(result.summary.n_voxels, 3);
    assert_eq!(result.summary.n_fitted, 3);
    assert!(result.dvr.iter().all(|v| v.is_finite()));
    assert!(result.dvr[[1, 1, 0]] != 0.0);
}
