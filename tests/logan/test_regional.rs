use approx::assert_relative_eq;
use ndarray::{Array1, Array3};
use petga::logan::{regional_logan, LoganOptions, VoxelFit};
use petga::roi::{write_regional_fits, Roi, RoiLabels};

use crate::common::{direct_logan_slope, forty_frames, linear_series, voxel_scale};

fn label_image() -> Array3<f64> {
    // label 10 on i == 0, label 20 on i == 1, background elsewhere
    Array3::from_shape_fn((3, 2, 1), |(i, _, _)| match i {
        0 => 10.0,
        1 => 20.0,
        _ => 0.0,
    })
}

#[test]
fn test_regional_fit_uses_region_mean_curve() {
    let table = forty_frames();
    let data = linear_series((3, 2, 1), 40);
    let reference = Array1::<f64>::ones(40);
    let rois = RoiLabels::new(vec![Roi::new("left", vec![10]), Roi::new("both", vec![10, 20])]);

    let fits = regional_logan(
        &data,
        &table,
        &label_image(),
        &rois,
        &reference,
        &LoganOptions::default(),
    )
    .unwrap();
    assert_eq!(fits.len(), 2);
    assert_eq!(fits[0].name, "left");
    assert_eq!(fits[0].n_voxels, 2);
    assert_eq!(fits[1].n_voxels, 4);

    // mean scale over (0,0,0) and (0,1,0)
    let scale = (voxel_scale(0, 0, 0) + voxel_scale(0, 1, 0)) / 2.0;
    let tissue: Vec<f64> = (1..=40).map(|t| scale * t as f64).collect();
    let expected = direct_logan_slope(
        reference.as_slice().unwrap(),
        &tissue,
        &table.midframes().to_vec(),
        0.15,
        &(29..39).collect::<Vec<_>>(),
    );
    assert!(fits[0].fit.is_fitted());
    assert_relative_eq!(fits[0].fit.slope(), expected, max_relative = 1e-9);
}

#[test]
fn test_empty_region_does_not_abort_others() {
    let table = forty_frames();
    let data = linear_series((3, 2, 1), 40);
    let rois = RoiLabels::new(vec![Roi::new("absent", vec![99]), Roi::new("right", vec![20])]);

    let fits = regional_logan(
        &data,
        &table,
        &label_image(),
        &rois,
        &Array1::ones(40),
        &LoganOptions::default(),
    )
    .unwrap();
    assert_eq!(fits[0].fit, VoxelFit::NoSignal);
    assert_eq!(fits[0].n_voxels, 0);
    assert!(fits[1].fit.is_fitted());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("regional.csv");
    write_regional_fits(&fits, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("region,dvr,intercept,residual,npoints,nvox,fitted")
    );
    assert!(lines.next().unwrap().starts_with("absent,0.0,0.0,0.0,0,0,false"));
}
