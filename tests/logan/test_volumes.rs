use ndarray::{Array1, Array3};
use petga::logan::{LoganAnalysis, Reference};
use petga::volume::{load_mask, load_series, mean_frames, save_volume, NiftiHeader, VolumeSource};

use crate::common::{forty_frames, linear_series};

#[test]
fn test_dvr_volume_survives_nifti_round_trip() {
    let table = forty_frames();
    let data = linear_series((2, 3, 2), 40);
    let mask = Array3::<f64>::ones((2, 3, 2));
    let result = LoganAnalysis::new(&data, &table, Reference::Curve(Array1::ones(40)), &mask)
        .run()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("DVR.nii.gz");
    save_volume(&path, &result.dvr, &NiftiHeader::default()).unwrap();

    let (loaded, _) = load_mask(&path).unwrap();
    assert_eq!(loaded.dim(), result.dvr.dim());
    for (a, b) in loaded.iter().zip(result.dvr.iter()) {
        assert_eq!(a, b);
    }
}

#[test]
fn test_frame_sequence_feeds_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let header = NiftiHeader::default();
    let data = linear_series((2, 2, 1), 4);
    let paths: Vec<_> = (0..4)
        .map(|t| {
            let path = dir.path().join(format!("frame{:02}.nii", t));
            let frame = data.index_axis(ndarray::Axis(3), t).to_owned();
            save_volume(&path, &frame, &header).unwrap();
            path
        })
        .collect();

    let (series, _) = load_series(&VolumeSource::VolumeSequence(paths)).unwrap();
    assert_eq!(series, data);

    let mean = mean_frames(&series, 0, 3).unwrap();
    // scale * mean(1, 2, 3, 4)
    assert_eq!(mean[[1, 1, 0]], 4.0 * 2.5);
}
