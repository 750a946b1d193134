use approx::assert_relative_eq;
use petga::timing::{read_frametimes, write_frametimes, FrameTimeTable, TimeUnit, TimingError};

fn write(dir: &tempfile::TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_round_trip_sorts_frames() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        &dir,
        "unsorted.csv",
        "frame,start,duration,stop\n3,120,60,180\n1,0,60,60\n2,60,60,120\n",
    );
    let table = read_frametimes(&input, TimeUnit::Seconds).unwrap();
    let frames: Vec<usize> = table.frames().iter().map(|f| f.frame).collect();
    assert_eq!(frames, vec![1, 2, 3]);

    let output = dir.path().join("written.csv");
    write_frametimes(&table, &output).unwrap();
    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("frame,start,stop,duration"));

    let reread = read_frametimes(&output, TimeUnit::Seconds).unwrap();
    assert_eq!(reread.len(), 3);
    for (a, b) in table.frames().iter().zip(reread.frames()) {
        assert_eq!(a.frame, b.frame);
        assert_relative_eq!(a.start, b.start);
        assert_relative_eq!(a.duration, b.duration);
        assert_relative_eq!(a.stop, b.stop);
    }
}

#[test]
fn test_milliseconds_to_seconds() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(&dir, "ms.csv", "1,0,30000,30000\n2,30000,90000,120000\n");
    let table = read_frametimes(&input, TimeUnit::Milliseconds)
        .unwrap()
        .to_unit(TimeUnit::Seconds);
    assert_eq!(table.unit(), TimeUnit::Seconds);
    assert_relative_eq!(table.frames()[1].start, 30.0, max_relative = 1e-12);
    assert_relative_eq!(table.frames()[1].stop, 120.0, max_relative = 1e-12);
    assert_relative_eq!(table.midframes()[1], 75.0, max_relative = 1e-12);
}

#[test]
fn test_semicolon_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(&dir, "semi.csv", "1;0;60;60\n2;60;60;120\n");
    let table = read_frametimes(&input, TimeUnit::Seconds).unwrap();
    assert_eq!(table.len(), 2);
    assert_relative_eq!(table.midframes()[1], 90.0);
}

#[test]
fn test_too_few_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(&dir, "three.csv", "0,60,60\n60,60,120\n");
    let err = read_frametimes(&input, TimeUnit::Seconds).unwrap_err();
    assert!(matches!(err, TimingError::MalformedTimingTable { .. }));
}

#[test]
fn test_three_column_form_from_intervals() {
    let table =
        FrameTimeTable::from_intervals(&[(0.0, 60.0, 60.0), (60.0, 60.0, 120.0)], TimeUnit::Seconds)
            .unwrap();
    assert_eq!(table.frames()[1].frame, 2);
}

#[test]
fn test_duplicate_frame_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(&dir, "dup.csv", "1,0,60,60\n1,60,60,120\n");
    let err = read_frametimes(&input, TimeUnit::Seconds).unwrap_err();
    assert!(matches!(err, TimingError::DuplicateFrame { frame: 1 }));
}

#[test]
fn test_stop_mismatch_is_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(&dir, "drift.csv", "1,0,60,61\n2,60,60,120\n");
    let table = read_frametimes(&input, TimeUnit::Seconds).unwrap();
    assert_eq!(table.warnings().len(), 1);
    assert!(table.strict().is_err());
}
