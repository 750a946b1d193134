use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array3, Array4};
use petga::logan::{solve, LoganAnalysis, LoganCoordinates, LoganOptions, Reference, SteadyStateWindow};
use petga::tac::masked_tissue_matrix;
use petga::timing::{FrameTime, FrameTimeTable, TimeUnit};
use std::hint::black_box;

/// 28 frames out to 90 minutes, shaped like a PIB protocol
fn pib_timing() -> FrameTimeTable {
    let mut durations = vec![0.25; 8];
    durations.extend(vec![1.0; 8]);
    durations.extend(vec![2.5; 4]);
    durations.extend(vec![8.0; 8]);
    let mut start = 0.0;
    let frames = durations
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            let f = FrameTime::new(i + 1, start, d, start + d);
            start += d;
            f
        })
        .collect();
    FrameTimeTable::new(frames, TimeUnit::Minutes).unwrap()
}

/// Synthetic series with a slowly varying uptake per voxel
fn synthetic_series(side: usize, n_frames: usize) -> Array4<f64> {
    Array4::from_shape_fn((side, side, side, n_frames), |(i, j, k, t)| {
        let scale = 1.0 + ((i * 7 + j * 3 + k) % 11) as f64 * 0.1;
        scale * (1.0 - (-(t as f64 + 1.0) * 0.2).exp()) + 0.01
    })
}

fn bench_solve(c: &mut Criterion) {
    let table = pib_timing();
    let mut group = c.benchmark_group("logan_solve");

    for side in [8usize, 16, 32] {
        let data = synthetic_series(side, table.len());
        let mask = Array3::<f64>::ones((side, side, side));
        let (tissue, _) = masked_tissue_matrix(&data, &mask).unwrap();
        let reference = Array1::from_shape_fn(table.len(), |t| 1.0 - (-(t as f64 + 1.0) * 0.3).exp());
        let coords =
            LoganCoordinates::compute(&reference, &tissue, &table.midframes(), 0.15).unwrap();
        let window = SteadyStateWindow::select(&table, (35.0, 90.0)).unwrap();

        let n_voxels = side * side * side;
        let parallel = LoganOptions::default();
        let sequential = LoganOptions::default().sequential();

        group.bench_with_input(BenchmarkId::new("parallel", n_voxels), &coords, |b, coords| {
            b.iter(|| black_box(solve(black_box(coords), &window, &parallel).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("sequential", n_voxels), &coords, |b, coords| {
            b.iter(|| black_box(solve(black_box(coords), &window, &sequential).unwrap()));
        });
    }
    group.finish();
}

fn bench_full_analysis(c: &mut Criterion) {
    let table = pib_timing();
    let data = synthetic_series(24, table.len());
    let mask = Array3::<f64>::ones((24, 24, 24));
    let mut reference_mask = Array3::<f64>::zeros((24, 24, 24));
    reference_mask
        .slice_mut(ndarray::s![..4, ..4, ..4])
        .fill(1.0);

    c.bench_function("logan_analysis_24cubed", |b| {
        b.iter(|| {
            let result = LoganAnalysis::new(
                black_box(&data),
                &table,
                Reference::Mask(&reference_mask),
                &mask,
            )
            .run()
            .unwrap();
            black_box(result);
        });
    });
}

criterion_group!(benches, bench_solve, bench_full_analysis);
criterion_main!(benches);
