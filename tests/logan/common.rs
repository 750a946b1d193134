#![allow(dead_code)]

//! Synthetic acquisitions shared by the integration tests

use ndarray::Array4;
use petga::timing::{FrameTime, FrameTimeTable, TimeUnit};

/// 40 frames in minutes: 5 x 2 min, 25 x 1 min, then 10 x 5.5 min from 35 to 90
pub fn forty_frames() -> FrameTimeTable {
    let mut durations = vec![2.0; 5];
    durations.extend(std::iter::repeat(1.0).take(25));
    durations.extend(std::iter::repeat(5.5).take(10));

    let mut start = 0.0;
    let frames = durations
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            let frame = FrameTime::new(i + 1, start, d, start + d);
            start += d;
            frame
        })
        .collect();
    FrameTimeTable::new(frames, TimeUnit::Minutes).unwrap()
}

/// Voxel `(i, j, k)` follows `scale * (t + 1)` with `scale = 1 + i + 2j + 4k`
pub fn linear_series(dim: (usize, usize, usize), n_frames: usize) -> Array4<f64> {
    Array4::from_shape_fn((dim.0, dim.1, dim.2, n_frames), |(i, j, k, t)| {
        voxel_scale(i, j, k) * (t + 1) as f64
    })
}

pub fn voxel_scale(i: usize, j: usize, k: usize) -> f64 {
    (1 + i + 2 * j + 4 * k) as f64
}

/// Logan slope computed directly from the definitions
pub fn direct_logan_slope(
    reference: &[f64],
    tissue: &[f64],
    times: &[f64],
    k2ref: f64,
    columns: &[usize],
) -> f64 {
    let mut int_r = 0.0;
    let mut int_t = 0.0;
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for t in 1..times.len() {
        let dt = times[t] - times[t - 1];
        int_r += (reference[t - 1] + reference[t]) / 2.0 * dt;
        int_t += (tissue[t - 1] + tissue[t]) / 2.0 * dt;
        if columns.contains(&(t - 1)) {
            xs.push(int_r / tissue[t] + reference[t] / (k2ref * tissue[t]));
            ys.push(int_t / tissue[t]);
        }
    }
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let sxy: f64 = xs.iter().zip(&ys).map(|(x, y)| (x - mx) * (y - my)).sum();
    let sxx: f64 = xs.iter().map(|x| (x - mx) * (x - mx)).sum();
    sxy / sxx
}
