use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::TimingError;

/// Absolute tolerance for the `stop == start + duration` check
pub const STOP_TOLERANCE: f64 = 1e-6;

/// Unit of the time-valued columns of a [`FrameTimeTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Scanner-native unit (ECAT subheaders)
    Milliseconds,
    #[default]
    Seconds,
    Minutes,
}

impl TimeUnit {
    fn milliseconds(self) -> f64 {
        match self {
            TimeUnit::Milliseconds => 1.0,
            TimeUnit::Seconds => 1000.0,
            TimeUnit::Minutes => 60_000.0,
        }
    }

    /// Multiplicative factor converting a value in `self` into `target`
    ///
    /// ```rust
    /// use petga::timing::TimeUnit;
    ///
    /// assert_eq!(TimeUnit::Milliseconds.factor_to(TimeUnit::Seconds), 1.0 / 1000.0);
    /// assert_eq!(TimeUnit::Seconds.factor_to(TimeUnit::Minutes), 1.0 / 60.0);
    /// ```
    pub fn factor_to(self, target: TimeUnit) -> f64 {
        if self == target {
            1.0
        } else {
            self.milliseconds() / target.milliseconds()
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "sec",
            TimeUnit::Minutes => "min",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ms" | "msec" | "millisecond" | "milliseconds" => Ok(TimeUnit::Milliseconds),
            "s" | "sec" | "second" | "seconds" => Ok(TimeUnit::Seconds),
            "m" | "min" | "minute" | "minutes" => Ok(TimeUnit::Minutes),
            other => Err(format!("unknown time unit '{}'", other)),
        }
    }
}

/// Timing of a single acquisition frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameTime {
    pub frame: usize,
    pub start: f64,
    pub duration: f64,
    pub stop: f64,
}

impl FrameTime {
    pub fn new(frame: usize, start: f64, duration: f64, stop: f64) -> Self {
        Self {
            frame,
            start,
            duration,
            stop,
        }
    }

    /// `start + duration / 2`
    #[inline]
    pub fn midframe(&self) -> f64 {
        self.start + self.duration / 2.0
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            frame: self.frame,
            start: self.start * factor,
            duration: self.duration * factor,
            stop: self.stop * factor,
        }
    }

    fn stop_mismatch(&self) -> Option<TimingWarning> {
        let expected = self.start + self.duration;
        if (self.stop - expected).abs() > STOP_TOLERANCE {
            Some(TimingWarning::StopMismatch {
                frame: self.frame,
                stop: self.stop,
                expected,
            })
        } else {
            None
        }
    }
}

/// Data-integrity findings that do not invalidate a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimingWarning {
    /// `stop` and `start + duration` disagree beyond [`STOP_TOLERANCE`]
    StopMismatch { frame: usize, stop: f64, expected: f64 },
}

impl fmt::Display for TimingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingWarning::StopMismatch {
                frame,
                stop,
                expected,
            } => write!(
                f,
                "frame {}: stop {} differs from start + duration ({})",
                frame, stop, expected
            ),
        }
    }
}

impl From<&TimingWarning> for TimingError {
    fn from(warning: &TimingWarning) -> Self {
        match *warning {
            TimingWarning::StopMismatch {
                frame,
                stop,
                expected,
            } => TimingError::StopMismatch {
                frame,
                stop,
                expected,
            },
        }
    }
}

/// Ordered, validated per-frame timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameTimeTable {
    frames: Vec<FrameTime>,
    unit: TimeUnit,
    warnings: Vec<TimingWarning>,
}

impl FrameTimeTable {
    /// Build a table from rows in any order
    ///
    /// Rows are sorted by frame index. Duplicate indices and decreasing start
    /// times are rejected; stop mismatches are kept as [`TimingWarning`]s.
    pub fn new(mut frames: Vec<FrameTime>, unit: TimeUnit) -> Result<Self, TimingError> {
        frames.sort_by_key(|f| f.frame);

        let mut seen = HashSet::with_capacity(frames.len());
        for f in &frames {
            if !seen.insert(f.frame) {
                return Err(TimingError::DuplicateFrame { frame: f.frame });
            }
        }

        for pair in frames.windows(2) {
            if pair[1].start < pair[0].start {
                return Err(TimingError::UnorderedFrames {
                    frame: pair[1].frame,
                    start: pair[1].start,
                    previous: pair[0].start,
                });
            }
        }

        let warnings = collect_warnings(&frames);
        for w in &warnings {
            tracing::warn!("timing integrity: {}", w);
        }

        Ok(Self {
            frames,
            unit,
            warnings,
        })
    }

    /// Build a table from `(start, duration, stop)` rows, numbering frames from 1
    pub fn from_intervals(rows: &[(f64, f64, f64)], unit: TimeUnit) -> Result<Self, TimingError> {
        let frames = rows
            .iter()
            .enumerate()
            .map(|(i, &(start, duration, stop))| FrameTime::new(i + 1, start, duration, stop))
            .collect();
        Self::new(frames, unit)
    }

    /// Reject the table if any integrity warning was raised
    pub fn strict(self) -> Result<Self, TimingError> {
        match self.warnings.first() {
            Some(w) => Err(w.into()),
            None => Ok(self),
        }
    }

    pub fn frames(&self) -> &[FrameTime] {
        &self.frames
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn warnings(&self) -> &[TimingWarning] {
        &self.warnings
    }

    /// Midframe times, in the table's unit
    pub fn midframes(&self) -> Array1<f64> {
        self.frames.iter().map(FrameTime::midframe).collect()
    }

    pub fn starts(&self) -> Array1<f64> {
        self.frames.iter().map(|f| f.start).collect()
    }

    pub fn durations(&self) -> Array1<f64> {
        self.frames.iter().map(|f| f.duration).collect()
    }

    pub fn stops(&self) -> Array1<f64> {
        self.frames.iter().map(|f| f.stop).collect()
    }

    /// Start times expressed in `unit`
    pub fn starts_in(&self, unit: TimeUnit) -> Array1<f64> {
        self.starts() * self.unit.factor_to(unit)
    }

    /// Stop times expressed in `unit`
    pub fn stops_in(&self, unit: TimeUnit) -> Array1<f64> {
        self.stops() * self.unit.factor_to(unit)
    }

    /// Rescale every time-valued column into `target`
    pub fn to_unit(&self, target: TimeUnit) -> Self {
        let factor = self.unit.factor_to(target);
        let frames: Vec<FrameTime> = self.frames.iter().map(|f| f.scaled(factor)).collect();
        let warnings = collect_warnings(&frames);
        Self {
            frames,
            unit: target,
            warnings,
        }
    }
}

fn collect_warnings(frames: &[FrameTime]) -> Vec<TimingWarning> {
    frames.iter().filter_map(FrameTime::stop_mismatch).collect()
}
