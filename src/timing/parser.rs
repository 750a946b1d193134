//! Delimited-text reading and writing of frame timing tables
//!
//! Timing tables come from scanner exports and hand-edited spreadsheets, so
//! the delimiter is not trusted: the primary parse uses `,` and, when that
//! yields fewer than four columns, the delimiter is guessed from the first
//! line. Columns are matched by header name when a header names all of
//! `frame`, `start`, `duration` and `stop`; otherwise they are positional
//! `[frame, start, duration, stop]`.

use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};

use super::error::TimingError;
use super::table::{FrameTime, FrameTimeTable, TimeUnit};

/// Header written by [`write_frametimes`]
pub const HEADER: [&str; 4] = ["frame", "start", "stop", "duration"];

const REQUIRED_COLUMNS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Delimiter {
    Byte(u8),
    Whitespace,
}

const FALLBACK_DELIMITERS: [Delimiter; 4] = [
    Delimiter::Byte(b';'),
    Delimiter::Byte(b'\t'),
    Delimiter::Byte(b'|'),
    Delimiter::Whitespace,
];

/// Read a timing table whose values are expressed in `unit`
///
/// # Example
///
/// ```rust,no_run
/// use petga::timing::{read_frametimes, TimeUnit};
///
/// let table = read_frametimes("frametimes.csv", TimeUnit::Seconds).unwrap();
/// println!("{} frames", table.len());
/// ```
pub fn read_frametimes(
    path: impl AsRef<Path>,
    unit: TimeUnit,
) -> Result<FrameTimeTable, TimingError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| TimingError::csv(path, e))?;
    parse_frametimes_from(&text, unit, path)
}

/// Parse a timing table from in-memory text
pub fn parse_frametimes(text: &str, unit: TimeUnit) -> Result<FrameTimeTable, TimingError> {
    parse_frametimes_from(text, unit, Path::new("<memory>"))
}

fn parse_frametimes_from(
    text: &str,
    unit: TimeUnit,
    path: &Path,
) -> Result<FrameTimeTable, TimingError> {
    let mut records = split_records(text, Delimiter::Byte(b','), path)?;

    if column_count(&records) < REQUIRED_COLUMNS {
        let mut best = (column_count(&records), records);
        for delimiter in FALLBACK_DELIMITERS {
            let candidate = split_records(text, delimiter, path)?;
            let n = column_count(&candidate);
            if n > best.0 {
                best = (n, candidate);
            }
        }
        if best.0 < REQUIRED_COLUMNS {
            return Err(TimingError::malformed(
                path,
                format!(
                    "expected at least {} columns, found {} after delimiter fallback",
                    REQUIRED_COLUMNS, best.0
                ),
            ));
        }
        tracing::debug!("{}: primary delimiter failed, using guessed delimiter", path.display());
        records = best.1;
    }

    let has_header = records
        .first()
        .and_then(|r| r.first())
        .map(|field| field.parse::<f64>().is_err())
        .unwrap_or(false);

    let columns = if has_header {
        columns_from_header(&records[0]).unwrap_or([0, 1, 2, 3])
    } else {
        [0, 1, 2, 3]
    };

    let body = if has_header { &records[1..] } else { &records[..] };
    if body.is_empty() {
        return Err(TimingError::malformed(path, "no frame rows"));
    }

    let mut frames = Vec::with_capacity(body.len());
    for (i, record) in body.iter().enumerate() {
        let row = i + 1 + usize::from(has_header);
        let value = |col: usize, name: &str| -> Result<f64, TimingError> {
            let field = record.get(col).ok_or_else(|| {
                TimingError::malformed(path, format!("row {}: missing {} column", row, name))
            })?;
            field.parse::<f64>().map_err(|_| {
                TimingError::malformed(path, format!("row {}: {} '{}' is not numeric", row, name, field))
            })
        };

        let frame = value(columns[0], "frame")?;
        if frame < 0.0 || frame.fract() != 0.0 {
            return Err(TimingError::malformed(
                path,
                format!("row {}: frame index {} is not a non-negative integer", row, frame),
            ));
        }
        frames.push(FrameTime::new(
            frame as usize,
            value(columns[1], "start")?,
            value(columns[2], "duration")?,
            value(columns[3], "stop")?,
        ));
    }

    FrameTimeTable::new(frames, unit)
}

/// Write `table` with header `frame,start,stop,duration`
pub fn write_frametimes(table: &FrameTimeTable, path: impl AsRef<Path>) -> Result<(), TimingError> {
    let path = path.as_ref();
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| TimingError::csv(path, e))?;

    writer
        .write_record(HEADER)
        .map_err(|e| TimingError::csv(path, e))?;
    for f in table.frames() {
        writer
            .write_record([
                f.frame.to_string(),
                f.start.to_string(),
                f.stop.to_string(),
                f.duration.to_string(),
            ])
            .map_err(|e| TimingError::csv(path, e))?;
    }
    writer.flush().map_err(|e| TimingError::csv(path, e))?;
    Ok(())
}

fn split_records(
    text: &str,
    delimiter: Delimiter,
    path: &Path,
) -> Result<Vec<Vec<String>>, TimingError> {
    let mut records: Vec<Vec<String>> = match delimiter {
        Delimiter::Whitespace => text
            .lines()
            .map(|line| line.split_whitespace().map(str::to_string).collect())
            .collect(),
        Delimiter::Byte(byte) => {
            let mut reader = ReaderBuilder::new()
                .has_headers(false)
                .delimiter(byte)
                .flexible(true)
                .trim(Trim::All)
                .comment(Some(b'#'))
                .from_reader(text.as_bytes());
            let mut out = Vec::new();
            for record in reader.records() {
                let record = record.map_err(|e| TimingError::csv(path, e))?;
                out.push(record.iter().map(str::to_string).collect());
            }
            out
        }
    };

    for record in &mut records {
        while record.last().is_some_and(|f| f.is_empty()) {
            record.pop();
        }
    }
    records.retain(|r| !r.is_empty());
    Ok(records)
}

fn column_count(records: &[Vec<String>]) -> usize {
    records.first().map(Vec::len).unwrap_or(0)
}

fn columns_from_header(header: &[String]) -> Option<[usize; 4]> {
    let find = |names: &[&str]| {
        header
            .iter()
            .position(|h| names.contains(&h.to_lowercase().as_str()))
    };
    Some([
        find(&["frame", "frame_number", "framenumber"])?,
        find(&["start", "start_time"])?,
        find(&["duration", "dur"])?,
        find(&["stop", "end", "stop_time"])?,
    ])
}
