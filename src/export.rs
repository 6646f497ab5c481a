//! Append-only CSV results log.
//!
//! One row per finished trial:
//!
//! ```text
//! timestamp,mode,t_real,t_human,delta_t
//! 2026-03-01T12:00:00+00:00,Linear+Norm,0.415,0.38,0.035
//! 2026-03-01T12:05:00+00:00,Linear+Norm,0.42,inf,
//! ```
//!
//! `t_real` is the detector's death time, `mode` the transform variant
//! under test. Absent values are empty fields; a timeout is `inf`.
//!
//! [`ResultsLog::summary`] reads the log back and reduces the anticipated
//! trials (rows with a finite `delta_t`) to a count, mean and median.

use std::fs::{File, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::experiment::ResultRecord;
use crate::{Error, Result};

pub const HEADER: [&str; 5] = ["timestamp", "mode", "t_real", "t_human", "delta_t"];

/// Results file handle. Every append reopens the file, so rows written
/// by earlier runs are never touched.
#[derive(Debug, Clone)]
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    /// Create (or truncate) the file and write the header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut writer = csv::Writer::from_writer(File::create(&path)?);
        writer.write_record(HEADER)?;
        writer.flush()?;
        Ok(Self { path })
    }

    /// Use an existing file as-is, writing the header only if it is new or empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let fresh = std::fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        if fresh {
            return Self::create(path);
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one trial stamped with the current time.
    pub fn append(&self, mode: &str, record: &ResultRecord) -> Result<()> {
        self.append_at(Utc::now(), mode, record)
    }

    pub fn append_at(&self, at: DateTime<Utc>, mode: &str, record: &ResultRecord) -> Result<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(format_row(at, mode, record))?;
        writer.flush()?;
        Ok(())
    }

    /// Summarize `delta_t` over every row written so far.
    pub fn summary(&self) -> Result<Option<DeltaSummary>> {
        summarize(File::open(&self.path)?)
    }
}

/// Statistics over the finite `delta_t` values of a results log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
}

impl DeltaSummary {
    /// `None` for an empty sample.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let mid = count / 2;
        let median = if count.is_multiple_of(2) {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        };
        Some(Self { count, mean, median })
    }
}

impl std::fmt::Display for DeltaSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n={} mean={:.4} median={:.4}", self.count, self.mean, self.median)
    }
}

/// Read a results CSV and summarize its `delta_t` column. Empty fields
/// and `inf` are skipped; anything else that is not a number is an error.
pub fn summarize(input: impl Read) -> Result<Option<DeltaSummary>> {
    let mut reader = csv::Reader::from_reader(input);
    let column = reader
        .headers()?
        .iter()
        .position(|h| h == "delta_t")
        .ok_or_else(|| Error::MalformedResults("no delta_t column".to_string()))?;

    let mut deltas = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let field = record.get(column).unwrap_or_default().trim();
        if field.is_empty() {
            continue;
        }
        let value: f64 = field.parse().map_err(|_| {
            Error::MalformedResults(format!("row {}: delta_t '{field}' is not a number", row + 1))
        })?;
        if value.is_finite() {
            deltas.push(value);
        }
    }
    Ok(DeltaSummary::from_values(deltas))
}

/// Render one record as the five CSV fields.
pub fn format_row(at: DateTime<Utc>, mode: &str, record: &ResultRecord) -> [String; 5] {
    [
        at.to_rfc3339(),
        mode.to_string(),
        format_opt(record.t_death),
        record.t_human.time().to_string(),
        format_opt(record.delta_t),
    ]
}

fn format_opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}
