//! CSV loader for cumulative meter readings.
//!
//! Expected layout, one reading per row:
//!
//! ```text
//! timestamp,cumulative_wh
//! 2025-06-02 00:15,12.5
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::meter::{RawSample, available_dates};

#[derive(Debug, Deserialize)]
struct Row {
    timestamp: String,
    cumulative_wh: f64,
}

/// Loads meter readings from a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or any row is malformed.
pub fn load_csv(path: &Path) -> Result<Vec<RawSample>> {
    let samples = read_csv(File::open(path)?)?;
    let dates = available_dates(&samples);
    info!(
        path = %path.display(),
        samples = samples.len(),
        first = ?dates.first(),
        last = ?dates.last(),
        "dataset loaded"
    );
    Ok(samples)
}

/// Reads meter readings from any CSV source, sorted by timestamp.
///
/// A malformed timestamp fails the whole load rather than being skipped.
///
/// # Errors
///
/// Returns [`DashError::Csv`](crate::error::DashError::Csv) for unreadable
/// rows and [`DashError::Timestamp`](crate::error::DashError::Timestamp) for
/// malformed timestamps.
pub fn read_csv(reader: impl Read) -> Result<Vec<RawSample>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut samples = rdr
        .deserialize::<Row>()
        .map(|row| {
            let row = row?;
            RawSample::parse(&row.timestamp, row.cumulative_wh)
        })
        .collect::<Result<Vec<_>>>()?;

    if !samples.is_sorted_by_key(|s| s.timestamp) {
        warn!("dataset rows out of order; sorting by timestamp");
        samples.sort_by_key(|s| s.timestamp);
    }
    Ok(samples)
}
