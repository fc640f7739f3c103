use chrono::{NaiveDate, NaiveDateTime, Timelike};
use itertools::Itertools;

use crate::error::{DashError, Result};

/// Timestamp layout used by the meter dataset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Date layout used for day selection.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A cumulative meter reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub timestamp: NaiveDateTime,
    /// Energy consumed since an arbitrary reference point (Wh).
    pub cumulative_wh: f64,
}

impl RawSample {
    pub fn new(timestamp: NaiveDateTime, cumulative_wh: f64) -> Self {
        Self {
            timestamp,
            cumulative_wh,
        }
    }

    /// Builds a sample from a `"YYYY-MM-DD HH:MM"` timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Timestamp`] when the timestamp does not match the layout.
    pub fn parse(timestamp: &str, cumulative_wh: f64) -> Result<Self> {
        Ok(Self::new(parse_timestamp(timestamp)?, cumulative_wh))
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

/// Parses a `"YYYY-MM-DD HH:MM"` timestamp.
///
/// # Errors
///
/// Returns [`DashError::Timestamp`] on any deviation from the layout.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), TIMESTAMP_FORMAT).map_err(|source| {
        DashError::Timestamp {
            input: input.to_string(),
            source,
        }
    })
}

/// Parses a `"YYYY-MM-DD"` date.
///
/// # Errors
///
/// Returns [`DashError::Timestamp`] on any deviation from the layout.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|source| DashError::Timestamp {
        input: input.to_string(),
        source,
    })
}

/// Distinct sample dates in first-seen order.
pub fn available_dates(samples: &[RawSample]) -> Vec<NaiveDate> {
    samples.iter().map(RawSample::date).unique().collect()
}
