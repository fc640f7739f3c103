//! Crate-wide error type.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while loading, deriving, or configuring the dashboard core.
#[derive(Debug, Error)]
pub enum DashError {
    /// A cumulative counter went backwards between two consecutive samples.
    #[error(
        "data integrity violation at {at}: counter dropped from {previous_wh} Wh to {current_wh} Wh"
    )]
    DataIntegrity {
        /// Timestamp of the closing sample of the offending interval.
        at: NaiveDateTime,
        /// Cumulative reading of the opening sample.
        previous_wh: f64,
        /// Cumulative reading of the closing sample.
        current_wh: f64,
    },

    #[error("malformed timestamp \"{input}\": {source}")]
    Timestamp {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T, E = DashError> = std::result::Result<T, E>;
