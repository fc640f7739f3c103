//! Meter samples and the usage derived from them.

pub mod deriver;
/// Cumulative meter readings and timestamp parsing.
pub mod sample;

pub use deriver::{IntegrityPolicy, IntervalRecord, UsageDeriver};
pub use sample::{RawSample, available_dates};
