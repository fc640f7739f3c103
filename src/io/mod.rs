//! Meter dataset loading and CSV export.

pub mod dataset;
pub mod export;
