//! Multi-granularity rollups and summary statistics.

pub mod bucket;
pub mod rollup;
pub mod summary;

pub use bucket::{Bucket, DailyBucket, HourlyBucket, Usage};
pub use rollup::{HistoricalTotals, aggregate_daily, aggregate_hourly, historical_totals};
pub use summary::{SummaryStats, summarize, summarize_days};
