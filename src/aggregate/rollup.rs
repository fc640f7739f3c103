//! Hourly and daily rollups of interval records.

use std::collections::BTreeMap;

use chrono::Timelike;
use serde::Serialize;

use super::bucket::{DailyBucket, HourlyBucket};
use crate::error::Result;
use crate::meter::{IntervalRecord, RawSample, UsageDeriver};

/// Sums interval records per hour of day, ascending by hour.
///
/// The bucket tier is the tier of its first record. Tiers are hour-aligned,
/// so every record of a bucket shares it; finer-grained tier boundaries would
/// make this wrong.
pub fn aggregate_hourly(records: &[IntervalRecord]) -> Vec<HourlyBucket> {
    let mut buckets: BTreeMap<u32, HourlyBucket> = BTreeMap::new();
    for record in records {
        let hour = record.timestamp.hour();
        let bucket = buckets.entry(hour).or_insert(HourlyBucket {
            hour,
            usage_kwh: 0.0,
            cost: 0.0,
            tier: record.tier,
        });
        bucket.usage_kwh += record.usage_kwh;
        bucket.cost += record.cost;
    }
    buckets.into_values().collect()
}

/// Sums the deltas of the whole sample sequence per date, ascending by date.
///
/// # Errors
///
/// Propagates integrity errors from the deriver.
pub fn aggregate_daily(samples: &[RawSample], deriver: &UsageDeriver) -> Result<Vec<DailyBucket>> {
    let mut buckets = BTreeMap::new();
    for record in deriver.derive_all(samples)? {
        let date = record.date();
        let bucket = buckets.entry(date).or_insert(DailyBucket {
            date,
            usage_kwh: 0.0,
            cost: 0.0,
        });
        bucket.usage_kwh += record.usage_kwh;
        bucket.cost += record.cost;
    }
    Ok(buckets.into_values().collect())
}

/// Energy and cost over the entire dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HistoricalTotals {
    pub total_kwh: f64,
    pub total_cost: f64,
}

/// Reduces the whole dataset to its total energy and cost.
///
/// # Errors
///
/// Propagates integrity errors from the deriver.
pub fn historical_totals(
    samples: &[RawSample],
    deriver: &UsageDeriver,
) -> Result<HistoricalTotals> {
    let totals = deriver
        .derive_all(samples)?
        .iter()
        .fold(HistoricalTotals::default(), |acc, r| HistoricalTotals {
            total_kwh: acc.total_kwh + r.usage_kwh,
            total_cost: acc.total_cost + r.cost,
        });
    Ok(totals)
}
