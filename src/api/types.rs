//! API response and query types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Bucket, HistoricalTotals, SummaryStats, Usage};
use crate::meter::IntervalRecord;
use crate::sim::live::{LiveSample, LiveSnapshot, format_power};
use crate::tariff::{PriceInfo, PriceTier};

/// Optional day selection; defaults to the first available date.
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    /// `YYYY-MM-DD`.
    pub date: Option<String>,
}

/// Interval records of one day with its stats.
#[derive(Debug, Serialize)]
pub struct DailyResponse {
    pub date: NaiveDate,
    pub records: Vec<RecordEntry>,
    pub summary: SummaryStats,
}

/// Hourly buckets of one day with its stats.
#[derive(Debug, Serialize)]
pub struct HourlyResponse {
    pub date: NaiveDate,
    pub buckets: Vec<BucketEntry>,
    pub summary: SummaryStats,
}

/// Per-day buckets of the whole dataset.
#[derive(Debug, Serialize)]
pub struct WeeklyResponse {
    pub days: Vec<BucketEntry>,
    pub summary: SummaryStats,
}

#[derive(Debug, Serialize)]
pub struct RecordEntry {
    /// `HH:MM` of the closing sample.
    pub time: String,
    pub usage_kwh: f64,
    pub cost: f64,
    pub tier: PriceTier,
}

impl From<&IntervalRecord> for RecordEntry {
    fn from(r: &IntervalRecord) -> Self {
        Self {
            time: r.time_label(),
            usage_kwh: r.usage_kwh,
            cost: r.cost,
            tier: r.tier,
        }
    }
}

/// Hourly or daily bucket; `tier` is only present for hourly buckets.
#[derive(Debug, Serialize)]
pub struct BucketEntry {
    pub label: String,
    pub usage_kwh: f64,
    pub cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<PriceTier>,
}

impl From<&Bucket> for BucketEntry {
    fn from(b: &Bucket) -> Self {
        Self {
            label: b.label(),
            usage_kwh: b.usage_kwh(),
            cost: b.cost(),
            tier: b.tier(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LivePoint {
    /// `HH:MM:SS`.
    pub time: String,
    pub power_w: f64,
}

impl From<&LiveSample> for LivePoint {
    fn from(s: &LiveSample) -> Self {
        Self {
            time: s.time_label(),
            power_w: s.power_w,
        }
    }
}

/// Latest live state, oldest history point first.
#[derive(Debug, Serialize)]
pub struct LiveResponse {
    pub current_power_w: f64,
    /// Current power formatted for display, e.g. `"2.15 kW"`.
    pub current_power: String,
    pub history: Vec<LivePoint>,
    pub simulated_kwh: f64,
    pub simulated_cost: f64,
    /// Historical totals plus simulated energy and cost.
    pub grand_totals: HistoricalTotals,
    pub price: PriceInfo,
}

impl LiveResponse {
    pub fn new(snapshot: &LiveSnapshot, historical: &HistoricalTotals, price: PriceInfo) -> Self {
        Self {
            current_power_w: snapshot.current_power_w,
            current_power: format_power(snapshot.current_power_w),
            history: snapshot.history.iter().map(LivePoint::from).collect(),
            simulated_kwh: snapshot.simulated_kwh,
            simulated_cost: snapshot.simulated_cost,
            grand_totals: snapshot.grand_totals(historical),
            price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub price: f64,
    pub tier: PriceTier,
    /// Hours the tier covers, e.g. `"00-06"`.
    pub hours: &'static str,
}

impl From<PriceInfo> for PriceResponse {
    fn from(info: PriceInfo) -> Self {
        Self {
            price: info.price,
            tier: info.tier,
            hours: info.tier.hours_label(),
        }
    }
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
