//! Summary statistics over records or buckets.

use std::fmt;

use serde::Serialize;

use super::bucket::Usage;
use crate::meter::{RawSample, available_dates};

/// Totals, peak and (for multi-day views) per-day averages.
///
/// Values are full precision; rounding is left to whoever renders them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_kwh: f64,
    pub total_cost: f64,
    /// Usage of the largest item, `0.0` for empty input. Not floored at
    /// zero, so preserved counter drops stay visible.
    pub peak_kwh: f64,
    /// Label of the first item reaching `peak_kwh`, `None` for empty input.
    pub peak_label: Option<String>,
    pub avg_daily_kwh: Option<f64>,
    pub avg_daily_cost: Option<f64>,
}

impl SummaryStats {
    /// Adds per-day averages over `days` distinct dates (at least one).
    #[must_use]
    pub fn with_daily_averages(mut self, days: usize) -> Self {
        let days = days.max(1) as f64;
        self.avg_daily_kwh = Some(self.total_kwh / days);
        self.avg_daily_cost = Some(self.total_cost / days);
        self
    }
}

/// Sums usage and cost and finds the first maximal item in a single scan.
pub fn summarize<T: Usage>(items: &[T]) -> SummaryStats {
    let mut stats = SummaryStats::default();
    let mut peak: Option<&T> = None;

    for item in items {
        stats.total_kwh += item.usage_kwh();
        stats.total_cost += item.cost();
        if peak.is_none_or(|p| item.usage_kwh() > p.usage_kwh()) {
            peak = Some(item);
        }
    }

    if let Some(peak) = peak {
        stats.peak_kwh = peak.usage_kwh();
        stats.peak_label = Some(peak.label());
    }
    stats
}

/// Summarizes per-day buckets and averages them over the distinct dates of
/// the raw sequence.
pub fn summarize_days<T: Usage>(samples: &[RawSample], days: &[T]) -> SummaryStats {
    summarize(days).with_daily_averages(available_dates(samples).len())
}

impl fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Summary ---")?;
        writeln!(f, "Total usage:     {:.2} kWh", self.total_kwh)?;
        writeln!(f, "Total cost:      {:.2}", self.total_cost)?;
        write!(
            f,
            "Peak usage:      {:.3} kWh at {}",
            self.peak_kwh,
            self.peak_label.as_deref().unwrap_or("-")
        )?;
        if let (Some(kwh), Some(cost)) = (self.avg_daily_kwh, self.avg_daily_cost) {
            writeln!(f)?;
            writeln!(f, "Daily average:   {kwh:.2} kWh")?;
            write!(f, "Daily avg cost:  {cost:.2}")?;
        }
        Ok(())
    }
}
