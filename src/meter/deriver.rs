//! Per-interval usage, cost and tier derived from cumulative meter samples.

use chrono::{NaiveDate, NaiveDateTime};
use itertools::Itertools;
use serde::Deserialize;
use tracing::warn;

use super::sample::RawSample;
use crate::error::{DashError, Result};
use crate::tariff::{PriceInfo, PriceTier, TariffSchedule};

/// What to do when a cumulative counter goes backwards.
///
/// Negative deltas are never clamped: they either flow through unchanged so
/// callers can see them, or abort the derivation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityPolicy {
    /// Emit the negative usage as-is and log a warning.
    #[default]
    Preserve,
    /// Fail with [`DashError::DataIntegrity`].
    Reject,
}

/// Usage and cost for the span between two consecutive samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalRecord {
    /// Timestamp of the closing sample; it also governs the tier.
    pub timestamp: NaiveDateTime,
    pub usage_kwh: f64,
    pub cost: f64,
    pub tier: PriceTier,
}

impl IntervalRecord {
    /// `"HH:MM"` label of the closing sample.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Converts cumulative samples into priced interval records.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageDeriver {
    tariff: TariffSchedule,
    policy: IntegrityPolicy,
}

impl UsageDeriver {
    pub fn new(tariff: TariffSchedule, policy: IntegrityPolicy) -> Self {
        Self { tariff, policy }
    }

    pub fn tariff(&self) -> &TariffSchedule {
        &self.tariff
    }

    pub fn policy(&self) -> IntegrityPolicy {
        self.policy
    }

    /// Derives the interval records of a single day.
    ///
    /// The last sample of the previous day, when present, is used as the
    /// opening boundary of the day's first interval. Without it the first
    /// sample of the day only opens the second interval, so a lone sample
    /// yields nothing. `samples` must already be sorted by timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::DataIntegrity`] for a negative delta under
    /// [`IntegrityPolicy::Reject`].
    pub fn derive_day(
        &self,
        samples: &[RawSample],
        date: NaiveDate,
    ) -> Result<Vec<IntervalRecord>> {
        let Some(first) = samples.iter().position(|s| s.date() == date) else {
            return Ok(Vec::new());
        };
        let boundary = first.checked_sub(1).map(|i| &samples[i]);
        let day = samples.iter().filter(|s| s.date() == date);

        boundary
            .into_iter()
            .chain(day)
            .tuple_windows()
            .map(|(prev, curr)| self.interval(prev, curr))
            .collect()
    }

    /// Derives interval records across the whole sequence; the first sample
    /// only opens the first interval.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::DataIntegrity`] for a negative delta under
    /// [`IntegrityPolicy::Reject`].
    pub fn derive_all(&self, samples: &[RawSample]) -> Result<Vec<IntervalRecord>> {
        samples
            .iter()
            .tuple_windows()
            .map(|(prev, curr)| self.interval(prev, curr))
            .collect()
    }

    fn interval(&self, prev: &RawSample, curr: &RawSample) -> Result<IntervalRecord> {
        let usage_kwh = (curr.cumulative_wh - prev.cumulative_wh) / 1000.0;
        if usage_kwh < 0.0 {
            match self.policy {
                IntegrityPolicy::Reject => {
                    return Err(DashError::DataIntegrity {
                        at: curr.timestamp,
                        previous_wh: prev.cumulative_wh,
                        current_wh: curr.cumulative_wh,
                    });
                }
                IntegrityPolicy::Preserve => warn!(
                    at = %curr.timestamp,
                    previous_wh = prev.cumulative_wh,
                    current_wh = curr.cumulative_wh,
                    "meter counter decreased; keeping negative usage"
                ),
            }
        }

        let PriceInfo { price, tier } = self.tariff.price_info_for_hour(curr.hour());
        Ok(IntervalRecord {
            timestamp: curr.timestamp,
            usage_kwh,
            cost: usage_kwh * price,
            tier,
        })
    }
}
