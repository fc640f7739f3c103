//! Coarse time buckets and the shared view over anything carrying usage.

use chrono::NaiveDate;

use crate::meter::IntervalRecord;
use crate::meter::sample::DATE_FORMAT;
use crate::tariff::PriceTier;

/// Anything with a display label, an energy amount and a cost.
pub trait Usage {
    fn label(&self) -> String;
    fn usage_kwh(&self) -> f64;
    fn cost(&self) -> f64;
}

/// Sum of the interval records closing within one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyBucket {
    /// Hour of day, `0..24`.
    pub hour: u32,
    pub usage_kwh: f64,
    pub cost: f64,
    pub tier: PriceTier,
}

/// Sum of all interval records closing on one date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub usage_kwh: f64,
    pub cost: f64,
}

/// A bucket of either granularity. Only hourly buckets carry a tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bucket {
    Hourly(HourlyBucket),
    Daily(DailyBucket),
}

impl Bucket {
    pub fn tier(&self) -> Option<PriceTier> {
        match self {
            Self::Hourly(b) => Some(b.tier),
            Self::Daily(_) => None,
        }
    }
}

impl From<HourlyBucket> for Bucket {
    fn from(bucket: HourlyBucket) -> Self {
        Self::Hourly(bucket)
    }
}

impl From<DailyBucket> for Bucket {
    fn from(bucket: DailyBucket) -> Self {
        Self::Daily(bucket)
    }
}

impl Usage for IntervalRecord {
    fn label(&self) -> String {
        self.time_label()
    }

    fn usage_kwh(&self) -> f64 {
        self.usage_kwh
    }

    fn cost(&self) -> f64 {
        self.cost
    }
}

impl Usage for HourlyBucket {
    fn label(&self) -> String {
        format!("{:02}:00", self.hour)
    }

    fn usage_kwh(&self) -> f64 {
        self.usage_kwh
    }

    fn cost(&self) -> f64 {
        self.cost
    }
}

impl Usage for DailyBucket {
    fn label(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    fn usage_kwh(&self) -> f64 {
        self.usage_kwh
    }

    fn cost(&self) -> f64 {
        self.cost
    }
}

impl Usage for Bucket {
    fn label(&self) -> String {
        match self {
            Self::Hourly(b) => b.label(),
            Self::Daily(b) => b.label(),
        }
    }

    fn usage_kwh(&self) -> f64 {
        match self {
            Self::Hourly(b) => b.usage_kwh,
            Self::Daily(b) => b.usage_kwh,
        }
    }

    fn cost(&self) -> f64 {
        match self {
            Self::Hourly(b) => b.cost,
            Self::Daily(b) => b.cost,
        }
    }
}
