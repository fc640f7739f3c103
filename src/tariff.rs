//! Time-of-day tariff schedule.

use std::fmt;

use chrono::Timelike;
use serde::Serialize;

use crate::config::ConfigError;
use crate::error::Result;

/// Named time-of-day pricing band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    Low,
    Normal,
    High,
}

impl PriceTier {
    /// All tiers in legend order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Normal, Self::High];

    /// Hours covered by the tier, as shown in the tariff legend.
    pub fn hours_label(self) -> &'static str {
        match self {
            Self::Low => "00-06",
            Self::Normal => "11-16",
            Self::High => "06-11, 16-00",
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        })
    }
}

/// Price per kWh together with the tier it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceInfo {
    pub price: f64,
    pub tier: PriceTier,
}

/// Per-tier multipliers applied to the base price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierCoefficients {
    pub low: f64,
    pub normal: f64,
    pub high: f64,
}

impl Default for TierCoefficients {
    fn default() -> Self {
        Self {
            low: 0.8,
            normal: 1.0,
            high: 1.3,
        }
    }
}

impl TierCoefficients {
    pub fn get(&self, tier: PriceTier) -> f64 {
        match tier {
            PriceTier::Low => self.low,
            PriceTier::Normal => self.normal,
            PriceTier::High => self.high,
        }
    }
}

/// Fixed hour-of-day tariff policy.
///
/// | Hours          | Tier   |
/// |----------------|--------|
/// | `[0, 6)`       | LOW    |
/// | `[6, 11)`      | HIGH   |
/// | `[11, 16)`     | NORMAL |
/// | `[16, 24)`     | HIGH   |
///
/// # Examples
///
/// ```
/// use energy_dash::tariff::{PriceTier, TariffSchedule, TierCoefficients};
///
/// let tariff = TariffSchedule::new(1.0, TierCoefficients::default()).unwrap();
/// assert_eq!(tariff.price_info_for_hour(5).tier, PriceTier::Low);
/// assert_eq!(tariff.price_info_for_hour(6).tier, PriceTier::High);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TariffSchedule {
    base_price_per_kwh: f64,
    coefficients: TierCoefficients,
}

impl TariffSchedule {
    /// Creates a schedule from a base price and tier multipliers.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Config`](crate::error::DashError::Config) when the
    /// base price or any coefficient is not a finite positive number.
    pub fn new(base_price_per_kwh: f64, coefficients: TierCoefficients) -> Result<Self> {
        if !is_positive(base_price_per_kwh) {
            return Err(ConfigError::new("tariff.base_price_per_kwh", "must be > 0").into());
        }
        for (field, value) in [
            ("tariff.low", coefficients.low),
            ("tariff.normal", coefficients.normal),
            ("tariff.high", coefficients.high),
        ] {
            if !is_positive(value) {
                return Err(ConfigError::new(field, "must be > 0").into());
            }
        }
        Ok(Self {
            base_price_per_kwh,
            coefficients,
        })
    }

    pub fn base_price_per_kwh(&self) -> f64 {
        self.base_price_per_kwh
    }

    /// Tier for an hour of day. Hours past 23 wrap around the clock.
    pub fn tier_for_hour(hour: u32) -> PriceTier {
        match hour % 24 {
            0..6 => PriceTier::Low,
            11..16 => PriceTier::Normal,
            _ => PriceTier::High,
        }
    }

    /// Price per kWh within `tier`.
    pub fn price_for_tier(&self, tier: PriceTier) -> f64 {
        self.base_price_per_kwh * self.coefficients.get(tier)
    }

    /// Price and tier for an hour of day.
    pub fn price_info_for_hour(&self, hour: u32) -> PriceInfo {
        let tier = Self::tier_for_hour(hour);
        PriceInfo {
            price: self.price_for_tier(tier),
            tier,
        }
    }

    /// Price and tier at the hour of any wall-clock time.
    pub fn price_info_at(&self, time: &impl Timelike) -> PriceInfo {
        self.price_info_for_hour(time.hour())
    }
}

impl Default for TariffSchedule {
    fn default() -> Self {
        Self {
            base_price_per_kwh: 1.0,
            coefficients: TierCoefficients::default(),
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;

    #[test]
    fn tier_boundaries() {
        let cases = [
            (0, PriceTier::Low),
            (5, PriceTier::Low),
            (6, PriceTier::High),
            (10, PriceTier::High),
            (11, PriceTier::Normal),
            (15, PriceTier::Normal),
            (16, PriceTier::High),
            (23, PriceTier::High),
        ];
        for (hour, tier) in cases {
            assert_eq!(TariffSchedule::tier_for_hour(hour), tier, "hour {hour}");
        }
    }

    #[test]
    fn every_hour_maps_to_one_tier() {
        let tariff = TariffSchedule::default();
        let counts = PriceTier::ALL.map(|tier| {
            (0..24)
                .filter(|&h| tariff.price_info_for_hour(h).tier == tier)
                .count()
        });
        assert_eq!(counts, [6, 5, 13]);
    }

    #[test]
    fn price_is_base_times_coefficient() {
        let tariff = TariffSchedule::new(
            0.5,
            TierCoefficients {
                low: 0.5,
                normal: 1.0,
                high: 2.0,
            },
        )
        .unwrap();
        assert_eq!(tariff.price_info_for_hour(3).price, 0.25);
        assert_eq!(tariff.price_info_for_hour(12).price, 0.5);
        assert_eq!(tariff.price_info_for_hour(20).price, 1.0);
    }

    #[test]
    fn price_info_at_uses_hour_of_time() {
        let tariff = TariffSchedule::default();
        let time = NaiveTime::from_hms_opt(10, 59, 59).unwrap();
        assert_eq!(tariff.price_info_at(&time).tier, PriceTier::High);
    }

    #[test]
    fn rejects_non_positive_coefficients() {
        let coefficients = TierCoefficients {
            normal: 0.0,
            ..TierCoefficients::default()
        };
        assert!(TariffSchedule::new(1.0, coefficients).is_err());
        assert!(TariffSchedule::new(-1.0, TierCoefficients::default()).is_err());
        assert!(TariffSchedule::new(f64::NAN, TierCoefficients::default()).is_err());
    }

    #[test]
    fn hours_past_midnight_wrap() {
        assert_eq!(TariffSchedule::tier_for_hour(24), PriceTier::Low);
    }
}
