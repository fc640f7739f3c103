//! TOML-based dashboard configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::error::Result;
use crate::meter::{IntegrityPolicy, UsageDeriver};
use crate::sim::appliance::{ApplianceProfile, default_appliances};
use crate::tariff::{TariffSchedule, TierCoefficients};

/// Top-level dashboard configuration parsed from TOML.
///
/// All fields have defaults matching the baseline preset. Load from TOML
/// with [`DashboardConfig::from_toml_file`] or use
/// [`DashboardConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Base price and tier multipliers.
    #[serde(default)]
    pub tariff: TariffConfig,
    /// Live simulation timing.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Historical dataset handling.
    #[serde(default)]
    pub data: DataConfig,
    /// Appliances the live simulator may switch on.
    #[serde(default = "default_appliances")]
    pub appliances: Vec<ApplianceProfile>,
}

/// Base price and tier multipliers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    /// Price per kWh before the tier multiplier.
    pub base_price_per_kwh: f64,
    pub low: f64,
    pub normal: f64,
    pub high: f64,
}

impl Default for TariffConfig {
    fn default() -> Self {
        let TierCoefficients { low, normal, high } = TierCoefficients::default();
        Self {
            base_price_per_kwh: 1.0,
            low,
            normal,
            high,
        }
    }
}

/// Live simulation timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Seconds between simulator ticks (must be > 0).
    pub tick_period_secs: f64,
    /// Number of live samples kept for the chart (must be > 0).
    pub history_capacity: usize,
    /// Seconds between current-price refreshes (must be > 0).
    pub price_refresh_secs: f64,
    /// Random seed; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_period_secs: 2.5,
            history_capacity: 24,
            price_refresh_secs: 60.0,
            seed: None,
        }
    }
}

/// Historical dataset handling.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// What to do with a meter counter that goes backwards.
    pub integrity: IntegrityPolicy,
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.tick_period_secs"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl DashboardConfig {
    /// Returns the baseline configuration.
    pub fn baseline() -> Self {
        Self {
            tariff: TariffConfig::default(),
            simulation: SimulationConfig::default(),
            data: DataConfig::default(),
            appliances: default_appliances(),
        }
    }

    /// Returns the busy-household preset: appliances switch on far more often.
    pub fn busy_household() -> Self {
        let appliances = default_appliances()
            .into_iter()
            .map(|profile| ApplianceProfile {
                activation_probability: (profile.activation_probability * 4.0).min(0.5),
                ..profile
            })
            .chain([ApplianceProfile::new("Washing machine", 2200.0, 24, 0.01)])
            .collect();
        Self {
            appliances,
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "busy_household"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "busy_household" => Ok(Self::busy_household()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let t = &self.tariff;
        for (field, value) in [
            ("tariff.base_price_per_kwh", t.base_price_per_kwh),
            ("tariff.low", t.low),
            ("tariff.normal", t.normal),
            ("tariff.high", t.high),
        ] {
            if !(value.is_finite() && value > 0.0) {
                errors.push(ConfigError::new(field, "must be > 0"));
            }
        }

        let s = &self.simulation;
        if let Err(e) = self.tick_period() {
            errors.push(e);
        }
        if let Err(e) = self.price_refresh() {
            errors.push(e);
        }
        if s.history_capacity == 0 {
            errors.push(ConfigError::new("simulation.history_capacity", "must be > 0"));
        }

        let mut names = HashSet::new();
        for (i, appliance) in self.appliances.iter().enumerate() {
            if !names.insert(appliance.name.as_str()) {
                errors.push(ConfigError::new(
                    format!("appliances[{i}].name"),
                    format!("duplicate appliance \"{}\"", appliance.name),
                ));
            }
            if !(appliance.power_w.is_finite() && appliance.power_w > 0.0) {
                errors.push(ConfigError::new(format!("appliances[{i}].power_w"), "must be > 0"));
            }
            if appliance.duration_ticks == 0 {
                errors.push(ConfigError::new(
                    format!("appliances[{i}].duration_ticks"),
                    "must be > 0",
                ));
            }
            if !(0.0..1.0).contains(&appliance.activation_probability) {
                errors.push(ConfigError::new(
                    format!("appliances[{i}].activation_probability"),
                    "must be in [0.0, 1.0)",
                ));
            }
        }

        errors
    }

    /// Builds the tariff schedule.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Config`](crate::error::DashError::Config) for a
    /// non-positive base price or coefficient.
    pub fn tariff_schedule(&self) -> Result<TariffSchedule> {
        let t = &self.tariff;
        TariffSchedule::new(
            t.base_price_per_kwh,
            TierCoefficients {
                low: t.low,
                normal: t.normal,
                high: t.high,
            },
        )
    }

    /// Builds a deriver using the configured tariff and integrity policy.
    ///
    /// # Errors
    ///
    /// See [`DashboardConfig::tariff_schedule`].
    pub fn deriver(&self) -> Result<UsageDeriver> {
        Ok(UsageDeriver::new(self.tariff_schedule()?, self.data.integrity))
    }

    /// Interval between simulator ticks.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` unless the period is a finite positive number.
    pub fn tick_period(&self) -> Result<Duration, ConfigError> {
        positive_secs("simulation.tick_period_secs", self.simulation.tick_period_secs)
    }

    /// Interval between price refreshes.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` unless the period is a finite positive number.
    pub fn price_refresh(&self) -> Result<Duration, ConfigError> {
        positive_secs("simulation.price_refresh_secs", self.simulation.price_refresh_secs)
    }
}

fn positive_secs(field: &str, secs: f64) -> Result<Duration, ConfigError> {
    match Duration::try_from_secs_f64(secs) {
        Ok(period) if !period.is_zero() => Ok(period),
        _ => Err(ConfigError::new(field, "must be a finite number > 0")),
    }
}
