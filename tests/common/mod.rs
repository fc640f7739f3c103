//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use energy_dash::io::dataset::load_csv;
use energy_dash::meter::{IntegrityPolicy, RawSample, UsageDeriver};
use energy_dash::tariff::{TariffSchedule, TierCoefficients};

/// Path of the bundled week of meter readings.
pub fn sample_data_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/sample.csv")
}

/// The bundled week of meter readings.
pub fn bundled_samples() -> Vec<RawSample> {
    load_csv(&sample_data_path()).expect("bundled dataset should load")
}

/// Samples from `(timestamp, cumulative_wh)` pairs.
pub fn samples(readings: &[(&str, f64)]) -> Vec<RawSample> {
    readings
        .iter()
        .map(|(ts, wh)| RawSample::parse(ts, *wh).expect("fixture timestamp should parse"))
        .collect()
}

/// Deriver with the default tariff (base 1.0, 0.8/1.0/1.3) that keeps
/// negative usage.
pub fn default_deriver() -> UsageDeriver {
    UsageDeriver::new(TariffSchedule::default(), IntegrityPolicy::Preserve)
}

/// Deriver with base 0.5 and coefficients 0.5/1.0/2.0.
pub fn custom_deriver(policy: IntegrityPolicy) -> UsageDeriver {
    let tariff = TariffSchedule::new(
        0.5,
        TierCoefficients {
            low: 0.5,
            normal: 1.0,
            high: 2.0,
        },
    )
    .expect("fixture tariff should be valid");
    UsageDeriver::new(tariff, policy)
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
