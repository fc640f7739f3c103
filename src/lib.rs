//! Household energy dashboard core: tariff pricing, usage derivation from
//! cumulative meter readings, aggregation and a live consumption simulator.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod io;
pub mod meter;
/// Live simulation, clocks and background tasks.
pub mod sim;
pub mod tariff;

#[cfg(feature = "api")]
pub mod api;
