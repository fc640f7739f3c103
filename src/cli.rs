use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Household energy dashboard: historical usage views and a live simulation.
#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    /// Load configuration from a TOML file.
    #[clap(long, env = "ENERGY_DASH_CONFIG", conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Use a built-in preset (baseline, busy_household).
    #[clap(long)]
    pub preset: Option<String>,

    /// Meter readings CSV with `timestamp,cumulative_wh` columns.
    #[clap(long, default_value = "data/sample.csv", env = "ENERGY_DASH_DATA")]
    pub data: PathBuf,

    /// Override the random seed of the live simulation.
    #[clap(long)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Interval or hourly usage of one day.
    Daily(DailyArgs),

    /// Per-day usage across the whole dataset.
    Weekly(WeeklyArgs),

    /// Live simulated consumption.
    Live(LiveArgs),

    /// Serve the dashboard views as JSON over HTTP.
    #[cfg(feature = "api")]
    Serve(ServeArgs),
}

#[derive(ClapArgs)]
pub struct DailyArgs {
    /// Day to show (`YYYY-MM-DD`); defaults to the first day of the dataset.
    #[clap(long)]
    pub date: Option<String>,

    /// Group the day into hourly buckets.
    #[clap(long)]
    pub hourly: bool,

    /// Write the shown rows to a CSV file.
    #[clap(long)]
    pub export: Option<PathBuf>,
}

#[derive(ClapArgs)]
pub struct WeeklyArgs {
    /// Write the per-day buckets to a CSV file.
    #[clap(long)]
    pub export: Option<PathBuf>,
}

#[derive(ClapArgs)]
pub struct LiveArgs {
    /// Run this many ticks on a simulated clock instead of in real time.
    #[clap(long)]
    pub ticks: Option<u32>,

    /// Start of the simulated clock (`YYYY-MM-DD HH:MM`); defaults to now.
    #[clap(long, requires = "ticks")]
    pub start: Option<String>,
}

#[cfg(feature = "api")]
#[derive(ClapArgs)]
pub struct ServeArgs {
    #[clap(long, default_value = "3000", env = "ENERGY_DASH_PORT")]
    pub port: u16,
}
