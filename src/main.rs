//! Energy dashboard entry point: CLI wiring and view rendering.

mod cli;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::info;
#[cfg(feature = "api")]
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cli::{Args, Command, DailyArgs, LiveArgs, WeeklyArgs};
use energy_dash::aggregate::{
    Bucket, Usage, aggregate_daily, aggregate_hourly, historical_totals, summarize, summarize_days,
};
use energy_dash::config::DashboardConfig;
use energy_dash::io::dataset::load_csv;
use energy_dash::io::export::{export_buckets, export_records};
use energy_dash::meter::sample::{parse_date, parse_timestamp};
use energy_dash::meter::{RawSample, available_dates};
use energy_dash::sim::clock::{SystemClock, TickClock, WallClock};
use energy_dash::sim::live::LiveSimulator;
use energy_dash::sim::random::rng_from_seed;
use energy_dash::sim::scheduler::LiveDashboard;
use energy_dash::tariff::{PriceTier, TariffSchedule};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let samples = load_csv(&args.data)
        .with_context(|| format!("cannot load meter data from \"{}\"", args.data.display()))?;

    match args.command {
        Command::Daily(daily_args) => daily(&config, &samples, daily_args),
        Command::Weekly(weekly_args) => weekly(&config, &samples, weekly_args),
        Command::Live(live_args) => live(&config, &samples, live_args).await,
        #[cfg(feature = "api")]
        Command::Serve(serve_args) => serve(&config, samples, serve_args.port).await,
    }
}

/// Loads config: `--config` takes priority, then `--preset`, then the baseline.
fn load_config(args: &Args) -> anyhow::Result<DashboardConfig> {
    let mut config = if let Some(path) = &args.config {
        DashboardConfig::from_toml_file(path)?
    } else if let Some(name) = &args.preset {
        DashboardConfig::from_preset(name)?
    } else {
        DashboardConfig::baseline()
    };

    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        bail!("invalid configuration ({} errors)", errors.len());
    }
    Ok(config)
}

fn print_tariff_legend(tariff: &TariffSchedule) {
    let legend: Vec<String> = PriceTier::ALL
        .iter()
        .map(|&tier| {
            format!(
                "{tier} {} ({:.2}/kWh)",
                tier.hours_label(),
                tariff.price_for_tier(tier)
            )
        })
        .collect();
    println!("Tariff: {}", legend.join(" | "));
}

fn daily(config: &DashboardConfig, samples: &[RawSample], args: DailyArgs) -> anyhow::Result<()> {
    let deriver = config.deriver()?;
    let date = match args.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => match available_dates(samples).first() {
            Some(&date) => date,
            None => bail!("the dataset has no readings"),
        },
    };
    let records = deriver.derive_day(samples, date)?;

    println!("Usage on {date}");
    print_tariff_legend(deriver.tariff());
    println!();

    if args.hourly {
        let buckets: Vec<Bucket> = aggregate_hourly(&records)
            .into_iter()
            .map(Bucket::from)
            .collect();
        for b in &buckets {
            let tier = b.tier().map(|t| t.to_string()).unwrap_or_default();
            println!(
                "{}  {:>8.3} kWh  {:>8.2}  {tier}",
                b.label(),
                b.usage_kwh(),
                b.cost()
            );
        }
        println!("\n{}", summarize(&buckets));
        if let Some(path) = &args.export {
            export_buckets(&buckets, path)
                .with_context(|| format!("failed to write \"{}\"", path.display()))?;
            info!(path = %path.display(), rows = buckets.len(), "hourly buckets exported");
        }
    } else {
        for r in &records {
            println!(
                "{}  {:>8.3} kWh  {:>8.2}  {}",
                r.time_label(),
                r.usage_kwh,
                r.cost,
                r.tier
            );
        }
        println!("\n{}", summarize(&records));
        if let Some(path) = &args.export {
            export_records(&records, path)
                .with_context(|| format!("failed to write \"{}\"", path.display()))?;
            info!(path = %path.display(), rows = records.len(), "interval records exported");
        }
    }
    Ok(())
}

fn weekly(config: &DashboardConfig, samples: &[RawSample], args: WeeklyArgs) -> anyhow::Result<()> {
    let deriver = config.deriver()?;
    let days: Vec<Bucket> = aggregate_daily(samples, &deriver)?
        .into_iter()
        .map(Bucket::from)
        .collect();

    println!("Daily usage");
    println!();
    for d in &days {
        println!("{}  {:>8.3} kWh  {:>8.2}", d.label(), d.usage_kwh(), d.cost());
    }
    println!("\n{}", summarize_days(samples, &days));

    if let Some(path) = &args.export {
        export_buckets(&days, path)
            .with_context(|| format!("failed to write \"{}\"", path.display()))?;
        info!(path = %path.display(), rows = days.len(), "daily buckets exported");
    }
    Ok(())
}

async fn live(
    config: &DashboardConfig,
    samples: &[RawSample],
    args: LiveArgs,
) -> anyhow::Result<()> {
    let tariff = config.tariff_schedule()?;
    let historical = historical_totals(samples, &config.deriver()?)?;
    let tick_period = config.tick_period()?;
    let simulator = LiveSimulator::new(
        config.appliances.clone(),
        tick_period,
        config.simulation.history_capacity,
        rng_from_seed(config.simulation.seed),
    );

    let snapshot = if let Some(ticks) = args.ticks {
        let start = match args.start.as_deref() {
            Some(raw) => parse_timestamp(raw)?,
            None => SystemClock.now(),
        };
        let mut simulator = simulator;
        let mut clock = TickClock::new(start, tick_period, ticks);
        clock.run(|at| {
            let price = tariff.price_info_at(&at);
            let sample = simulator.tick(at.time(), price.price);
            println!(
                "{}  {:>9}  {} {:.2}/kWh",
                sample.time_label(),
                sample.display_power(),
                price.tier,
                price.price
            );
        });
        simulator.snapshot()
    } else {
        let dashboard =
            LiveDashboard::start(tariff, simulator, SystemClock, config.price_refresh()?);
        let mut live = dashboard.live();
        let price = dashboard.price();
        info!("live simulation running; press Ctrl-C to stop");
        loop {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => {
                    signal.context("failed to listen for Ctrl-C")?;
                    break;
                }
                changed = live.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = live.borrow_and_update().clone();
                    let current = *price.borrow();
                    if let Some(sample) = snapshot.history.last() {
                        println!(
                            "{}  {:>9}  {} {:.2}/kWh",
                            sample.time_label(),
                            sample.display_power(),
                            current.tier,
                            current.price
                        );
                    }
                }
            }
        }
        dashboard.stop().await;
        live.borrow().clone()
    };

    let totals = snapshot.grand_totals(&historical);
    println!();
    println!(
        "Simulated:       {:.3} kWh, cost {:.2}",
        snapshot.simulated_kwh, snapshot.simulated_cost
    );
    println!(
        "Total with data: {:.2} kWh, cost {:.2}",
        totals.total_kwh, totals.total_cost
    );
    Ok(())
}

#[cfg(feature = "api")]
async fn serve(config: &DashboardConfig, samples: Vec<RawSample>, port: u16) -> anyhow::Result<()> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use energy_dash::api::{self, AppState};

    let deriver = config.deriver()?;
    let simulator = LiveSimulator::new(
        config.appliances.clone(),
        config.tick_period()?,
        config.simulation.history_capacity,
        rng_from_seed(config.simulation.seed),
    );
    let dashboard = LiveDashboard::start(
        *deriver.tariff(),
        simulator,
        SystemClock,
        config.price_refresh()?,
    );

    let state = Arc::new(AppState::new(samples, deriver, dashboard.live(), dashboard.price())?);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let shutdown = shutdown_on(tokio::signal::ctrl_c());
    let served = api::serve(state, addr, shutdown).await;

    dashboard.stop().await;
    served.with_context(|| format!("API server on {addr} failed"))
}

/// Resolves when `signal` fires. A signal that cannot be listened for never
/// resolves, so the server keeps running until killed.
#[cfg(feature = "api")]
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
