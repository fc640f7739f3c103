//! Stochastic household power draw with a bounded recent history.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::NaiveTime;
use itertools::Itertools;
use tracing::debug;

use super::appliance::{ActiveAppliance, ApplianceProfile};
use super::random::RandomSource;
use crate::aggregate::HistoricalTotals;

/// Lower bound of the always-on load (fridge, router, ...).
pub const BASE_LOAD_MIN_W: f64 = 150.0;
/// Width of the range the always-on load is drawn from.
pub const BASE_LOAD_SPREAD_W: f64 = 50.0;
/// Half-width of the symmetric per-tick noise.
pub const JITTER_W: f64 = 10.0;

/// Instantaneous draw at one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveSample {
    pub time: NaiveTime,
    pub power_w: f64,
}

impl LiveSample {
    /// `"HH:MM:SS"` label.
    pub fn time_label(&self) -> String {
        self.time.format("%H:%M:%S").to_string()
    }

    pub fn display_power(&self) -> String {
        format_power(self.power_w)
    }
}

/// Power in W below 1 kW, in kW with two decimals from there on.
pub fn format_power(power_w: f64) -> String {
    if power_w >= 1000.0 {
        format!("{:.2} kW", power_w / 1000.0)
    } else {
        format!("{power_w:.0} W")
    }
}

/// Everything the live view renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveSnapshot {
    pub current_power_w: f64,
    pub history: Vec<LiveSample>,
    pub simulated_kwh: f64,
    pub simulated_cost: f64,
}

impl LiveSnapshot {
    /// Historical totals plus what was simulated since start-up.
    pub fn grand_totals(&self, historical: &HistoricalTotals) -> HistoricalTotals {
        HistoricalTotals {
            total_kwh: historical.total_kwh + self.simulated_kwh,
            total_cost: historical.total_cost + self.simulated_cost,
        }
    }
}

/// Synthesizes power draw from a fixed base load and randomly switched
/// appliances, one tick at a time.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use chrono::NaiveTime;
/// use energy_dash::sim::appliance::default_appliances;
/// use energy_dash::sim::live::LiveSimulator;
/// use energy_dash::sim::random::rng_from_seed;
///
/// let mut sim = LiveSimulator::new(
///     default_appliances(),
///     Duration::from_millis(2500),
///     24,
///     rng_from_seed(Some(42)),
/// );
/// let sample = sim.tick(NaiveTime::from_hms_opt(12, 0, 0).unwrap(), 1.0);
/// assert!(sample.power_w >= 140.0);
/// assert_eq!(sim.history().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct LiveSimulator<R> {
    profiles: Vec<ApplianceProfile>,
    active: Vec<ActiveAppliance>,
    base_load_w: f64,
    tick_period: Duration,
    simulated_kwh: f64,
    simulated_cost: f64,
    history: VecDeque<LiveSample>,
    capacity: usize,
    rng: R,
}

impl<R: RandomSource> LiveSimulator<R> {
    /// Creates a simulator and draws its base load.
    ///
    /// Profiles sharing a name are collapsed to the first one. A zero
    /// `history_capacity` is treated as one.
    pub fn new(
        profiles: Vec<ApplianceProfile>,
        tick_period: Duration,
        history_capacity: usize,
        mut rng: R,
    ) -> Self {
        let base_load_w = BASE_LOAD_MIN_W + rng.uniform(0.0, BASE_LOAD_SPREAD_W);
        let capacity = history_capacity.max(1);
        Self {
            profiles: profiles
                .into_iter()
                .unique_by(|p| p.name.clone())
                .collect(),
            active: Vec::new(),
            base_load_w,
            tick_period,
            simulated_kwh: 0.0,
            simulated_cost: 0.0,
            history: VecDeque::with_capacity(capacity),
            capacity,
            rng,
        }
    }

    /// Advances one tick stamped `at`, pricing its energy at `price_per_kwh`.
    pub fn tick(&mut self, at: NaiveTime, price_per_kwh: f64) -> LiveSample {
        for appliance in &mut self.active {
            appliance.ticks_remaining = appliance.ticks_remaining.saturating_sub(1);
        }
        self.active.retain(|appliance| {
            let running = appliance.ticks_remaining > 0;
            if !running {
                debug!(appliance = %appliance.name, "appliance cycle complete");
            }
            running
        });

        for profile in &self.profiles {
            if self.active.iter().any(|a| a.name == profile.name) {
                continue;
            }
            if self.rng.bernoulli(profile.activation_probability) {
                debug!(
                    appliance = %profile.name,
                    power_w = profile.power_w,
                    "appliance switched on"
                );
                self.active.push(ActiveAppliance::start(profile));
            }
        }

        let appliances_w: f64 = self.active.iter().map(|a| a.power_w).sum();
        let jitter_w = self.rng.uniform(-JITTER_W, JITTER_W);
        let power_w = (self.base_load_w + appliances_w + jitter_w).max(0.0);

        let interval_kwh = power_w / 1000.0 * self.tick_period.as_secs_f64() / 3600.0;
        self.simulated_kwh += interval_kwh;
        self.simulated_cost += interval_kwh * price_per_kwh;

        let sample = LiveSample { time: at, power_w };
        if self.history.len() >= self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(sample);
        sample
    }

    /// Power of the latest tick, `0.0` before the first one.
    pub fn current_power_w(&self) -> f64 {
        self.history.back().map_or(0.0, |s| s.power_w)
    }

    pub fn history(&self) -> &VecDeque<LiveSample> {
        &self.history
    }

    pub fn simulated_kwh(&self) -> f64 {
        self.simulated_kwh
    }

    pub fn simulated_cost(&self) -> f64 {
        self.simulated_cost
    }

    /// Time covered by one tick.
    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    pub fn base_load_w(&self) -> f64 {
        self.base_load_w
    }

    pub fn active_appliances(&self) -> &[ActiveAppliance] {
        &self.active
    }

    pub fn snapshot(&self) -> LiveSnapshot {
        LiveSnapshot {
            current_power_w: self.current_power_w(),
            history: self.history.iter().copied().collect(),
            simulated_kwh: self.simulated_kwh,
            simulated_cost: self.simulated_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::random::ScriptedRandom;

    const PERIOD: Duration = Duration::from_millis(2500);

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    /// Draw 0.5 everywhere: base load 175 W, no jitter, nothing switches on
    /// unless its probability exceeds 0.5.
    fn quiet_source() -> ScriptedRandom {
        ScriptedRandom::constant(0.5)
    }

    #[test]
    fn base_load_is_drawn_once() {
        let sim = LiveSimulator::new(Vec::new(), PERIOD, 24, quiet_source());
        assert_eq!(sim.base_load_w(), 175.0);
    }

    #[test]
    fn power_without_appliances_is_base_load() {
        let mut sim = LiveSimulator::new(Vec::new(), PERIOD, 24, quiet_source());
        let sample = sim.tick(noon(), 1.0);
        assert_eq!(sample.power_w, 175.0);
        assert_eq!(sim.current_power_w(), 175.0);
    }

    #[test]
    fn appliance_runs_for_its_duration() {
        let kettle = ApplianceProfile::new("Kettle", 2000.0, 2, 0.02);
        // base 0.5, then per tick: activation draw (if dormant), jitter draw.
        let source = ScriptedRandom::new([0.5, 0.0, 0.5], 0.5);
        let mut sim = LiveSimulator::new(vec![kettle], PERIOD, 24, source);

        assert_eq!(sim.tick(noon(), 1.0).power_w, 2175.0);
        assert_eq!(sim.tick(noon(), 1.0).power_w, 2175.0);
        assert_eq!(sim.tick(noon(), 1.0).power_w, 175.0);
        assert!(sim.active_appliances().is_empty());
    }

    #[test]
    fn at_most_one_instance_per_name() {
        let profiles = vec![
            ApplianceProfile::new("Oven", 3500.0, 10, 0.9),
            ApplianceProfile::new("Oven", 3500.0, 10, 0.9),
        ];
        let mut sim = LiveSimulator::new(profiles, PERIOD, 24, ScriptedRandom::constant(0.0));
        for _ in 0..5 {
            sim.tick(noon(), 1.0);
            assert_eq!(sim.active_appliances().len(), 1);
        }
    }

    #[test]
    fn lowest_draw_is_base_minus_jitter() {
        let mut sim = LiveSimulator::new(Vec::new(), PERIOD, 24, ScriptedRandom::constant(0.0));
        // base load 150 W, jitter -10 W
        assert_eq!(sim.tick(noon(), 1.0).power_w, 140.0);
        assert!(sim.simulated_kwh() > 0.0);
    }

    #[test]
    fn energy_and_cost_accumulate_per_tick() {
        let mut sim = LiveSimulator::new(Vec::new(), Duration::from_secs(3600), 24, quiet_source());
        sim.tick(noon(), 2.0);
        sim.tick(noon(), 2.0);
        assert!((sim.simulated_kwh() - 0.35).abs() < 1e-9);
        assert!((sim.simulated_cost() - 0.70).abs() < 1e-9);
    }

    #[test]
    fn tick_period_is_kept() {
        let sim = LiveSimulator::new(Vec::new(), PERIOD, 24, quiet_source());
        assert_eq!(sim.tick_period(), PERIOD);
    }

    #[test]
    fn history_is_bounded_fifo() {
        let mut sim = LiveSimulator::new(Vec::new(), PERIOD, 3, quiet_source());
        for second in 0..10 {
            sim.tick(NaiveTime::from_hms_opt(12, 0, second).unwrap(), 1.0);
            assert!(sim.history().len() <= 3);
        }
        let labels: Vec<String> = sim.history().iter().map(LiveSample::time_label).collect();
        assert_eq!(labels, ["12:00:07", "12:00:08", "12:00:09"]);
    }

    #[test]
    fn snapshot_and_grand_totals() {
        let mut sim = LiveSimulator::new(Vec::new(), Duration::from_secs(3600), 24, quiet_source());
        sim.tick(noon(), 1.0);
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.current_power_w, 175.0);

        let totals = snapshot.grand_totals(&HistoricalTotals {
            total_kwh: 10.0,
            total_cost: 5.0,
        });
        assert!((totals.total_kwh - 10.175).abs() < 1e-9);
        assert!((totals.total_cost - 5.175).abs() < 1e-9);
    }

    #[test]
    fn display_power_switches_units() {
        let low = LiveSample {
            time: noon(),
            power_w: 175.4,
        };
        let high = LiveSample {
            time: noon(),
            power_w: 2500.0,
        };
        assert_eq!(low.display_power(), "175 W");
        assert_eq!(high.display_power(), "2.50 kW");
    }
}
