//! Periodic background tasks driving the live view.
//!
//! Two independent tasks run on the tokio runtime: one refreshes the current
//! price, the other advances the [`LiveSimulator`]. Each task exclusively owns
//! its state and publishes the latest value on a [`watch`] channel, so readers
//! always see a complete snapshot and never block the producers.

use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{info, warn};

use super::clock::WallClock;
use super::live::{LiveSimulator, LiveSnapshot};
use super::random::RandomSource;
use crate::tariff::{PriceInfo, TariffSchedule};

/// Handle to a running periodic task.
pub struct TaskHandle {
    name: &'static str,
    shutdown: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl TaskHandle {
    fn spawn<F>(name: &'static str, body: impl FnOnce(oneshot::Receiver<()>) -> F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (shutdown, stop) = oneshot::channel();
        let join = tokio::spawn(body(stop));
        info!(task = name, "task started");
        Self {
            name,
            shutdown,
            join,
        }
    }

    /// Signals the task to stop and waits until it has exited. No tick
    /// runs after this returns.
    pub async fn stop(self) {
        // the task may already have exited on its own
        let _ = self.shutdown.send(());
        if let Err(e) = self.join.await {
            warn!(task = self.name, error = %e, "task ended abnormally");
        }
        info!(task = self.name, "task stopped");
    }
}

/// Starts the price refresh task.
///
/// The price for the current hour is computed immediately and then every
/// `period`. The returned receiver always holds the latest price.
pub fn spawn_price_task<C>(
    tariff: TariffSchedule,
    clock: C,
    period: Duration,
) -> (watch::Receiver<PriceInfo>, TaskHandle)
where
    C: WallClock + Send + 'static,
{
    let initial = tariff.price_info_at(&clock.now());
    let (tx, rx) = watch::channel(initial);

    let handle = TaskHandle::spawn("price-refresh", move |mut stop| async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = &mut stop => break,
                _ = ticker.tick() => {
                    let info = tariff.price_info_at(&clock.now());
                    let previous = tx.send_replace(info);
                    if previous.tier != info.tier {
                        info!(tier = %info.tier, price = info.price, "tariff tier changed");
                    }
                }
            }
        }
    });
    (rx, handle)
}

/// Starts the simulator task.
///
/// Every tick period of `simulator` it advances one tick, stamped with the
/// wall clock and priced at the latest value of `price`. The first tick
/// happens one period after start.
pub fn spawn_simulator_task<R, C>(
    mut simulator: LiveSimulator<R>,
    clock: C,
    price: watch::Receiver<PriceInfo>,
) -> (watch::Receiver<LiveSnapshot>, TaskHandle)
where
    R: RandomSource + Send + 'static,
    C: WallClock + Send + 'static,
{
    let period = simulator.tick_period();
    let (tx, rx) = watch::channel(simulator.snapshot());

    let handle = TaskHandle::spawn("live-simulator", move |mut stop| async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = &mut stop => break,
                _ = ticker.tick() => {
                    let current = *price.borrow();
                    simulator.tick(clock.now().time(), current.price);
                    tx.send_replace(simulator.snapshot());
                }
            }
        }
    });
    (rx, handle)
}

/// Both live tasks together.
pub struct LiveDashboard {
    price: watch::Receiver<PriceInfo>,
    live: watch::Receiver<LiveSnapshot>,
    price_task: TaskHandle,
    simulator_task: TaskHandle,
}

impl LiveDashboard {
    /// Starts the price refresh and simulator tasks. The simulator ticks at
    /// its own tick period. Must be called from within a tokio runtime.
    pub fn start<R, C>(
        tariff: TariffSchedule,
        simulator: LiveSimulator<R>,
        clock: C,
        price_refresh: Duration,
    ) -> Self
    where
        R: RandomSource + Send + 'static,
        C: WallClock + Clone + Send + 'static,
    {
        let (price, price_task) = spawn_price_task(tariff, clock.clone(), price_refresh);
        let (live, simulator_task) = spawn_simulator_task(simulator, clock, price.clone());
        Self {
            price,
            live,
            price_task,
            simulator_task,
        }
    }

    pub fn price(&self) -> watch::Receiver<PriceInfo> {
        self.price.clone()
    }

    pub fn live(&self) -> watch::Receiver<LiveSnapshot> {
        self.live.clone()
    }

    /// Stops both tasks.
    pub async fn stop(self) {
        self.simulator_task.stop().await;
        self.price_task.stop().await;
    }
}
