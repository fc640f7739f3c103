use std::time::Duration;

use chrono::{Local, NaiveDateTime, TimeDelta};

/// Source of the current local time.
pub trait WallClock {
    fn now(&self) -> NaiveDateTime;
}

/// The system's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl WallClock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// A simulated clock producing a fixed number of evenly spaced instants.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use chrono::NaiveDate;
/// use energy_dash::sim::clock::TickClock;
///
/// let start = NaiveDate::from_ymd_opt(2025, 6, 2)
///     .unwrap()
///     .and_hms_opt(12, 0, 0)
///     .unwrap();
/// let mut clock = TickClock::new(start, Duration::from_secs(5), 3);
/// let mut labels = Vec::new();
///
/// clock.run(|at| labels.push(at.format("%H:%M:%S").to_string()));
/// assert_eq!(labels, ["12:00:00", "12:00:05", "12:00:10"]);
/// ```
pub struct TickClock {
    start: NaiveDateTime,
    period: TimeDelta,
    /// Ticks already produced
    current: u32,
    /// Ticks to produce in total
    total: u32,
}

impl TickClock {
    /// Creates a clock starting at `start`. Periods too long for a
    /// [`TimeDelta`] are capped at its maximum.
    pub fn new(start: NaiveDateTime, period: Duration, total: u32) -> Self {
        Self {
            start,
            period: TimeDelta::from_std(period).unwrap_or(TimeDelta::MAX),
            current: 0,
            total,
        }
    }

    /// Returns the next instant, or `None` once all ticks are used up.
    pub fn tick(&mut self) -> Option<NaiveDateTime> {
        if self.current < self.total {
            let at = self
                .period
                .checked_mul(i32::try_from(self.current).ok()?)
                .and_then(|offset| self.start.checked_add_signed(offset))?;
            self.current += 1;
            Some(at)
        } else {
            None
        }
    }

    /// Calls `f` with every remaining instant.
    pub fn run(&mut self, mut f: impl FnMut(NaiveDateTime)) {
        while let Some(at) = self.tick() {
            f(at);
        }
    }
}
