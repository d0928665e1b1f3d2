//! Fixed-rate tick source for the module state machines.

use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Yields tick indices `0..total`, one per period, then waits out the final period.
///
/// Tick 0 fires immediately. A run with `total` ticks lasts `total * period`.
pub struct Ticker {
    interval: Interval,
    period: Duration,
    total: u32,
    next: u32,
    finished: bool,
    started: Instant,
}

impl Ticker {
    pub fn new(period: Duration, total: u32) -> Self {
        let period = period.max(Duration::from_millis(1));
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval,
            period,
            total,
            next: 0,
            finished: false,
            started: Instant::now(),
        }
    }

    /// Wait for the next tick. `None` once the run's full duration has elapsed.
    pub async fn next(&mut self) -> Option<u32> {
        if self.next < self.total {
            self.interval.tick().await;
            let tick = self.next;
            self.next += 1;
            return Some(tick);
        }
        if !self.finished {
            self.interval.tick().await;
            self.finished = true;
        }
        None
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Whole seconds left in the run at the start of `tick`.
    pub fn remaining_secs(&self, tick: u32) -> u32 {
        let remaining = self.period * self.total.saturating_sub(tick);
        remaining.as_secs_f64().round() as u32
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
