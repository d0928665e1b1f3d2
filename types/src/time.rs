//! Wall-clock timestamps for nonces and credentials.
//!
//! Timestamps are Unix epoch seconds (UTC). Tick timing inside the module
//! processors uses the async runtime's monotonic clock instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

const SECS_PER_DAY: u64 = 86_400;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Current system time. A clock set before the epoch reads as the epoch.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// Whether this timestamp + duration has passed relative to `now`.
    pub fn has_expired(&self, duration_secs: u64, now: Timestamp) -> bool {
        now.0 >= self.0.saturating_add(duration_secs)
    }

    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    pub fn plus_days(&self, days: u32) -> Self {
        self.plus_secs(u64::from(days) * SECS_PER_DAY)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Source of wall-clock time, swappable for a deterministic clock in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The operating system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_inclusive_of_the_deadline() {
        let issued = Timestamp::new(1_000);
        assert!(!issued.has_expired(300, Timestamp::new(1_299)));
        assert!(issued.has_expired(300, Timestamp::new(1_300)));
    }

    #[test]
    fn plus_days_saturates() {
        assert_eq!(Timestamp::new(0).plus_days(2).as_secs(), 2 * 86_400);
        assert_eq!(Timestamp::new(u64::MAX).plus_days(1).as_secs(), u64::MAX);
    }

    #[test]
    fn elapsed_never_negative() {
        let later = Timestamp::new(50);
        assert_eq!(later.elapsed_since(Timestamp::new(10)), 0);
        assert_eq!(Timestamp::new(10).elapsed_since(later), 40);
    }
}
