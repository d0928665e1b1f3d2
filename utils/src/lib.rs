//! Shared utilities for LiveGate.

pub mod logging;
pub mod stats;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use stats::{ratio, RollingWindow, RunningMean, StatsCounter};
pub use time::format_duration;
