//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of a registration (sensors, haptics, the
//! backend, the wall clock, the inference runtime) is abstracted behind a
//! trait. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch real hardware or the network
//!
//! Usage: swap real implementations for nullables in tests and simulations.

pub mod clock;
pub mod haptic;
pub mod network;
pub mod runtime;
pub mod scripts;
pub mod sensor;
pub mod tapper;

pub use clock::NullClock;
pub use haptic::NullHaptic;
pub use network::NullNetwork;
pub use runtime::NullRuntime;
pub use sensor::ScriptedSensor;
pub use tapper::AutoTapper;

use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
