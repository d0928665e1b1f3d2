//! Nullable haptic driver: counts pulses instead of vibrating.

use livegate_modules::HapticDriver;
use livegate_types::SensorError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct NullHaptic {
    pulses: AtomicUsize,
    failure: Mutex<Option<SensorError>>,
}

impl NullHaptic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every pulse with `error`.
    pub fn failing(error: SensorError) -> Self {
        Self {
            pulses: AtomicUsize::new(0),
            failure: Mutex::new(Some(error)),
        }
    }

    /// Pulses fired so far.
    pub fn pulses(&self) -> usize {
        self.pulses.load(Ordering::SeqCst)
    }
}

impl HapticDriver for NullHaptic {
    fn pulse(&self) -> Result<(), SensorError> {
        if let Some(err) = crate::lock(&self.failure).clone() {
            return Err(err);
        }
        self.pulses.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
