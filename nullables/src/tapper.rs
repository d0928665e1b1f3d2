//! Simulated user for the touch module: taps after each felt pulse.

use livegate_verification::{RegistrationHandle, RegistrationState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Watches a registration and taps `delay` after each answered pulse.
///
/// Pulses are read from the touch module's `pulses` progress indicator.
/// Dropping the tapper stops it.
pub struct AutoTapper {
    task: JoinHandle<()>,
    taps: Arc<AtomicUsize>,
}

impl AutoTapper {
    /// Answer every pulse.
    pub fn spawn(handle: RegistrationHandle, delay: Duration) -> Self {
        Self::spawn_for(handle, delay, |_| true)
    }

    /// Answer pulse `i` (zero-based) only when `answer(i)` holds.
    pub fn spawn_for<F>(handle: RegistrationHandle, delay: Duration, answer: F) -> Self
    where
        F: Fn(usize) -> bool + Send + 'static,
    {
        let taps = Arc::new(AtomicUsize::new(0));
        let counter = taps.clone();
        let mut rx = handle.subscribe();
        let task = tokio::spawn(async move {
            let mut seen = 0usize;
            while rx.changed().await.is_ok() {
                let pulses = match &*rx.borrow_and_update() {
                    RegistrationState::ModuleC(progress) => progress
                        .as_ref()
                        .and_then(|p| p.indicator("pulses"))
                        .map_or(0, |v| v as usize),
                    _ => {
                        seen = 0;
                        continue;
                    }
                };
                for i in seen..pulses {
                    if !answer(i) {
                        continue;
                    }
                    let handle = handle.clone();
                    let counter = counter.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        if handle.register_tap() {
                            counter.fetch_add(1, Ordering::SeqCst);
                        }
                    });
                }
                seen = seen.max(pulses);
            }
        });
        Self { task, taps }
    }

    /// Taps the touch module accepted.
    pub fn taps(&self) -> usize {
        self.taps.load(Ordering::SeqCst)
    }
}

impl Drop for AutoTapper {
    fn drop(&mut self) {
        self.task.abort();
    }
}
