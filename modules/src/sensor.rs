//! Contracts for the sensor hardware the modules drive.

use crate::cell::FeatureSink;
use livegate_types::SensorError;
use std::sync::Arc;

/// A push-based feature stream for one modality.
///
/// After `start` the source pushes samples into `sink` from its own execution
/// context until `stop`. There is no backpressure: a full sink drops samples.
/// A source is not restartable mid-run; each module run calls `start` once.
pub trait SensorSource<S>: Send + Sync {
    fn name(&self) -> &str;

    fn start(&self, sink: FeatureSink<S>) -> Result<(), SensorError>;

    fn stop(&self);
}

/// Haptic actuator for the touch module.
pub trait HapticDriver: Send + Sync {
    fn pulse(&self) -> Result<(), SensorError>;
}

/// Stops a started sensor when dropped, on completion and cancellation alike.
pub struct SensorGuard<S> {
    source: Arc<dyn SensorSource<S>>,
}

impl<S> SensorGuard<S> {
    /// Start `source` and return a guard that stops it on drop.
    pub fn start(source: Arc<dyn SensorSource<S>>, sink: FeatureSink<S>) -> Result<Self, SensorError> {
        source.start(sink)?;
        tracing::debug!(sensor = source.name(), "sensor started");
        Ok(Self { source })
    }
}

impl<S> Drop for SensorGuard<S> {
    fn drop(&mut self) {
        self.source.stop();
        tracing::debug!(sensor = self.source.name(), "sensor stopped");
    }
}
