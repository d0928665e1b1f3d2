//! Nullable sensor: replays a script of samples at a fixed rate.

use livegate_modules::{FeatureSink, SensorSource};
use livegate_types::SensorError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

type Script<S> = Arc<dyn Fn(Duration) -> Option<S> + Send + Sync>;

/// A sensor that pushes `script(elapsed)` every `period` after `start`.
///
/// `None` from the script means "no sample this period". Runs on the tokio
/// runtime that calls `start`, so it follows paused time in tests.
pub struct ScriptedSensor<S> {
    name: String,
    period: Duration,
    script: Script<S>,
    task: Mutex<Option<JoinHandle<()>>>,
    start_error: Mutex<Option<SensorError>>,
    starts: AtomicUsize,
    stops: AtomicUsize,
    pushed: Arc<AtomicUsize>,
}

impl<S: Send + 'static> ScriptedSensor<S> {
    pub fn new<F>(name: impl Into<String>, period: Duration, script: F) -> Self
    where
        F: Fn(Duration) -> Option<S> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            period: period.max(Duration::from_millis(1)),
            script: Arc::new(script),
            task: Mutex::new(None),
            start_error: Mutex::new(None),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            pushed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make every `start` fail with `error`.
    pub fn failing_with(self, error: SensorError) -> Self {
        *crate::lock(&self.start_error) = Some(error);
        self
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Samples accepted by the sink.
    pub fn pushed(&self) -> usize {
        self.pushed.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        crate::lock(&self.task)
            .as_ref()
            .map_or(false, |t| !t.is_finished())
    }
}

impl<S: Send + 'static> SensorSource<S> for ScriptedSensor<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, sink: FeatureSink<S>) -> Result<(), SensorError> {
        if let Some(err) = crate::lock(&self.start_error).clone() {
            return Err(err);
        }
        self.starts.fetch_add(1, Ordering::SeqCst);

        let script = self.script.clone();
        let pushed = self.pushed.clone();
        let period = self.period;
        let started = Instant::now();
        let task = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if sink.is_closed() {
                    break;
                }
                if let Some(sample) = script(started.elapsed()) {
                    if sink.push(sample) {
                        pushed.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
        });
        if let Some(previous) = crate::lock(&self.task).replace(task) {
            previous.abort();
        }
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = crate::lock(&self.task).take() {
            task.abort();
        }
        tracing::trace!(sensor = %self.name, "scripted sensor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livegate_modules::{Latest, StateCell};

    #[tokio::test(start_paused = true)]
    async fn pushes_script_output_until_stopped() {
        let sensor = ScriptedSensor::new("counter", Duration::from_millis(100), |elapsed| {
            Some(elapsed.as_millis() as u64)
        });
        let cell = StateCell::spawn(Latest::<u64>::default(), 64);
        sensor.start(cell.sink()).unwrap();
        assert!(sensor.is_running());

        time::sleep(Duration::from_millis(450)).await;
        let snap = cell.snapshot().await.unwrap();
        assert_eq!(snap.value, Some(400));
        assert_eq!(snap.received, 5);

        sensor.stop();
        assert!(!sensor.is_running());
        assert_eq!((sensor.starts(), sensor.stops()), (1, 1));
    }

    #[tokio::test]
    async fn configured_failure_is_returned() {
        let sensor = ScriptedSensor::new("camera", Duration::from_millis(100), |_| Some(()))
            .failing_with(SensorError::PermissionDenied("camera".into()));
        let cell = StateCell::spawn(Latest::<()>::default(), 4);
        assert_eq!(
            sensor.start(cell.sink()),
            Err(SensorError::PermissionDenied("camera".into()))
        );
        assert_eq!(sensor.starts(), 0);
    }
}
