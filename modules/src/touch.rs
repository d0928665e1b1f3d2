//! Module C: haptic pulse and tap response.
//!
//! No classifier here: the processor fires pulses on fixed ticks and matches
//! them against tap timestamps delivered through a [`TapRegistrar`].

use crate::atom::{build_atom, ModuleContext, RunOutcome};
use crate::cell::{Accumulator, FeatureSink, StateCell};
use crate::config::TouchConfig;
use crate::error::ModuleError;
use crate::sensor::HapticDriver;
use crate::ticker::Ticker;
use livegate_types::{EvidenceAtom, ModuleId, ModuleProgress, StatusMessage};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

const TOUCH_INBOX: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchEvent {
    Pulse(Instant),
    Tap(Instant),
}

/// Pulse and tap timestamps in arrival order.
#[derive(Clone, Debug, Default)]
pub struct TouchLog {
    pub pulses: Vec<Instant>,
    pub taps: Vec<Instant>,
}

impl Accumulator for TouchLog {
    type Input = TouchEvent;
    type Snapshot = TouchLog;

    fn apply(&mut self, event: TouchEvent) {
        match event {
            TouchEvent::Pulse(at) => self.pulses.push(at),
            TouchEvent::Tap(at) => self.taps.push(at),
        }
    }

    fn snapshot(&self) -> TouchLog {
        self.clone()
    }
}

/// Whether `tap` answers `pulse`: at or after it and strictly inside the window.
pub fn tap_answers(pulse: Instant, tap: Instant, window: Duration) -> bool {
    tap.checked_duration_since(pulse)
        .map_or(false, |d| d < window)
}

/// Number of pulses with at least one answering tap.
pub fn count_valid_pulses(pulses: &[Instant], taps: &[Instant], window: Duration) -> usize {
    pulses
        .iter()
        .filter(|&&p| taps.iter().any(|&t| tap_answers(p, t, window)))
        .count()
}

/// Guidance for the moment `now`, keyed on time since the newest pulse.
pub fn touch_status(now: Instant, log: &TouchLog, window: Duration) -> StatusMessage {
    let idle = StatusMessage::info("Tap the screen when you feel a vibration");
    let Some(&pulse) = log.pulses.last() else {
        return idle;
    };
    let answered = log.taps.iter().any(|&t| tap_answers(pulse, t, window));
    let since = now.saturating_duration_since(pulse);
    let secs = since.as_secs_f64();

    if secs < 1.0 {
        if answered {
            StatusMessage::success("Got it!")
        } else {
            StatusMessage::prompt("Tap now!")
        }
    } else if secs <= 3.0 && answered {
        StatusMessage::success("Got it!")
    } else if secs < 2.0 {
        StatusMessage::warning("No tap detected yet")
    } else if secs <= 3.0 {
        StatusMessage::warning("You missed it")
    } else {
        idle
    }
}

type Slot = Arc<Mutex<Option<FeatureSink<TouchEvent>>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<FeatureSink<TouchEvent>>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Routes user taps into the running touch module.
///
/// Clones share one slot. Taps outside a touch run are ignored.
#[derive(Clone, Default)]
pub struct TapRegistrar {
    slot: Slot,
}

impl TapRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tap now. Returns `false` when no touch run is listening.
    pub fn register_tap(&self) -> bool {
        match lock(&self.slot).as_ref() {
            Some(sink) => sink.push(TouchEvent::Tap(Instant::now())),
            None => false,
        }
    }

    pub fn is_listening(&self) -> bool {
        lock(&self.slot).is_some()
    }

    fn listen(&self, sink: FeatureSink<TouchEvent>) -> Listening {
        *lock(&self.slot) = Some(sink);
        Listening {
            slot: self.slot.clone(),
        }
    }
}

/// Detaches the registrar when the run ends or is cancelled.
struct Listening {
    slot: Slot,
}

impl Drop for Listening {
    fn drop(&mut self) {
        lock(&self.slot).take();
    }
}

/// Module C processor.
pub struct TouchHapticProcessor {
    config: TouchConfig,
    haptic: Arc<dyn HapticDriver>,
    taps: TapRegistrar,
}

impl TouchHapticProcessor {
    pub fn new(config: TouchConfig, haptic: Arc<dyn HapticDriver>, taps: TapRegistrar) -> Self {
        Self {
            config,
            haptic,
            taps,
        }
    }

    pub fn config(&self) -> &TouchConfig {
        &self.config
    }

    pub fn score(&self, valid_pulses: usize) -> f64 {
        let pulses = self.config.pulse_ticks.len().max(1);
        70.0 + 30.0 * valid_pulses as f64 / pulses as f64
    }

    /// Fire the pulses, collect taps for the configured duration and seal the outcome.
    pub async fn run<F>(&self, ctx: &ModuleContext, mut on_progress: F) -> Result<EvidenceAtom, ModuleError>
    where
        F: FnMut(ModuleProgress),
    {
        let cell = StateCell::spawn(TouchLog::default(), TOUCH_INBOX);
        let sink = cell.sink();
        let listening = self.taps.listen(cell.sink());

        let window = Duration::from_millis(self.config.valid_window_ms);
        let total = self.config.duration_ticks;
        let mut ticker = Ticker::new(ctx.tick_interval, total);

        while let Some(tick) = ticker.next().await {
            if self.config.pulse_ticks.contains(&tick) {
                self.haptic.pulse()?;
                sink.push(TouchEvent::Pulse(Instant::now()));
                tracing::debug!(tick, "haptic pulse");
            }
            let log = cell.snapshot().await.ok_or(ModuleError::AccumulatorStopped)?;
            let valid = count_valid_pulses(&log.pulses, &log.taps, window);
            let indicators = BTreeMap::from([
                ("valid_pulses".to_string(), valid as f64),
                ("pulses".to_string(), log.pulses.len() as f64),
                ("taps".to_string(), log.taps.len() as f64),
            ]);
            on_progress(ModuleProgress {
                module: ModuleId::TouchHaptic,
                tick,
                total_ticks: total,
                time_remaining_secs: ticker.remaining_secs(tick),
                status: touch_status(Instant::now(), &log, window),
                indicators,
            });
        }
        drop(listening);

        let log = cell.snapshot().await.ok_or(ModuleError::AccumulatorStopped)?;
        let pulses = log.pulses.len();
        let valid_pulses = count_valid_pulses(&log.pulses, &log.taps, window);
        tracing::debug!(pulses, valid_pulses, taps = log.taps.len(), "touch run finished");
        if valid_pulses < self.config.min_valid_pulses {
            return Err(ModuleError::TouchNotDetected {
                valid_pulses,
                pulses,
            });
        }

        let score = self.score(valid_pulses);
        let outcome = RunOutcome {
            duration: ticker.elapsed(),
            sample_count: log.taps.len() as u32,
            dropped_samples: cell.dropped(),
            ..RunOutcome::default()
        }
        .flag("touch_response", true)
        .count("pulses", pulses as u64)
        .count("valid_pulses", valid_pulses as u64)
        .count("taps", log.taps.len() as u64);
        tracing::info!(module = ModuleId::TouchHaptic.as_str(), score, "module complete");
        Ok(build_atom(ctx, ModuleId::TouchHaptic, score, outcome))
    }
}
