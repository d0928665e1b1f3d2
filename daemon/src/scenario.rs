//! Simulated users for `livegate simulate`.

use clap::ValueEnum;
use livegate_nullables::{scripts, AutoTapper, NullHaptic, ScriptedSensor};
use livegate_verification::{RegistrationHandle, Sensors};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Camera and microphone sample period of the scripted sensors.
const SAMPLE_PERIOD: Duration = Duration::from_millis(100);

/// Delay between feeling a pulse and tapping.
const TAP_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// A live person following every prompt.
    Human,
    /// A photo held to the camera and a synthetic voice.
    Bot,
    /// A live face that skips the voice and touch modules.
    SkipAll,
}

/// Keeps the simulated user's background tasks alive for the session.
pub enum Actor {
    Tapper(AutoTapper),
    Skipper(JoinHandle<()>),
    Idle,
}

impl Drop for Actor {
    fn drop(&mut self) {
        if let Actor::Skipper(task) = self {
            task.abort();
        }
    }
}

impl Scenario {
    /// Sensors for this user. `phase` is the length of one voice challenge phase.
    pub fn sensors(self, phase: Duration) -> Sensors {
        let haptic = Arc::new(NullHaptic::new());
        match self {
            Scenario::Human | Scenario::SkipAll => Sensors {
                camera: Arc::new(ScriptedSensor::new("camera", SAMPLE_PERIOD, scripts::live_face())),
                microphone: Arc::new(ScriptedSensor::new(
                    "microphone",
                    SAMPLE_PERIOD,
                    scripts::vowel_sequence(phase),
                )),
                haptic,
            },
            Scenario::Bot => Sensors {
                camera: Arc::new(ScriptedSensor::new("camera", SAMPLE_PERIOD, scripts::photo_face())),
                microphone: Arc::new(ScriptedSensor::new("microphone", SAMPLE_PERIOD, scripts::monotone())),
                haptic,
            },
        }
    }

    /// Start the user's reactions to the running session.
    pub fn act(self, handle: RegistrationHandle) -> Actor {
        match self {
            Scenario::Human => Actor::Tapper(AutoTapper::spawn(handle, TAP_DELAY)),
            Scenario::SkipAll => Actor::Skipper(tokio::spawn(skip_optional_modules(handle))),
            Scenario::Bot => Actor::Idle,
        }
    }
}

async fn skip_optional_modules(handle: RegistrationHandle) {
    let mut rx = handle.subscribe();
    let mut skipped = Vec::new();
    while rx.changed().await.is_ok() {
        let active = rx.borrow_and_update().active_module();
        let Some(module) = active.filter(|m| m.is_skippable() && !skipped.contains(m)) else {
            continue;
        };
        if handle.skip(module) {
            tracing::info!(module = module.as_str(), "user skipped module");
            skipped.push(module);
        }
    }
}
