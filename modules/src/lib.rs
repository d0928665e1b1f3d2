//! Challenge module processors.
//!
//! Each processor is a fixed-duration, tick-driven state machine:
//! - [`FaceLivenessProcessor`] (module A, mandatory)
//! - [`VoiceChallengeProcessor`] (module B, skippable)
//! - [`TouchHapticProcessor`] (module C, skippable)
//!
//! Sensors push samples from their own execution context into a [`StateCell`],
//! an actor that owns the accumulator state. The tick loop only ever reads
//! snapshots. Dropping a running processor future cancels it: the sensor is
//! stopped by a drop guard and the accumulated evidence is discarded.

pub mod atom;
pub mod cell;
pub mod config;
pub mod error;
pub mod face;
pub mod sensor;
pub mod ticker;
pub mod touch;
pub mod voice;

pub use atom::{build_atom, skipped_atom, ModuleContext, RunOutcome};
pub use cell::{Accumulator, FeatureSink, Latest, LatestSnapshot, StateCell};
pub use config::{ConfigError, FaceConfig, TouchConfig, VoiceConfig};
pub use error::ModuleError;
pub use face::{FaceLivenessProcessor, FaceTally};
pub use sensor::{HapticDriver, SensorGuard, SensorSource};
pub use ticker::Ticker;
pub use touch::{
    count_valid_pulses, tap_answers, touch_status, TapRegistrar, TouchEvent, TouchHapticProcessor,
    TouchLog,
};
pub use voice::{
    dominant_prediction, DominantPrediction, VoiceAccumulator, VoiceChallengeProcessor, VoicePhase,
    VoiceSnapshot, VoiceTally,
};
