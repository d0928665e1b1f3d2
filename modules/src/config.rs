//! Per-module tuning, loadable from the `[face]`, `[voice]` and `[touch]` config sections.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn check(ok: bool, field: &'static str, reason: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: reason.to_string(),
        })
    }
}

fn unit_interval(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

/// Module A: face liveness.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    pub duration_ticks: u32,
    /// Rolling window for the face / gaze counts.
    pub window: usize,
    pub min_face_ratio: f64,
    pub min_liveness_mean: f64,
    pub min_gaze_ratio: f64,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            duration_ticks: 5,
            window: 6,
            min_face_ratio: 0.6,
            min_liveness_mean: 0.7,
            min_gaze_ratio: 0.3,
        }
    }
}

impl FaceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check(self.duration_ticks > 0, "face.duration_ticks", "must be positive")?;
        check(self.window > 0, "face.window", "must be positive")?;
        check(unit_interval(self.min_face_ratio), "face.min_face_ratio", "must be in [0, 1]")?;
        check(
            unit_interval(self.min_liveness_mean),
            "face.min_liveness_mean",
            "must be in [0, 1]",
        )?;
        check(unit_interval(self.min_gaze_ratio), "face.min_gaze_ratio", "must be in [0, 1]")
    }
}

/// Module B: voice challenge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Ticks per phase; the module runs three phases.
    pub phase_ticks: u32,
    /// Ring buffer of classifier results.
    pub buffer_capacity: usize,
    /// Most recent results considered for the dominant prediction.
    pub dominant_window: usize,
    /// Matching ticks required in the "ah" and "oh" phases.
    pub min_phase_matches: u32,
    pub min_silence_ratio: f64,
    /// In the "oh" phase, accept either vowel while a fallback classifier decides.
    pub lenient_voiced_fallback: bool,
    /// Inbox size of the sample accumulator; overflow is dropped.
    pub inbox_capacity: usize,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            phase_ticks: 5,
            buffer_capacity: 120,
            dominant_window: 12,
            min_phase_matches: 3,
            min_silence_ratio: 0.55,
            lenient_voiced_fallback: true,
            inbox_capacity: 256,
        }
    }
}

impl VoiceConfig {
    pub fn duration_ticks(&self) -> u32 {
        self.phase_ticks.saturating_mul(3)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check(self.phase_ticks > 0, "voice.phase_ticks", "must be positive")?;
        check(
            self.phase_ticks <= u32::MAX / 3,
            "voice.phase_ticks",
            "three phases must fit in a u32 tick count",
        )?;
        check(self.dominant_window > 0, "voice.dominant_window", "must be positive")?;
        check(
            self.buffer_capacity >= self.dominant_window,
            "voice.buffer_capacity",
            "must hold at least dominant_window results",
        )?;
        check(
            self.min_phase_matches <= self.phase_ticks,
            "voice.min_phase_matches",
            "cannot exceed phase_ticks",
        )?;
        check(
            unit_interval(self.min_silence_ratio),
            "voice.min_silence_ratio",
            "must be in [0, 1]",
        )?;
        check(self.inbox_capacity > 0, "voice.inbox_capacity", "must be positive")
    }
}

/// Module C: touch / haptic response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchConfig {
    pub duration_ticks: u32,
    /// Ticks at which a haptic pulse fires.
    pub pulse_ticks: Vec<u32>,
    /// A tap answers a pulse when it lands within this many ms after it.
    pub valid_window_ms: u64,
    pub min_valid_pulses: usize,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            duration_ticks: 15,
            pulse_ticks: vec![3, 7, 11],
            valid_window_ms: 2_500,
            min_valid_pulses: 2,
        }
    }
}

impl TouchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check(self.duration_ticks > 0, "touch.duration_ticks", "must be positive")?;
        check(!self.pulse_ticks.is_empty(), "touch.pulse_ticks", "must not be empty")?;
        check(
            self.pulse_ticks.iter().all(|t| *t < self.duration_ticks),
            "touch.pulse_ticks",
            "every pulse must fire before the module ends",
        )?;
        check(
            self.pulse_ticks.windows(2).all(|w| w[0] < w[1]),
            "touch.pulse_ticks",
            "must be strictly increasing",
        )?;
        check(self.valid_window_ms > 0, "touch.valid_window_ms", "must be positive")?;
        check(
            self.min_valid_pulses <= self.pulse_ticks.len(),
            "touch.min_valid_pulses",
            "cannot exceed the number of pulses",
        )
    }
}
