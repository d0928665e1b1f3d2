//! Feature samples delivered by the camera and microphone streams.

use serde::{Deserialize, Serialize};

/// Gaze is "centered" within this head yaw, in degrees.
pub const GAZE_MAX_YAW_DEG: f64 = 15.0;
/// Gaze is "centered" within this head pitch, in degrees.
pub const GAZE_MAX_PITCH_DEG: f64 = 12.0;

/// Samples that can be fed to an on-device model.
pub trait ModelInput {
    fn model_input(&self) -> &[f32];
}

/// One camera frame's face features.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceSample {
    pub face_detected: bool,
    pub yaw_deg: f64,
    pub pitch_deg: f64,
    /// Depth cue in [0, 1]; flat photos and screens score low.
    pub depth_score: f64,
    /// Skin texture cue in [0, 1]; print and moiré artefacts score low.
    pub texture_score: f64,
    /// Micro-motion energy between frames in [0, 1].
    pub motion_energy: f64,
    /// Face crop embedding for the liveness model.
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl FaceSample {
    pub fn is_gaze_centered(&self) -> bool {
        self.face_detected
            && self.yaw_deg.abs() <= GAZE_MAX_YAW_DEG
            && self.pitch_deg.abs() <= GAZE_MAX_PITCH_DEG
    }
}

impl ModelInput for FaceSample {
    fn model_input(&self) -> &[f32] {
        &self.embedding
    }
}

/// One microphone buffer's acoustic features.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioSample {
    /// Buffer loudness in dBFS (0 is full scale, silence is around -60).
    pub rms_db: f64,
    /// Periodicity in [0, 1]; high for voiced speech.
    pub voicing: f64,
    /// First formant estimate in Hz.
    pub f1_hz: f64,
    /// Second formant estimate in Hz.
    pub f2_hz: f64,
    /// Log-mel frame for the vowel model.
    #[serde(default)]
    pub mel: Vec<f32>,
}

impl ModelInput for AudioSample {
    fn model_input(&self) -> &[f32] {
        &self.mel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaze_requires_a_face() {
        let s = FaceSample {
            face_detected: false,
            ..Default::default()
        };
        assert!(!s.is_gaze_centered());
    }

    #[test]
    fn gaze_bounds() {
        let mut s = FaceSample {
            face_detected: true,
            yaw_deg: 14.0,
            pitch_deg: -11.0,
            ..Default::default()
        };
        assert!(s.is_gaze_centered());
        s.yaw_deg = -20.0;
        assert!(!s.is_gaze_centered());
    }
}
