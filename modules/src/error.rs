use crate::voice::VoicePhase;
use livegate_types::SensorError;
use thiserror::Error;

/// Why a module run did not produce evidence.
///
/// Every variant permits a retry.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ModuleError {
    #[error("face not detected (ratio {ratio:.2})")]
    FaceNotDetected { ratio: f64 },

    #[error("liveness not detected (mean {mean:.2})")]
    LivenessNotDetected { mean: f64 },

    #[error("gaze not centered (ratio {ratio:.2})")]
    GazeNotDetected { ratio: f64 },

    #[error("audio challenge not met in {phase} phase")]
    AudioNotDetected { phase: VoicePhase },

    #[error("touch not detected ({valid_pulses} of {pulses} pulses answered)")]
    TouchNotDetected { valid_pulses: usize, pulses: usize },

    #[error("sensor error: {0}")]
    Sensor(#[from] SensorError),

    #[error("sample accumulator stopped unexpectedly")]
    AccumulatorStopped,
}

impl ModuleError {
    /// Message shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::FaceNotDetected { .. } => {
                "We couldn't see your face clearly. Make sure your face is in frame and well lit."
            }
            Self::LivenessNotDetected { .. } => {
                "We couldn't confirm you're a live person. Try again without filters or screens."
            }
            Self::GazeNotDetected { .. } => "Please look directly at the camera and try again.",
            Self::AudioNotDetected { .. } => {
                "We couldn't hear the sounds we asked for. Find a quiet spot and try again."
            }
            Self::TouchNotDetected { .. } => {
                "We didn't detect taps after the vibrations. Tap the screen each time you feel one."
            }
            Self::Sensor(SensorError::PermissionDenied(_)) => {
                "Permission is needed to use the sensor. Enable it in settings and try again."
            }
            Self::Sensor(_) | Self::AccumulatorStopped => "Something went wrong. Please try again.",
        }
    }

    pub fn is_retryable(&self) -> bool {
        true
    }
}
