//! Canned sensor scripts for the simulated users.
//!
//! Each function returns a closure from elapsed time to an optional sample,
//! ready for [`ScriptedSensor::new`](crate::ScriptedSensor::new).

use livegate_classifier::{AudioSample, FaceSample};
use std::time::Duration;

/// A real face, centered and moving slightly.
pub fn live_face() -> impl Fn(Duration) -> Option<FaceSample> + Send + Sync + 'static {
    |elapsed| {
        // A slow head sway well inside the gaze limits.
        let sway = (elapsed.as_secs_f64() * 1.7).sin();
        Some(FaceSample {
            face_detected: true,
            yaw_deg: 4.0 * sway,
            pitch_deg: -2.0 + sway,
            depth_score: 0.9,
            texture_score: 0.85,
            motion_energy: 0.15,
            embedding: vec![0.0; 16],
        })
    }
}

/// A printed photo held up to the camera: flat, textureless, perfectly still.
pub fn photo_face() -> impl Fn(Duration) -> Option<FaceSample> + Send + Sync + 'static {
    |_| {
        Some(FaceSample {
            face_detected: true,
            depth_score: 0.1,
            texture_score: 0.2,
            motion_energy: 0.0,
            embedding: vec![0.0; 16],
            ..Default::default()
        })
    }
}

/// Frames with nobody in them.
pub fn empty_frame() -> impl Fn(Duration) -> Option<FaceSample> + Send + Sync + 'static {
    |_| Some(FaceSample::default())
}

/// A live face looking away from the camera.
pub fn averted_face() -> impl Fn(Duration) -> Option<FaceSample> + Send + Sync + 'static {
    |elapsed| {
        live_face()(elapsed).map(|s| FaceSample {
            yaw_deg: 35.0,
            ..s
        })
    }
}

fn voiced(f1_hz: f64, f2_hz: f64) -> AudioSample {
    AudioSample {
        rms_db: -20.0,
        voicing: 0.9,
        f1_hz,
        f2_hz,
        mel: vec![0.0; 40],
    }
}

fn quiet() -> AudioSample {
    AudioSample {
        rms_db: -60.0,
        voicing: 0.05,
        f1_hz: 0.0,
        f2_hz: 0.0,
        mel: vec![0.0; 40],
    }
}

/// A user following the prompts: "ah", then silence, then "oh", `phase` each.
pub fn vowel_sequence(phase: Duration) -> impl Fn(Duration) -> Option<AudioSample> + Send + Sync + 'static {
    three_phases(phase, voiced(750.0, 1200.0), voiced(480.0, 880.0))
}

/// A user who pauses on cue but says "ah" again when asked for "oh".
pub fn ah_pause_ah(phase: Duration) -> impl Fn(Duration) -> Option<AudioSample> + Send + Sync + 'static {
    three_phases(phase, voiced(750.0, 1200.0), voiced(750.0, 1200.0))
}

fn three_phases(
    phase: Duration,
    first: AudioSample,
    last: AudioSample,
) -> impl Fn(Duration) -> Option<AudioSample> + Send + Sync + 'static {
    move |elapsed| {
        let step = elapsed.as_secs_f64() / phase.as_secs_f64().max(f64::EPSILON);
        let sample = match step as u32 {
            0 => first.clone(),
            1 => quiet(),
            _ => last.clone(),
        };
        Some(sample)
    }
}

/// A muted microphone.
pub fn silence() -> impl Fn(Duration) -> Option<AudioSample> + Send + Sync + 'static {
    |_| Some(quiet())
}

/// A synthetic voice that holds one vowel throughout.
pub fn monotone() -> impl Fn(Duration) -> Option<AudioSample> + Send + Sync + 'static {
    |_| Some(voiced(750.0, 1200.0))
}
