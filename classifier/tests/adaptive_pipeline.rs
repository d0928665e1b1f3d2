//! Adaptive selection wired over a real model classifier and the heuristics.

use livegate_classifier::{
    AdaptiveClassifier, AudioSample, Classifier, FaceHeuristic, FaceSample, InferenceError,
    InferenceRuntime, ModelClassifier, VoiceHeuristic,
};
use livegate_types::{FaceLabel, VoiceLabel};
use std::sync::Mutex;

/// Runtime that replays a queue of outputs.
struct QueueRuntime {
    loaded: bool,
    outputs: Mutex<Vec<Result<Vec<f32>, InferenceError>>>,
}

impl QueueRuntime {
    fn new(loaded: bool, mut outputs: Vec<Result<Vec<f32>, InferenceError>>) -> Self {
        outputs.reverse();
        Self {
            loaded,
            outputs: Mutex::new(outputs),
        }
    }
}

impl InferenceRuntime for QueueRuntime {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn infer(&self, _input: &[f32]) -> Result<Vec<f32>, InferenceError> {
        self.outputs
            .lock()
            .unwrap()
            .pop()
            .unwrap_or(Err(InferenceError::Failed("exhausted".into())))
    }
}

fn live_face() -> FaceSample {
    FaceSample {
        face_detected: true,
        depth_score: 0.9,
        texture_score: 0.9,
        motion_energy: 0.2,
        embedding: vec![0.0; 8],
        ..Default::default()
    }
}

fn face_adaptive(runtime: QueueRuntime) -> AdaptiveClassifier<FaceSample, FaceLabel> {
    AdaptiveClassifier::new(
        Box::new(ModelClassifier::new(
            "face-liveness",
            runtime,
            vec![FaceLabel::Live, FaceLabel::Spoof],
        )),
        Box::new(FaceHeuristic::default()),
    )
}

#[test]
fn loaded_model_overrides_heuristic() {
    // The heuristic would say live; the model is confident it is a spoof.
    let adaptive = face_adaptive(QueueRuntime::new(true, vec![Ok(vec![0.1, 0.9])]));
    let r = adaptive.infer(&live_face());
    assert_eq!(r.label, FaceLabel::Spoof);
    assert!(!r.fallback);
}

#[test]
fn missing_model_uses_heuristic_with_fallback_flag() {
    let adaptive = face_adaptive(QueueRuntime::new(false, vec![]));
    let r = adaptive.infer(&live_face());
    assert_eq!(r.label, FaceLabel::Live);
    assert!(r.fallback);
    assert!(!adaptive.is_model_backed());
}

#[test]
fn model_failure_mid_session_degrades_per_sample() {
    let adaptive = face_adaptive(QueueRuntime::new(
        true,
        vec![
            Ok(vec![0.8, 0.2]),
            Err(InferenceError::Failed("thermal throttle".into())),
            Ok(vec![0.7, 0.3]),
        ],
    ));
    let flags: Vec<bool> = (0..3).map(|_| adaptive.infer(&live_face()).fallback).collect();
    assert_eq!(flags, vec![false, true, false]);
}

#[test]
fn uncertain_vowel_model_defers_to_formants() {
    let adaptive: AdaptiveClassifier<AudioSample, VoiceLabel> = AdaptiveClassifier::new(
        Box::new(ModelClassifier::new(
            "vowel",
            QueueRuntime::new(true, vec![Ok(vec![0.3, 0.3, 0.3])]),
            vec![VoiceLabel::Ah, VoiceLabel::Oh, VoiceLabel::Silence],
        )),
        Box::new(VoiceHeuristic::default()),
    );
    let sample = AudioSample {
        rms_db: -18.0,
        voicing: 0.8,
        f1_hz: 480.0,
        f2_hz: 870.0,
        mel: vec![0.0; 40],
    };
    let r = adaptive.infer(&sample);
    assert_eq!(r.label, VoiceLabel::Oh);
    assert!(r.fallback);
}
