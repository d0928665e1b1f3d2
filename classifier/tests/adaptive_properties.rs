use proptest::prelude::*;

use livegate_classifier::{
    AdaptiveClassifier, Classifier, FaceHeuristic, FaceSample, DEFAULT_MIN_MODEL_CONFIDENCE,
};
use livegate_types::{ClassifierResult, FaceLabel, Label};
use std::collections::BTreeMap;

/// Stands in for a model that always reports the same decision.
struct Decided {
    label: FaceLabel,
    confidence: f64,
}

impl Classifier for Decided {
    type Sample = FaceSample;
    type Label = FaceLabel;

    fn infer(&self, _sample: &FaceSample) -> ClassifierResult<FaceLabel> {
        ClassifierResult::new(self.label, self.confidence, BTreeMap::new(), false)
    }

    fn is_model_backed(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "decided"
    }
}

fn any_face_label() -> impl Strategy<Value = FaceLabel> {
    prop_oneof![
        Just(FaceLabel::Live),
        Just(FaceLabel::Spoof),
        Just(FaceLabel::Unknown),
    ]
}

fn detected_face() -> impl Strategy<Value = FaceSample> {
    (-40.0..40.0f64, -30.0..30.0f64, 0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64).prop_map(
        |(yaw_deg, pitch_deg, depth_score, texture_score, motion_energy)| FaceSample {
            face_detected: true,
            yaw_deg,
            pitch_deg,
            depth_score,
            texture_score,
            motion_energy,
            embedding: Vec::new(),
        },
    )
}

proptest! {
    /// A confident, decided model result passes through untouched; anything
    /// else is a heuristic fallback.
    #[test]
    fn adaptive_result_is_model_or_flagged_fallback(
        label in any_face_label(),
        confidence in 0.0..=1.0f64,
        sample in detected_face(),
    ) {
        let adaptive = AdaptiveClassifier::new(
            Box::new(Decided { label, confidence }),
            Box::new(FaceHeuristic::default()),
        );
        let r = adaptive.infer(&sample);
        if !label.is_unknown() && confidence >= DEFAULT_MIN_MODEL_CONFIDENCE {
            prop_assert_eq!(r.label, label);
            prop_assert_eq!(r.confidence, confidence);
            prop_assert!(!r.fallback);
        } else {
            prop_assert!(r.fallback);
        }
    }

    /// With a face in frame the heuristic always decides, so the adaptive
    /// classifier never answers unknown.
    #[test]
    fn detected_face_is_never_unknown(
        label in any_face_label(),
        confidence in 0.0..=1.0f64,
        sample in detected_face(),
    ) {
        let adaptive = AdaptiveClassifier::new(
            Box::new(Decided { label, confidence }),
            Box::new(FaceHeuristic::default()),
        );
        let r = adaptive.infer(&sample);
        prop_assert!(!r.label.is_unknown());
        prop_assert!((0.0..=1.0).contains(&r.confidence));
    }
}
