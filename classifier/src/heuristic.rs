//! Rule-based classifiers used when no confident model decision is available.
//!
//! Both always set the fallback flag. Neither returns `unknown` for a detected
//! input: the face heuristic only does so when no face is in frame, the voice
//! heuristic only for non-finite features.

use crate::classifier::Classifier;
use crate::features::{AudioSample, FaceSample};
use livegate_types::{ClassifierResult, FaceLabel, VoiceLabel};
use std::collections::BTreeMap;

/// Liveness from depth, texture and micro-motion cues.
#[derive(Clone, Debug)]
pub struct FaceHeuristic {
    pub depth_weight: f64,
    pub texture_weight: f64,
    pub motion_weight: f64,
    /// Motion energy that counts as fully natural movement.
    pub motion_saturation: f64,
}

impl Default for FaceHeuristic {
    fn default() -> Self {
        Self {
            depth_weight: 0.45,
            texture_weight: 0.35,
            motion_weight: 0.20,
            motion_saturation: 0.2,
        }
    }
}

impl FaceHeuristic {
    /// Probability that the face is live, in [0, 1].
    pub fn live_probability(&self, sample: &FaceSample) -> f64 {
        let motion = (sample.motion_energy / self.motion_saturation).clamp(0.0, 1.0);
        let total = self.depth_weight + self.texture_weight + self.motion_weight;
        let score = self.depth_weight * sample.depth_score.clamp(0.0, 1.0)
            + self.texture_weight * sample.texture_score.clamp(0.0, 1.0)
            + self.motion_weight * motion;
        (score / total).clamp(0.0, 1.0)
    }
}

impl Classifier for FaceHeuristic {
    type Sample = FaceSample;
    type Label = FaceLabel;

    fn infer(&self, sample: &FaceSample) -> ClassifierResult<FaceLabel> {
        if !sample.face_detected {
            return ClassifierResult::unknown_fallback();
        }
        let p_live = self.live_probability(sample);
        if !p_live.is_finite() {
            return ClassifierResult::unknown_fallback();
        }
        let probabilities =
            BTreeMap::from([(FaceLabel::Live, p_live), (FaceLabel::Spoof, 1.0 - p_live)]);
        let label = if p_live >= 0.5 {
            FaceLabel::Live
        } else {
            FaceLabel::Spoof
        };
        let confidence = p_live.max(1.0 - p_live);
        ClassifierResult::new(label, confidence, probabilities, true)
    }

    fn is_model_backed(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "face-heuristic"
    }
}

/// Vowel and silence detection from loudness, voicing and formants.
#[derive(Clone, Debug)]
pub struct VoiceHeuristic {
    /// Buffers quieter than this are silence.
    pub silence_db: f64,
    /// Buffers with less periodicity than this are silence.
    pub min_voicing: f64,
    /// (F1, F2) prototype for "ah", in Hz.
    pub ah_formants: (f64, f64),
    /// (F1, F2) prototype for "oh", in Hz.
    pub oh_formants: (f64, f64),
    /// Formant distance scale (F1, F2), in Hz.
    pub formant_scale: (f64, f64),
}

impl Default for VoiceHeuristic {
    fn default() -> Self {
        Self {
            silence_db: -45.0,
            min_voicing: 0.3,
            ah_formants: (750.0, 1200.0),
            oh_formants: (480.0, 880.0),
            formant_scale: (150.0, 300.0),
        }
    }
}

impl VoiceHeuristic {
    fn formant_distance(&self, sample: &AudioSample, proto: (f64, f64)) -> f64 {
        let d1 = (sample.f1_hz - proto.0) / self.formant_scale.0;
        let d2 = (sample.f2_hz - proto.1) / self.formant_scale.1;
        d1 * d1 + d2 * d2
    }
}

impl Classifier for VoiceHeuristic {
    type Sample = AudioSample;
    type Label = VoiceLabel;

    fn infer(&self, sample: &AudioSample) -> ClassifierResult<VoiceLabel> {
        let finite = [sample.rms_db, sample.voicing, sample.f1_hz, sample.f2_hz]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return ClassifierResult::unknown_fallback();
        }

        if sample.rms_db < self.silence_db || sample.voicing < self.min_voicing {
            // Quieter buffers are more confidently silent.
            let depth = ((self.silence_db - sample.rms_db) / 20.0).clamp(0.0, 1.0);
            let confidence = 0.6 + 0.4 * depth;
            let probabilities = BTreeMap::from([
                (VoiceLabel::Ah, (1.0 - confidence) / 2.0),
                (VoiceLabel::Oh, (1.0 - confidence) / 2.0),
                (VoiceLabel::Silence, confidence),
            ]);
            return ClassifierResult::new(VoiceLabel::Silence, confidence, probabilities, true);
        }

        // Softmax over negative squared distances to the two vowel prototypes.
        let d_ah = self.formant_distance(sample, self.ah_formants);
        let d_oh = self.formant_distance(sample, self.oh_formants);
        let (e_ah, e_oh) = ((-d_ah).exp(), (-d_oh).exp());
        let (p_ah, p_oh) = if e_ah + e_oh > 0.0 {
            (e_ah / (e_ah + e_oh), e_oh / (e_ah + e_oh))
        } else if d_ah <= d_oh {
            (1.0, 0.0)
        } else {
            (0.0, 1.0)
        };
        let probabilities = BTreeMap::from([
            (VoiceLabel::Ah, p_ah),
            (VoiceLabel::Oh, p_oh),
            (VoiceLabel::Silence, 0.0),
        ]);
        let (label, confidence) = if p_ah >= p_oh {
            (VoiceLabel::Ah, p_ah)
        } else {
            (VoiceLabel::Oh, p_oh)
        };
        ClassifierResult::new(label, confidence, probabilities, true)
    }

    fn is_model_backed(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "voice-heuristic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(depth: f64, texture: f64, motion: f64) -> FaceSample {
        FaceSample {
            face_detected: true,
            depth_score: depth,
            texture_score: texture,
            motion_energy: motion,
            ..Default::default()
        }
    }

    fn voiced(f1: f64, f2: f64) -> AudioSample {
        AudioSample {
            rms_db: -20.0,
            voicing: 0.9,
            f1_hz: f1,
            f2_hz: f2,
            mel: Vec::new(),
        }
    }

    #[test]
    fn real_face_is_live() {
        let r = FaceHeuristic::default().infer(&face(0.9, 0.85, 0.15));
        assert_eq!(r.label, FaceLabel::Live);
        assert!(r.probability(FaceLabel::Live) > 0.8);
        assert!(r.fallback);
    }

    #[test]
    fn flat_photo_is_spoof() {
        let r = FaceHeuristic::default().infer(&face(0.1, 0.2, 0.0));
        assert_eq!(r.label, FaceLabel::Spoof);
        assert!(r.confidence > 0.8);
    }

    #[test]
    fn missing_face_is_unknown() {
        let r = FaceHeuristic::default().infer(&FaceSample::default());
        assert_eq!(r.label, FaceLabel::Unknown);
    }

    #[test]
    fn quiet_buffer_is_silence() {
        let sample = AudioSample {
            rms_db: -62.0,
            voicing: 0.05,
            ..Default::default()
        };
        let r = VoiceHeuristic::default().infer(&sample);
        assert_eq!(r.label, VoiceLabel::Silence);
        assert!(r.confidence >= 0.6);
    }

    #[test]
    fn unvoiced_noise_is_silence() {
        let sample = AudioSample {
            rms_db: -25.0,
            voicing: 0.1,
            f1_hz: 700.0,
            f2_hz: 1200.0,
            mel: Vec::new(),
        };
        assert_eq!(VoiceHeuristic::default().infer(&sample).label, VoiceLabel::Silence);
    }

    #[test]
    fn open_vowel_is_ah() {
        let r = VoiceHeuristic::default().infer(&voiced(760.0, 1210.0));
        assert_eq!(r.label, VoiceLabel::Ah);
        assert!(r.confidence > 0.9);
    }

    #[test]
    fn rounded_vowel_is_oh() {
        let r = VoiceHeuristic::default().infer(&voiced(470.0, 860.0));
        assert_eq!(r.label, VoiceLabel::Oh);
    }

    #[test]
    fn voiced_input_is_never_unknown() {
        let r = VoiceHeuristic::default().infer(&voiced(5_000.0, 9_000.0));
        assert!(r.label.is_voiced());
    }

    #[test]
    fn non_finite_audio_is_unknown() {
        let r = VoiceHeuristic::default().infer(&voiced(f64::NAN, 900.0));
        assert_eq!(r.label, VoiceLabel::Unknown);
    }
}
