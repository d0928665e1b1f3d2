//! Classifier label sets and the per-sample classifier result.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;

/// A fixed, ordered label set for one modality.
///
/// The declaration order of `ALL` is the tie-break order for majority votes.
pub trait Label: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// Every label, in enumeration order.
    const ALL: &'static [Self];

    /// The "no decision" label.
    fn unknown() -> Self;

    fn is_unknown(&self) -> bool {
        *self == Self::unknown()
    }

    fn as_str(&self) -> &'static str;
}

/// Face liveness labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FaceLabel {
    Live,
    Spoof,
    Unknown,
}

impl Label for FaceLabel {
    const ALL: &'static [Self] = &[Self::Live, Self::Spoof, Self::Unknown];

    fn unknown() -> Self {
        Self::Unknown
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Spoof => "spoof",
            Self::Unknown => "unknown",
        }
    }
}

/// Voice challenge labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VoiceLabel {
    Ah,
    Oh,
    Silence,
    Unknown,
}

impl VoiceLabel {
    /// "ah" or "oh", the two labels a heuristic classifier tends to confuse.
    pub fn is_voiced(&self) -> bool {
        matches!(self, Self::Ah | Self::Oh)
    }
}

impl Label for VoiceLabel {
    const ALL: &'static [Self] = &[Self::Ah, Self::Oh, Self::Silence, Self::Unknown];

    fn unknown() -> Self {
        Self::Unknown
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Ah => "ah",
            Self::Oh => "oh",
            Self::Silence => "silence",
            Self::Unknown => "unknown",
        }
    }
}

/// Decision for one sample.
///
/// Produced per sample and never persisted individually.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifierResult<L: Label> {
    pub label: L,
    /// Confidence of `label` in [0, 1].
    pub confidence: f64,
    /// Probability assigned to each label.
    pub probabilities: BTreeMap<L, f64>,
    /// True when the decision came from a rule-based fallback rather than a model.
    pub fallback: bool,
}

impl<L: Label> ClassifierResult<L> {
    pub fn new(label: L, confidence: f64, probabilities: BTreeMap<L, f64>, fallback: bool) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
            probabilities,
            fallback,
        }
    }

    /// The result a classifier returns when it cannot decide at all.
    pub fn unknown_fallback() -> Self {
        Self {
            label: L::unknown(),
            confidence: 0.0,
            probabilities: BTreeMap::new(),
            fallback: true,
        }
    }

    /// Pick the highest-probability label. Ties go to the earlier label in `L::ALL`.
    /// A map with no positive probability yields [`Self::unknown_fallback`].
    pub fn from_probabilities(probabilities: BTreeMap<L, f64>, fallback: bool) -> Self {
        let mut best: Option<(L, f64)> = None;
        for label in L::ALL {
            let p = probabilities.get(label).copied().unwrap_or(0.0);
            if best.map_or(true, |(_, bp)| p > bp) {
                best = Some((*label, p));
            }
        }
        match best {
            Some((label, p)) if p > 0.0 => Self::new(label, p, probabilities, fallback),
            _ => Self::unknown_fallback(),
        }
    }

    /// Probability of `label`, or 0 when the classifier did not report it.
    pub fn probability(&self, label: L) -> f64 {
        self.probabilities.get(&label).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_enumeration_order_on_tie() {
        let probs = BTreeMap::from([(VoiceLabel::Oh, 0.4), (VoiceLabel::Ah, 0.4)]);
        let r = ClassifierResult::from_probabilities(probs, false);
        assert_eq!(r.label, VoiceLabel::Ah);
        assert_eq!(r.confidence, 0.4);
    }

    #[test]
    fn unknown_fallback_has_zero_confidence() {
        let r = ClassifierResult::<FaceLabel>::unknown_fallback();
        assert_eq!(r.label, FaceLabel::Unknown);
        assert_eq!(r.confidence, 0.0);
        assert!(r.fallback);
    }

    #[test]
    fn confidence_is_clamped() {
        let r = ClassifierResult::new(FaceLabel::Live, 1.7, BTreeMap::new(), false);
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn voiced_labels() {
        assert!(VoiceLabel::Ah.is_voiced());
        assert!(VoiceLabel::Oh.is_voiced());
        assert!(!VoiceLabel::Silence.is_voiced());
        assert!(!VoiceLabel::Unknown.is_voiced());
    }
}
