//! Adaptive selector: a confident model decision, else the heuristic.

use crate::classifier::{BoxedClassifier, Classifier};
use livegate_types::{ClassifierResult, Label};

/// Model decisions below this confidence are discarded.
pub const DEFAULT_MIN_MODEL_CONFIDENCE: f64 = 0.35;

/// Wraps a model-backed and a heuristic classifier behind one [`Classifier`].
///
/// The model result is accepted only when its label is not `unknown` and its
/// confidence is at least `min_confidence`. Otherwise the heuristic decides and
/// the result is marked as a fallback regardless of what the heuristic reported.
pub struct AdaptiveClassifier<S, L: Label> {
    model: BoxedClassifier<S, L>,
    heuristic: BoxedClassifier<S, L>,
    min_confidence: f64,
    name: String,
}

impl<S, L: Label> AdaptiveClassifier<S, L> {
    pub fn new(model: BoxedClassifier<S, L>, heuristic: BoxedClassifier<S, L>) -> Self {
        Self::with_min_confidence(model, heuristic, DEFAULT_MIN_MODEL_CONFIDENCE)
    }

    pub fn with_min_confidence(
        model: BoxedClassifier<S, L>,
        heuristic: BoxedClassifier<S, L>,
        min_confidence: f64,
    ) -> Self {
        let name = format!("adaptive({}|{})", model.name(), heuristic.name());
        Self {
            model,
            heuristic,
            min_confidence,
            name,
        }
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    fn accepts(&self, result: &ClassifierResult<L>) -> bool {
        !result.label.is_unknown() && result.confidence >= self.min_confidence
    }
}

impl<S, L: Label> Classifier for AdaptiveClassifier<S, L> {
    type Sample = S;
    type Label = L;

    fn infer(&self, sample: &S) -> ClassifierResult<L> {
        let primary = self.model.infer(sample);
        if self.accepts(&primary) {
            return primary;
        }
        tracing::trace!(
            classifier = %self.name,
            label = primary.label.as_str(),
            confidence = primary.confidence,
            "model decision rejected, using heuristic"
        );
        let mut result = self.heuristic.infer(sample);
        result.fallback = true;
        result
    }

    fn is_model_backed(&self) -> bool {
        self.model.is_model_backed()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livegate_types::FaceLabel;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Returns a fixed decision and counts calls.
    struct Fixed {
        label: FaceLabel,
        confidence: f64,
        fallback: bool,
        model_backed: bool,
        calls: Arc<AtomicUsize>,
    }

    impl Fixed {
        fn boxed(
            label: FaceLabel,
            confidence: f64,
            fallback: bool,
            model_backed: bool,
        ) -> (BoxedClassifier<(), FaceLabel>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let c = Fixed {
                label,
                confidence,
                fallback,
                model_backed,
                calls: calls.clone(),
            };
            (Box::new(c), calls)
        }
    }

    impl Classifier for Fixed {
        type Sample = ();
        type Label = FaceLabel;

        fn infer(&self, _sample: &()) -> ClassifierResult<FaceLabel> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ClassifierResult::new(self.label, self.confidence, BTreeMap::new(), self.fallback)
        }

        fn is_model_backed(&self) -> bool {
            self.model_backed
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn confident_model_result_is_used() {
        let (model, _) = Fixed::boxed(FaceLabel::Live, 0.9, false, true);
        let (heuristic, heuristic_calls) = Fixed::boxed(FaceLabel::Spoof, 0.7, true, false);
        let adaptive = AdaptiveClassifier::new(model, heuristic);
        let r = adaptive.infer(&());
        assert_eq!(r.label, FaceLabel::Live);
        assert!(!r.fallback);
        assert_eq!(heuristic_calls.load(Ordering::SeqCst), 0);
        assert!(adaptive.is_model_backed());
    }

    #[test]
    fn threshold_is_inclusive() {
        let (model, _) = Fixed::boxed(FaceLabel::Live, 0.35, false, true);
        let (heuristic, _) = Fixed::boxed(FaceLabel::Spoof, 0.7, true, false);
        let r = AdaptiveClassifier::new(model, heuristic).infer(&());
        assert_eq!(r.label, FaceLabel::Live);
    }

    #[test]
    fn low_confidence_falls_back() {
        let (model, model_calls) = Fixed::boxed(FaceLabel::Live, 0.34, false, true);
        let (heuristic, _) = Fixed::boxed(FaceLabel::Spoof, 0.7, true, false);
        let r = AdaptiveClassifier::new(model, heuristic).infer(&());
        assert_eq!(r.label, FaceLabel::Spoof);
        assert!(r.fallback);
        assert_eq!(model_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unknown_model_label_falls_back_even_when_confident() {
        let (model, _) = Fixed::boxed(FaceLabel::Unknown, 0.99, false, true);
        let (heuristic, _) = Fixed::boxed(FaceLabel::Live, 0.6, true, false);
        let r = AdaptiveClassifier::new(model, heuristic).infer(&());
        assert_eq!(r.label, FaceLabel::Live);
    }

    #[test]
    fn fallback_flag_is_forced() {
        // A heuristic that (wrongly) reports fallback = false still yields a fallback result.
        let (model, _) = Fixed::boxed(FaceLabel::Unknown, 0.0, true, false);
        let (heuristic, _) = Fixed::boxed(FaceLabel::Live, 0.8, false, false);
        let adaptive = AdaptiveClassifier::new(model, heuristic);
        let r = adaptive.infer(&());
        assert!(r.fallback);
        assert!(!adaptive.is_model_backed());
    }

    #[test]
    fn custom_threshold() {
        let (model, _) = Fixed::boxed(FaceLabel::Live, 0.5, false, true);
        let (heuristic, _) = Fixed::boxed(FaceLabel::Spoof, 0.7, true, false);
        let adaptive = AdaptiveClassifier::with_min_confidence(model, heuristic, 0.6);
        assert_eq!(adaptive.infer(&()).label, FaceLabel::Spoof);
    }
}
