//! Model-backed classifier over an on-device inference runtime.

use crate::classifier::Classifier;
use crate::error::InferenceError;
use crate::features::ModelInput;
use livegate_types::{ClassifierResult, Label};
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Synchronous on-device inference.
///
/// Returns one probability per output label, in the order the classifier was
/// configured with.
pub trait InferenceRuntime: Send + Sync {
    fn is_loaded(&self) -> bool;

    fn infer(&self, input: &[f32]) -> Result<Vec<f32>, InferenceError>;
}

/// Classifier that asks an [`InferenceRuntime`] for label probabilities.
///
/// Any runtime failure yields `unknown` with confidence 0 and the fallback flag set.
pub struct ModelClassifier<S, L: Label, R> {
    runtime: R,
    outputs: Vec<L>,
    name: String,
    _sample: PhantomData<fn(&S)>,
}

impl<S, L: Label, R: InferenceRuntime> ModelClassifier<S, L, R> {
    /// `outputs` names the label of each value the runtime returns.
    pub fn new(name: impl Into<String>, runtime: R, outputs: Vec<L>) -> Self {
        Self {
            runtime,
            outputs,
            name: name.into(),
            _sample: PhantomData,
        }
    }

    fn run(&self, input: &[f32]) -> Result<ClassifierResult<L>, InferenceError> {
        if !self.runtime.is_loaded() {
            return Err(InferenceError::NotLoaded);
        }
        let raw = self.runtime.infer(input)?;
        if raw.len() != self.outputs.len() {
            return Err(InferenceError::ShapeMismatch {
                expected: self.outputs.len(),
                got: raw.len(),
            });
        }
        let mut probabilities = BTreeMap::new();
        for (label, p) in self.outputs.iter().zip(raw) {
            let p = f64::from(p);
            if !p.is_finite() {
                return Err(InferenceError::Failed(format!("non-finite output for {}", label.as_str())));
            }
            probabilities.insert(*label, p.clamp(0.0, 1.0));
        }
        Ok(ClassifierResult::from_probabilities(probabilities, false))
    }
}

impl<S, L, R> Classifier for ModelClassifier<S, L, R>
where
    S: ModelInput,
    L: Label,
    R: InferenceRuntime,
{
    type Sample = S;
    type Label = L;

    fn infer(&self, sample: &S) -> ClassifierResult<L> {
        match self.run(sample.model_input()) {
            Ok(result) => result,
            Err(InferenceError::NotLoaded) => ClassifierResult::unknown_fallback(),
            Err(e) => {
                tracing::warn!(classifier = %self.name, error = %e, "model inference failed");
                ClassifierResult::unknown_fallback()
            }
        }
    }

    fn is_model_backed(&self) -> bool {
        self.runtime.is_loaded()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::AudioSample;
    use livegate_types::VoiceLabel;

    struct FixedRuntime {
        loaded: bool,
        output: Result<Vec<f32>, InferenceError>,
    }

    impl InferenceRuntime for FixedRuntime {
        fn is_loaded(&self) -> bool {
            self.loaded
        }

        fn infer(&self, _input: &[f32]) -> Result<Vec<f32>, InferenceError> {
            self.output.clone()
        }
    }

    fn classifier(runtime: FixedRuntime) -> ModelClassifier<AudioSample, VoiceLabel, FixedRuntime> {
        ModelClassifier::new(
            "vowel",
            runtime,
            vec![VoiceLabel::Ah, VoiceLabel::Oh, VoiceLabel::Silence],
        )
    }

    #[test]
    fn picks_highest_probability() {
        let c = classifier(FixedRuntime {
            loaded: true,
            output: Ok(vec![0.1, 0.8, 0.1]),
        });
        let r = c.infer(&AudioSample::default());
        assert_eq!(r.label, VoiceLabel::Oh);
        assert!((r.confidence - 0.8).abs() < 1e-6);
        assert!(!r.fallback);
        assert!(c.is_model_backed());
    }

    #[test]
    fn unloaded_model_yields_unknown_fallback() {
        let c = classifier(FixedRuntime {
            loaded: false,
            output: Ok(vec![1.0, 0.0, 0.0]),
        });
        let r = c.infer(&AudioSample::default());
        assert_eq!(r.label, VoiceLabel::Unknown);
        assert_eq!(r.confidence, 0.0);
        assert!(r.fallback);
        assert!(!c.is_model_backed());
    }

    #[test]
    fn runtime_error_yields_unknown_fallback() {
        let c = classifier(FixedRuntime {
            loaded: true,
            output: Err(InferenceError::Failed("gpu lost".into())),
        });
        let r = c.infer(&AudioSample::default());
        assert_eq!(r.label, VoiceLabel::Unknown);
        assert!(r.fallback);
    }

    #[test]
    fn wrong_output_shape_yields_unknown_fallback() {
        let c = classifier(FixedRuntime {
            loaded: true,
            output: Ok(vec![0.9, 0.1]),
        });
        assert_eq!(c.infer(&AudioSample::default()).label, VoiceLabel::Unknown);
    }

    #[test]
    fn non_finite_output_yields_unknown_fallback() {
        let c = classifier(FixedRuntime {
            loaded: true,
            output: Ok(vec![f32::NAN, 0.5, 0.1]),
        });
        assert_eq!(c.infer(&AudioSample::default()).label, VoiceLabel::Unknown);
    }
}
