//! The classifier contract shared by every implementation.

use crate::features::{AudioSample, FaceSample};
use livegate_types::{ClassifierResult, FaceLabel, Label, VoiceLabel};
use std::sync::Arc;

/// Maps one feature sample to a labelled decision.
///
/// `infer` is pure with respect to its input: apart from model weights there is
/// no state carried between calls. It must never block indefinitely; an
/// internal failure is reported as [`ClassifierResult::unknown_fallback`].
pub trait Classifier: Send + Sync {
    type Sample;
    type Label: Label;

    fn infer(&self, sample: &Self::Sample) -> ClassifierResult<Self::Label>;

    /// Whether a real model backs this classifier.
    fn is_model_backed(&self) -> bool;

    /// Short name for logs.
    fn name(&self) -> &str;
}

pub type BoxedClassifier<S, L> = Box<dyn Classifier<Sample = S, Label = L>>;

/// Shared classifier over face samples, as held by the face module.
pub type FaceClassifier = Arc<dyn Classifier<Sample = FaceSample, Label = FaceLabel>>;

/// Shared classifier over audio samples, as held by the voice module.
pub type VoiceClassifier = Arc<dyn Classifier<Sample = AudioSample, Label = VoiceLabel>>;
