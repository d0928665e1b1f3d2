//! Per-sample classifiers for the face and voice modules.
//!
//! Every classifier implements [`Classifier`]. Three implementations compose:
//! - [`ModelClassifier`] runs an on-device [`InferenceRuntime`].
//! - [`FaceHeuristic`] / [`VoiceHeuristic`] decide from hand-tuned feature rules.
//! - [`AdaptiveClassifier`] prefers a confident model decision and otherwise
//!   falls back to the heuristic, marking the result as a fallback.

pub mod adaptive;
pub mod classifier;
pub mod error;
pub mod features;
pub mod heuristic;
pub mod model;

pub use adaptive::{AdaptiveClassifier, DEFAULT_MIN_MODEL_CONFIDENCE};
pub use classifier::{BoxedClassifier, Classifier, FaceClassifier, VoiceClassifier};
pub use error::InferenceError;
pub use features::{AudioSample, FaceSample, ModelInput};
pub use heuristic::{FaceHeuristic, VoiceHeuristic};
pub use model::{InferenceRuntime, ModelClassifier};
