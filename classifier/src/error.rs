use thiserror::Error;

/// Failure inside an on-device inference runtime.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("no model loaded")]
    NotLoaded,

    #[error("model output has {got} values, expected {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("inference failed: {0}")]
    Failed(String),
}
