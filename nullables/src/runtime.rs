//! Nullable inference runtime: canned model outputs.

use livegate_classifier::{InferenceError, InferenceRuntime};

/// An inference runtime that returns a fixed answer.
#[derive(Clone, Debug)]
pub struct NullRuntime {
    loaded: bool,
    output: Result<Vec<f32>, InferenceError>,
}

impl NullRuntime {
    /// No model on the device; classifiers fall back to heuristics.
    pub fn unloaded() -> Self {
        Self {
            loaded: false,
            output: Err(InferenceError::NotLoaded),
        }
    }

    /// A loaded model that always returns `output`.
    pub fn fixed(output: Vec<f32>) -> Self {
        Self {
            loaded: true,
            output: Ok(output),
        }
    }

    /// A loaded model whose every call fails.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            loaded: true,
            output: Err(InferenceError::Failed(reason.into())),
        }
    }
}

impl InferenceRuntime for NullRuntime {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn infer(&self, _input: &[f32]) -> Result<Vec<f32>, InferenceError> {
        self.output.clone()
    }
}
