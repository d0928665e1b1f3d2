use livegate_modules::ModuleError;
use livegate_types::{KeyStoreError, ModuleId, NetworkError, SensorError, TrustGrade};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a registration attempt ended without a credential.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RegistrationError {
    #[error("{module} failed: {source}")]
    Module {
        module: ModuleId,
        #[source]
        source: ModuleError,
    },

    #[error("missing result for {0}")]
    MissingModuleResults(ModuleId),

    #[error("trust grade {grade} is too low for a credential")]
    TrustGradeTooLow { grade: TrustGrade },

    #[error("session nonce expired before submission")]
    NonceExpired,

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),

    #[error(transparent)]
    Sensor(#[from] SensorError),

    #[error("{0}")]
    Other(String),
}

impl RegistrationError {
    /// Attach the failing module to a module error. Sensor failures stay infrastructure errors.
    pub fn from_module(module: ModuleId, source: ModuleError) -> Self {
        match source {
            ModuleError::Sensor(e) => Self::Sensor(e),
            source => Self::Module { module, source },
        }
    }

    /// Only a rule-based rejection of the evidence is final.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::TrustGradeTooLow { .. })
    }

    /// Message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Module { source, .. } => source.user_message().to_string(),
            Self::MissingModuleResults(_) => {
                "Some verification steps didn't finish. Please try again.".to_string()
            }
            Self::TrustGradeTooLow { .. } => {
                "We couldn't verify you with enough confidence to issue a credential.".to_string()
            }
            Self::NonceExpired => "Your session timed out. Please start again.".to_string(),
            Self::Sensor(SensorError::PermissionDenied(what)) => {
                format!("Permission to use the {what} is needed. Enable it in settings and try again.")
            }
            Self::Network(_) | Self::KeyStore(_) | Self::Sensor(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            Self::Other(description) => description.clone(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Module { .. } => FailureKind::Module,
            Self::MissingModuleResults(_) => FailureKind::MissingModuleResults,
            Self::TrustGradeTooLow { .. } => FailureKind::TrustGradeTooLow,
            Self::NonceExpired => FailureKind::NonceExpired,
            Self::Network(_) | Self::KeyStore(_) | Self::Sensor(_) => FailureKind::Infrastructure,
            Self::Other(_) => FailureKind::Other,
        }
    }

    pub fn to_failure(&self) -> FailureReason {
        FailureReason {
            kind: self.kind(),
            message: self.user_message(),
            detail: self.to_string(),
            retryable: self.is_retryable(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Module,
    MissingModuleResults,
    TrustGradeTooLow,
    NonceExpired,
    Infrastructure,
    Other,
}

/// Structured failure published on the state stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    pub kind: FailureKind,
    /// User-facing text.
    pub message: String,
    /// Diagnostic description.
    pub detail: String,
    pub retryable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_low_grade_is_final() {
        assert!(!RegistrationError::TrustGradeTooLow {
            grade: TrustGrade::D
        }
        .is_retryable());
        let retryable = [
            RegistrationError::MissingModuleResults(ModuleId::TouchHaptic),
            RegistrationError::NonceExpired,
            RegistrationError::Network(NetworkError::Transient("offline".into())),
            RegistrationError::Network(NetworkError::Rejected("bad package".into())),
            RegistrationError::Other("disk full".into()),
            RegistrationError::from_module(
                ModuleId::FaceLiveness,
                ModuleError::FaceNotDetected { ratio: 0.1 },
            ),
        ];
        assert!(retryable.iter().all(|e| e.is_retryable()));
    }

    #[test]
    fn module_failures_keep_their_message() {
        let err = RegistrationError::from_module(
            ModuleId::FaceLiveness,
            ModuleError::GazeNotDetected { ratio: 0.0 },
        );
        assert_eq!(err.user_message(), ModuleError::GazeNotDetected { ratio: 0.0 }.user_message());
        assert_eq!(err.kind(), FailureKind::Module);
    }

    #[test]
    fn sensor_permission_is_infrastructure() {
        let err = RegistrationError::from_module(
            ModuleId::VoiceChallenge,
            ModuleError::Sensor(SensorError::PermissionDenied("microphone".into())),
        );
        let failure = err.to_failure();
        assert_eq!(failure.kind, FailureKind::Infrastructure);
        assert!(failure.retryable);
        assert!(failure.message.contains("microphone"));
    }

    #[test]
    fn unclassified_errors_surface_verbatim() {
        let failure = RegistrationError::Other("database is locked".into()).to_failure();
        assert_eq!(failure.message, "database is locked");
        assert!(failure.retryable);
    }
}
