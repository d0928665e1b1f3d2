//! Errors reported by the external collaborators the pipeline talks to.

use thiserror::Error;

/// Failure starting or driving a sensor (camera, microphone, haptics).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("permission denied for {0}")]
    PermissionDenied(String),

    #[error("{0} is unavailable on this device")]
    Unavailable(String),

    #[error("sensor failure: {0}")]
    Failed(String),
}

/// Failure talking to the registration backend.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The call may succeed if repeated later.
    #[error("network unavailable: {0}")]
    Transient(String),

    /// The backend refused the registration package.
    #[error("registration package rejected: {0}")]
    Rejected(String),
}

/// Failure signing with the device key store.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum KeyStoreError {
    #[error("no key with id {0}")]
    KeyNotFound(String),

    #[error("signing failed: {0}")]
    Signing(String),
}
