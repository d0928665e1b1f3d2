//! The registration backend as seen by the orchestrator.

use livegate_types::{Credential, NetworkError, Nonce, RegistrationPackage, Timestamp};
use std::future::Future;
use std::sync::Arc;

/// Backend calls made during a registration. One call is in flight at a time.
pub trait NetworkClient: Send + Sync {
    /// Issue a fresh nonce for a new attempt.
    fn request_nonce(&self) -> impl Future<Output = Result<Nonce, NetworkError>> + Send;

    /// Submit a signed package and receive a credential valid until `expiration`.
    fn register(
        &self,
        package: &RegistrationPackage,
        expiration: Timestamp,
    ) -> impl Future<Output = Result<Credential, NetworkError>> + Send;
}

impl<T: NetworkClient> NetworkClient for Arc<T> {
    fn request_nonce(&self) -> impl Future<Output = Result<Nonce, NetworkError>> + Send {
        (**self).request_nonce()
    }

    fn register(
        &self,
        package: &RegistrationPackage,
        expiration: Timestamp,
    ) -> impl Future<Output = Result<Credential, NetworkError>> + Send {
        (**self).register(package, expiration)
    }
}
