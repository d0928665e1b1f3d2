//! Nullable network: issue nonces and credentials without a backend.

use crate::lock;
use livegate_types::{Clock, Credential, NetworkError, Nonce, RegistrationPackage, Timestamp};
use livegate_verification::NetworkClient;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A test backend that records submissions instead of sending them.
pub struct NullNetwork {
    clock: Arc<dyn Clock>,
    nonce_ttl_secs: u64,
    issued: AtomicU64,
    nonce_failures: Mutex<VecDeque<NetworkError>>,
    register_failures: Mutex<VecDeque<NetworkError>>,
    submissions: Mutex<Vec<(RegistrationPackage, Timestamp)>>,
}

impl NullNetwork {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            nonce_ttl_secs: 600,
            issued: AtomicU64::new(0),
            nonce_failures: Mutex::new(VecDeque::new()),
            register_failures: Mutex::new(VecDeque::new()),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Issue nonces that live for `secs`.
    pub fn with_nonce_ttl(mut self, secs: u64) -> Self {
        self.nonce_ttl_secs = secs;
        self
    }

    /// Fail the next nonce request with `error`.
    pub fn fail_next_nonce(&self, error: NetworkError) {
        lock(&self.nonce_failures).push_back(error);
    }

    /// Fail the next registration with `error`.
    pub fn fail_next_register(&self, error: NetworkError) {
        lock(&self.register_failures).push_back(error);
    }

    /// Every package submitted, with the requested expiration.
    pub fn submissions(&self) -> Vec<(RegistrationPackage, Timestamp)> {
        lock(&self.submissions).clone()
    }

    pub fn nonces_issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

impl NetworkClient for NullNetwork {
    async fn request_nonce(&self) -> Result<Nonce, NetworkError> {
        if let Some(err) = lock(&self.nonce_failures).pop_front() {
            return Err(err);
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Nonce::new(
            format!("nonce-{n:04}"),
            self.clock.now(),
            self.nonce_ttl_secs,
        ))
    }

    async fn register(
        &self,
        package: &RegistrationPackage,
        expiration: Timestamp,
    ) -> Result<Credential, NetworkError> {
        lock(&self.submissions).push((package.clone(), expiration));
        if let Some(err) = lock(&self.register_failures).pop_front() {
            return Err(err);
        }
        let n = lock(&self.submissions).len();
        Ok(Credential {
            id: format!("cred-{n:04}"),
            session_id: package.session_id.clone(),
            grade: package.summary.grade,
            trust_score: package.summary.trust_score,
            issued_at: self.clock.now(),
            expires_at: expiration,
        })
    }
}
