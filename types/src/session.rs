//! Session identity and the server-issued nonce that binds evidence to it.

use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one registration attempt.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque session-binding value issued once per registration attempt.
///
/// Read-only after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nonce {
    value: String,
    issued_at: Timestamp,
    ttl_secs: u64,
}

impl Nonce {
    pub fn new(value: impl Into<String>, issued_at: Timestamp, ttl_secs: u64) -> Self {
        Self {
            value: value.into(),
            issued_at,
            ttl_secs,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn issued_at(&self) -> Timestamp {
        self.issued_at
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.issued_at.has_expired(self.ttl_secs, now)
    }
}
