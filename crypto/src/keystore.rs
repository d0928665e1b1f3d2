//! Device key store abstraction and an in-memory implementation.

use crate::keys::{generate_keypair, keypair_from_seed};
use crate::sign::sign_message;
use livegate_types::{KeyPair, KeyStoreError, PublicKey, Signature};
use std::collections::HashMap;
use std::sync::RwLock;

/// Signs bytes with a key that never leaves the store.
pub trait KeyStore: Send + Sync {
    fn sign(&self, bytes: &[u8], key_id: &str) -> Result<Signature, KeyStoreError>;

    fn public_key(&self, key_id: &str) -> Result<PublicKey, KeyStoreError>;
}

/// Keys held in process memory. Private key bytes are zeroized on drop.
#[derive(Default)]
pub struct MemoryKeyStore {
    keys: RwLock<HashMap<String, KeyPair>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a deterministic key derived from `seed` under `key_id`.
    pub fn insert_seed(&self, key_id: impl Into<String>, seed: &[u8; 32]) -> Result<PublicKey, KeyStoreError> {
        self.insert(key_id.into(), keypair_from_seed(seed))
    }

    /// Generate a fresh random key under `key_id`.
    pub fn generate(&self, key_id: impl Into<String>) -> Result<PublicKey, KeyStoreError> {
        let kp = generate_keypair().map_err(|e| KeyStoreError::Signing(e.to_string()))?;
        self.insert(key_id.into(), kp)
    }

    fn insert(&self, key_id: String, kp: KeyPair) -> Result<PublicKey, KeyStoreError> {
        let public = kp.public.clone();
        let mut keys = self
            .keys
            .write()
            .map_err(|_| KeyStoreError::Signing("key store lock poisoned".into()))?;
        tracing::debug!(key_id = %key_id, "key stored");
        keys.insert(key_id, kp);
        Ok(public)
    }
}

impl KeyStore for MemoryKeyStore {
    fn sign(&self, bytes: &[u8], key_id: &str) -> Result<Signature, KeyStoreError> {
        let keys = self
            .keys
            .read()
            .map_err(|_| KeyStoreError::Signing("key store lock poisoned".into()))?;
        let kp = keys
            .get(key_id)
            .ok_or_else(|| KeyStoreError::KeyNotFound(key_id.to_string()))?;
        Ok(sign_message(bytes, &kp.private))
    }

    fn public_key(&self, key_id: &str) -> Result<PublicKey, KeyStoreError> {
        let keys = self
            .keys
            .read()
            .map_err(|_| KeyStoreError::Signing("key store lock poisoned".into()))?;
        keys.get(key_id)
            .map(|kp| kp.public.clone())
            .ok_or_else(|| KeyStoreError::KeyNotFound(key_id.to_string()))
    }
}
