//! Cryptographic primitives for LiveGate.
//!
//! - **Blake2b** for evidence commitments and outcome summary hashes
//! - **Ed25519** for signing registration packages
//! - An in-memory [`KeyStore`] for tests and the simulator

pub mod hash;
pub mod keys;
pub mod keystore;
pub mod sign;

pub use hash::{blake2b_256_multi, evidence_commitment, outcome_summary_hash};
pub use keys::{generate_keypair, keypair_from_seed};
pub use keystore::{KeyStore, MemoryKeyStore};
pub use sign::{sign_message, verify_signature};
