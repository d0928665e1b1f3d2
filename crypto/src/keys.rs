//! Ed25519 key generation.

use ed25519_dalek::SigningKey;
use livegate_types::{KeyPair, PrivateKey, PublicKey};

/// Generate a new Ed25519 key pair from the operating system's entropy source.
pub fn generate_keypair() -> Result<KeyPair, getrandom::Error> {
    let mut seed = [0u8; 32];
    getrandom::getrandom(&mut seed)?;
    let kp = keypair_from_seed(&seed);
    seed.fill(0);
    Ok(kp)
}

/// Derive a key pair from a 32-byte seed (deterministic).
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let signing_key = SigningKey::from_bytes(seed);
    KeyPair {
        public: PublicKey(signing_key.verifying_key().to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_derivation_is_deterministic() {
        let a = keypair_from_seed(&[7u8; 32]);
        let b = keypair_from_seed(&[7u8; 32]);
        assert_eq!(a.public, b.public);
        assert_eq!(a.private.0, b.private.0);
    }

    #[test]
    fn generated_keys_differ() {
        let a = generate_keypair().unwrap();
        let b = generate_keypair().unwrap();
        assert_ne!(a.public, b.public);
    }
}
