//! Key and signature types for signing registration packages.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A 32-byte Ed25519 public key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

/// A 32-byte Ed25519 signing seed.
///
/// Not `Debug`, `Serialize` or `Clone`. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub [u8; 32]);

/// A 64-byte Ed25519 signature, serialized as lowercase hex.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

/// An Ed25519 key pair held by the key store.
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a signature from its 128-character hex form.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let arr: [u8; 64] = bytes.try_into().ok()?;
        Some(Self(arr))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", hex::encode(&self.0[..6]))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Signature::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom("expected 128 hex characters"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_hex_roundtrip() {
        let sig = Signature([0xab; 64]);
        let parsed = Signature::from_hex(&sig.to_hex()).unwrap();
        assert_eq!(parsed, sig);
    }

    #[test]
    fn public_key_hex_is_64_chars() {
        let key = PublicKey([0x0f; 32]);
        assert_eq!(key.to_hex().len(), 64);
        assert!(key.to_hex().starts_with("0f0f"));
    }

    #[test]
    fn signature_rejects_short_hex() {
        assert!(Signature::from_hex("abcd").is_none());
        assert!(Signature::from_hex("not hex").is_none());
    }

    #[test]
    fn signature_json_is_a_string() {
        let sig = Signature([1; 64]);
        let json = serde_json::to_string(&sig).unwrap();
        assert!(json.starts_with('"'));
        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }
}
