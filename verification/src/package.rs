//! Package assembly, signing and signature verification.

use crate::error::RegistrationError;
use livegate_crypto::{blake2b_256_multi, verify_signature, KeyStore};
use livegate_types::{Nonce, PublicKey, RegistrationPackage, SessionId};

const SESSION_DOMAIN: &[u8] = b"livegate/session/v1";

/// Session id bound to a nonce: the first 16 bytes of a Blake2b digest, hex encoded.
pub fn session_id_for(nonce: &Nonce) -> SessionId {
    let digest = blake2b_256_multi(&[
        SESSION_DOMAIN,
        nonce.value().as_bytes(),
        &nonce.issued_at().as_secs().to_be_bytes(),
    ]);
    SessionId::new(hex::encode(&digest[..16]))
}

/// The bytes a package signature covers: the bincode encoding with no signature.
pub fn signing_bytes(package: &RegistrationPackage) -> Result<Vec<u8>, RegistrationError> {
    bincode::serialize(&package.unsigned())
        .map_err(|e| RegistrationError::Other(format!("cannot encode package: {e}")))
}

/// Sign `package` in place with the key store key `key_id`.
pub fn sign_package(
    package: &mut RegistrationPackage,
    keys: &dyn KeyStore,
    key_id: &str,
) -> Result<(), RegistrationError> {
    let bytes = signing_bytes(package)?;
    package.signature = Some(keys.sign(&bytes, key_id)?);
    Ok(())
}

/// Whether `package` carries a valid signature by `public_key`.
pub fn verify_package(package: &RegistrationPackage, public_key: &PublicKey) -> bool {
    let Some(signature) = package.signature.as_ref() else {
        return false;
    };
    match signing_bytes(package) {
        Ok(bytes) => verify_signature(&bytes, signature, public_key),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::score_graph;
    use livegate_crypto::MemoryKeyStore;
    use livegate_modules::skipped_atom;
    use livegate_types::{KeyStoreError, ModuleId, ModuleScores, Timestamp};

    fn package() -> RegistrationPackage {
        let nonce = Nonce::new("n-1", Timestamp::new(1_000), 600);
        let session_id = session_id_for(&nonce);
        let atom = |m| skipped_atom(&session_id, nonce.value(), m);
        RegistrationPackage {
            face: atom(ModuleId::FaceLiveness),
            voice: atom(ModuleId::VoiceChallenge),
            touch: atom(ModuleId::TouchHaptic),
            summary: score_graph(ModuleScores {
                face: 0.0,
                voice: 0.0,
                touch: 0.0,
            }),
            session_id,
            nonce: nonce.value().to_string(),
            signature: None,
        }
    }

    #[test]
    fn session_id_is_stable_per_nonce() {
        let a = Nonce::new("n-1", Timestamp::new(1_000), 600);
        let b = Nonce::new("n-2", Timestamp::new(1_000), 600);
        assert_eq!(session_id_for(&a), session_id_for(&a.clone()));
        assert_ne!(session_id_for(&a), session_id_for(&b));
        assert_eq!(session_id_for(&a).as_str().len(), 32);
    }

    #[test]
    fn signed_package_verifies() {
        let keys = MemoryKeyStore::new();
        let public = keys.insert_seed("registration", &[9u8; 32]).unwrap();
        let mut pkg = package();
        sign_package(&mut pkg, &keys, "registration").unwrap();
        assert!(verify_package(&pkg, &public));
    }

    #[test]
    fn tampering_breaks_the_signature() {
        let keys = MemoryKeyStore::new();
        let public = keys.insert_seed("registration", &[9u8; 32]).unwrap();
        let mut pkg = package();
        sign_package(&mut pkg, &keys, "registration").unwrap();
        pkg.nonce = "n-2".into();
        assert!(!verify_package(&pkg, &public));
    }

    #[test]
    fn unsigned_package_does_not_verify() {
        let keys = MemoryKeyStore::new();
        let public = keys.insert_seed("registration", &[9u8; 32]).unwrap();
        assert!(!verify_package(&package(), &public));
    }

    #[test]
    fn unknown_key_is_reported() {
        let keys = MemoryKeyStore::new();
        let err = sign_package(&mut package(), &keys, "missing").unwrap_err();
        assert_eq!(
            err,
            RegistrationError::KeyStore(KeyStoreError::KeyNotFound("missing".into()))
        );
    }
}
