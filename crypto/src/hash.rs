//! Blake2b hashing for evidence commitments and outcome summaries.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use livegate_types::{Digest32, ModuleId, SessionId};

type Blake2b256 = Blake2b<U32>;

fn finish(hasher: Blake2b256) -> [u8; 32] {
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

const COMMITMENT_DOMAIN: &[u8] = b"livegate/commitment/v1";
const SUMMARY_DOMAIN: &[u8] = b"livegate/summary/v1";

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    finish(hasher)
}

/// Feed a length-prefixed field so adjacent fields cannot be re-split.
fn update_field(hasher: &mut Blake2b256, field: &[u8]) {
    hasher.update((field.len() as u32).to_le_bytes());
    hasher.update(field);
}

/// Commitment binding a module run to a session and nonce.
///
/// Depends only on `(session, nonce, module)`. The module's score is not
/// covered, so the commitment proves that the module ran in this session,
/// not what it concluded.
pub fn evidence_commitment(session: &SessionId, nonce: &str, module: ModuleId) -> Digest32 {
    let mut hasher = Blake2b256::new();
    hasher.update(COMMITMENT_DOMAIN);
    update_field(&mut hasher, session.as_str().as_bytes());
    update_field(&mut hasher, nonce.as_bytes());
    update_field(&mut hasher, module.as_str().as_bytes());
    Digest32::new(finish(hasher))
}

/// Digest over a module's named outcome counts, in the order given.
pub fn outcome_summary_hash(module: ModuleId, counts: &[(&str, u64)]) -> Digest32 {
    let mut hasher = Blake2b256::new();
    hasher.update(SUMMARY_DOMAIN);
    update_field(&mut hasher, module.as_str().as_bytes());
    for (name, value) in counts {
        update_field(&mut hasher, name.as_bytes());
        hasher.update(value.to_le_bytes());
    }
    Digest32::new(finish(hasher))
}
