use proptest::prelude::*;

use livegate_types::{ClassifierResult, Digest32, Nonce, Timestamp, TrustGrade, VoiceLabel};
use std::collections::BTreeMap;

proptest! {
    /// Digest32 hex encoding is always 64 lowercase characters.
    #[test]
    fn digest_hex_length(bytes in prop::array::uniform32(0u8..)) {
        let hex = Digest32::new(bytes).to_hex();
        prop_assert_eq!(hex.len(), 64);
        prop_assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    /// Digest32 bincode serialization roundtrip.
    #[test]
    fn digest_bincode_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let d = Digest32::new(bytes);
        let encoded = bincode::serialize(&d).unwrap();
        let decoded: Digest32 = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, d);
    }

    /// A nonce is expired exactly when now >= issued + ttl.
    #[test]
    fn nonce_expiry_boundary(issued in 0u64..1_000_000, ttl in 0u64..10_000, now in 0u64..2_000_000) {
        let nonce = Nonce::new("n", Timestamp::new(issued), ttl);
        prop_assert_eq!(nonce.is_expired(Timestamp::new(now)), now >= issued + ttl);
    }

    /// Grade index mapping saturates at D.
    #[test]
    fn grade_from_index_saturates(i in 0usize..64) {
        let g = TrustGrade::from_index(i);
        prop_assert_eq!(g.index(), i.min(3));
    }

    /// Argmax confidence equals the largest probability.
    #[test]
    fn argmax_confidence_is_max(a in 0.01f64..1.0, o in 0.0f64..1.0, s in 0.0f64..1.0) {
        let probs = BTreeMap::from([
            (VoiceLabel::Ah, a),
            (VoiceLabel::Oh, o),
            (VoiceLabel::Silence, s),
        ]);
        let r = ClassifierResult::from_probabilities(probs, false);
        let max = a.max(o).max(s);
        prop_assert_eq!(r.confidence, max);
        prop_assert_eq!(r.probability(r.label), max);
    }
}
