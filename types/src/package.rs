//! The registration package submitted for credential issuance, and the credential returned.

use crate::evidence::EvidenceAtom;
use crate::graph::{EvidenceGraphSummary, TrustGrade};
use crate::keys::Signature;
use crate::module::ModuleId;
use crate::session::SessionId;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Everything the backend needs to issue a credential.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistrationPackage {
    pub session_id: SessionId,
    pub nonce: String,
    pub face: EvidenceAtom,
    pub voice: EvidenceAtom,
    pub touch: EvidenceAtom,
    /// Graph summary after skip demotion.
    pub summary: EvidenceGraphSummary,
    /// Filled by the key store before submission.
    pub signature: Option<Signature>,
}

impl RegistrationPackage {
    pub fn atom(&self, module: ModuleId) -> &EvidenceAtom {
        match module {
            ModuleId::FaceLiveness => &self.face,
            ModuleId::VoiceChallenge => &self.voice,
            ModuleId::TouchHaptic => &self.touch,
        }
    }

    /// Copy of the package with the signature cleared, i.e. the signed payload.
    pub fn unsigned(&self) -> Self {
        Self {
            signature: None,
            ..self.clone()
        }
    }
}

/// Credential issued by the backend after a successful registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    pub session_id: SessionId,
    pub grade: TrustGrade,
    pub trust_score: f64,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}
