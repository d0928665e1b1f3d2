//! Identifiers for the three challenge modules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three challenge modules, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModuleId {
    /// Module A: face liveness. Mandatory.
    FaceLiveness,
    /// Module B: spoken vowel challenge.
    VoiceChallenge,
    /// Module C: haptic pulse / tap response.
    TouchHaptic,
}

impl ModuleId {
    pub const ALL: [ModuleId; 3] = [
        ModuleId::FaceLiveness,
        ModuleId::VoiceChallenge,
        ModuleId::TouchHaptic,
    ];

    /// Whether the user may bypass this module (at a trust penalty).
    pub fn is_skippable(&self) -> bool {
        !matches!(self, Self::FaceLiveness)
    }

    /// Stable identifier, used in commitments and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FaceLiveness => "face_liveness",
            Self::VoiceChallenge => "voice_challenge",
            Self::TouchHaptic => "touch_haptic",
        }
    }

    /// Single-letter name used for graph edges ("A", "B", "C").
    pub fn letter(&self) -> &'static str {
        match self {
            Self::FaceLiveness => "A",
            Self::VoiceChallenge => "B",
            Self::TouchHaptic => "C",
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
