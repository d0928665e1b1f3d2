//! Registration session state as published to observers.

use crate::error::FailureReason;
use livegate_types::{Credential, EvidenceGraphSummary, ModuleId, ModuleProgress};
use serde::{Deserialize, Serialize};

/// One state of a registration attempt.
///
/// Transitions are forward-only:
/// `Idle → RequestingNonce → ModuleA → ModuleB → ModuleC → ComputingGraph →
/// Submitting → Success | Failure`. Only a retry returns to `Idle`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum RegistrationState {
    Idle,
    RequestingNonce,
    /// Face liveness is running. `None` until the first tick.
    ModuleA(Option<ModuleProgress>),
    ModuleB(Option<ModuleProgress>),
    ModuleC(Option<ModuleProgress>),
    ComputingGraph,
    Submitting,
    Success {
        credential: Credential,
        summary: EvidenceGraphSummary,
    },
    Failure(FailureReason),
}

impl RegistrationState {
    /// The state for a running module.
    pub fn running(module: ModuleId, progress: Option<ModuleProgress>) -> Self {
        match module {
            ModuleId::FaceLiveness => Self::ModuleA(progress),
            ModuleId::VoiceChallenge => Self::ModuleB(progress),
            ModuleId::TouchHaptic => Self::ModuleC(progress),
        }
    }

    /// The module running in this state, if any.
    pub fn active_module(&self) -> Option<ModuleId> {
        match self {
            Self::ModuleA(_) => Some(ModuleId::FaceLiveness),
            Self::ModuleB(_) => Some(ModuleId::VoiceChallenge),
            Self::ModuleC(_) => Some(ModuleId::TouchHaptic),
            _ => None,
        }
    }

    pub fn progress(&self) -> Option<&ModuleProgress> {
        match self {
            Self::ModuleA(p) | Self::ModuleB(p) | Self::ModuleC(p) => p.as_ref(),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Failure(_))
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::RequestingNonce => "requesting_nonce",
            Self::ModuleA(_) => "module_a",
            Self::ModuleB(_) => "module_b",
            Self::ModuleC(_) => "module_c",
            Self::ComputingGraph => "computing_graph",
            Self::Submitting => "submitting",
            Self::Success { .. } => "success",
            Self::Failure(_) => "failure",
        }
    }
}
