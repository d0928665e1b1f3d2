//! Evidence atoms: the per-module outcome record.

use crate::hash::Digest32;
use crate::module::ModuleId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flag set on an atom substituted for a skipped module.
pub const SKIPPED_FLAG: &str = "skipped";

/// Timing and sub-check record for one module run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineMetadata {
    /// Wall time the module ran for.
    pub duration_ms: u64,
    /// Number of ticks that produced a sample.
    pub sample_count: u32,
    /// Which sub-checks passed, by name.
    pub flags: BTreeMap<String, bool>,
    /// Hex Blake2b digest over the module's outcome counts.
    pub summary_hash: String,
    /// Sensor samples dropped because the accumulator inbox was full.
    #[serde(default)]
    pub dropped_samples: u64,
}

/// One module's outcome, bound to the session it ran in.
///
/// Created once at module completion and immutable thereafter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvidenceAtom {
    module: ModuleId,
    commitment: Digest32,
    score: f64,
    timeline: TimelineMetadata,
}

impl EvidenceAtom {
    /// Build an atom. The score is clamped to [0, 100].
    pub fn new(
        module: ModuleId,
        commitment: Digest32,
        score: f64,
        timeline: TimelineMetadata,
    ) -> Self {
        Self {
            module,
            commitment,
            score: score.clamp(0.0, 100.0),
            timeline,
        }
    }

    pub fn module(&self) -> ModuleId {
        self.module
    }

    /// One-way hash of (session id, nonce, module id). Does not cover the score.
    pub fn commitment(&self) -> &Digest32 {
        &self.commitment
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn timeline(&self) -> &TimelineMetadata {
        &self.timeline
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.timeline.flags.get(name).copied()
    }

    pub fn is_skipped(&self) -> bool {
        self.flag(SKIPPED_FLAG).unwrap_or(false)
    }
}
