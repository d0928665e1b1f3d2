//! Evidence atom construction shared by the three processors.

use livegate_crypto::{evidence_commitment, outcome_summary_hash};
use livegate_types::{EvidenceAtom, ModuleId, SessionId, TimelineMetadata, SKIPPED_FLAG};
use std::collections::BTreeMap;
use std::time::Duration;

/// Session binding and pacing for one module run.
#[derive(Clone, Debug)]
pub struct ModuleContext {
    pub session_id: SessionId,
    pub nonce: String,
    pub tick_interval: Duration,
}

impl ModuleContext {
    pub fn new(session_id: SessionId, nonce: impl Into<String>, tick_interval: Duration) -> Self {
        Self {
            session_id,
            nonce: nonce.into(),
            tick_interval,
        }
    }
}

/// What a finished run observed, folded into the atom's timeline.
#[derive(Clone, Debug, Default)]
pub struct RunOutcome {
    pub duration: Duration,
    pub sample_count: u32,
    pub flags: BTreeMap<String, bool>,
    /// Counts hashed into the timeline summary hash.
    pub counts: Vec<(&'static str, u64)>,
    pub dropped_samples: u64,
}

impl RunOutcome {
    pub fn flag(mut self, name: &str, value: bool) -> Self {
        self.flags.insert(name.to_string(), value);
        self
    }

    pub fn count(mut self, name: &'static str, value: u64) -> Self {
        self.counts.push((name, value));
        self
    }
}

/// Seal a run into an atom committed to the session and nonce.
pub fn build_atom(ctx: &ModuleContext, module: ModuleId, score: f64, outcome: RunOutcome) -> EvidenceAtom {
    let commitment = evidence_commitment(&ctx.session_id, &ctx.nonce, module);
    let summary = outcome_summary_hash(module, &outcome.counts);
    let timeline = TimelineMetadata {
        duration_ms: outcome.duration.as_millis() as u64,
        sample_count: outcome.sample_count,
        flags: outcome.flags,
        summary_hash: summary.to_hex(),
        dropped_samples: outcome.dropped_samples,
    };
    EvidenceAtom::new(module, commitment, score, timeline)
}

/// Zero-score placeholder for a module the user skipped.
pub fn skipped_atom(session_id: &SessionId, nonce: &str, module: ModuleId) -> EvidenceAtom {
    let ctx = ModuleContext::new(session_id.clone(), nonce, Duration::ZERO);
    build_atom(
        &ctx,
        module,
        0.0,
        RunOutcome::default().flag(SKIPPED_FLAG, true),
    )
}
