//! Registration orchestrator: sequences the modules, races skips, scores the
//! evidence graph and submits the signed package.

use crate::client::NetworkClient;
use crate::config::RegistrationConfig;
use crate::error::RegistrationError;
use crate::graph::{demote, score_graph};
use crate::package::{session_id_for, sign_package};
use crate::state::RegistrationState;
use livegate_classifier::{
    AdaptiveClassifier, AudioSample, FaceClassifier, FaceHeuristic, FaceSample, InferenceRuntime,
    ModelClassifier, VoiceClassifier, VoiceHeuristic,
};
use livegate_crypto::KeyStore;
use livegate_modules::{
    skipped_atom, FaceLivenessProcessor, HapticDriver, ModuleContext, ModuleError, SensorSource,
    TapRegistrar, TouchHapticProcessor, VoiceChallengeProcessor,
};
use livegate_types::{
    Clock, Credential, EvidenceAtom, FaceLabel, ModuleId, ModuleProgress, ModuleScores,
    RegistrationPackage, TrustGrade, VoiceLabel,
};
use livegate_utils::StatsCounter;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

// ── Collaborators ──────────────────────────────────────────────────────

/// Device sensors driven by the modules.
#[derive(Clone)]
pub struct Sensors {
    pub camera: Arc<dyn SensorSource<FaceSample>>,
    pub microphone: Arc<dyn SensorSource<AudioSample>>,
    pub haptic: Arc<dyn HapticDriver>,
}

/// Per-modality classifiers.
#[derive(Clone)]
pub struct Classifiers {
    pub face: FaceClassifier,
    pub voice: VoiceClassifier,
}

impl Classifiers {
    /// Adaptive classifiers over the given runtimes, falling back to the heuristics.
    pub fn adaptive<F, V>(face_runtime: F, voice_runtime: V, min_confidence: f64) -> Self
    where
        F: InferenceRuntime + 'static,
        V: InferenceRuntime + 'static,
    {
        let face = AdaptiveClassifier::<FaceSample, FaceLabel>::with_min_confidence(
            Box::new(ModelClassifier::new(
                "face-liveness",
                face_runtime,
                vec![FaceLabel::Live, FaceLabel::Spoof],
            )),
            Box::new(FaceHeuristic::default()),
            min_confidence,
        );
        let voice = AdaptiveClassifier::<AudioSample, VoiceLabel>::with_min_confidence(
            Box::new(ModelClassifier::new(
                "vowel",
                voice_runtime,
                vec![VoiceLabel::Ah, VoiceLabel::Oh, VoiceLabel::Silence],
            )),
            Box::new(VoiceHeuristic::default()),
            min_confidence,
        );
        Self {
            face: Arc::new(face),
            voice: Arc::new(voice),
        }
    }
}

// ── Shared state ───────────────────────────────────────────────────────

/// Counter names kept by the orchestrator.
pub const STAT_ATTEMPTS: &str = "attempts";
pub const STAT_SKIPS: &str = "skips";
pub const STAT_SUBMISSIONS: &str = "submissions";
pub const STAT_SUCCESSES: &str = "successes";
pub const STAT_FAILURES: &str = "failures";
pub const STAT_RETRIES: &str = "retries";

/// State visible to both the orchestrator and its handles.
struct Shared {
    state: watch::Sender<RegistrationState>,
    skip_requested: [AtomicBool; 3],
    taps: TapRegistrar,
}

fn slot(module: ModuleId) -> usize {
    match module {
        ModuleId::FaceLiveness => 0,
        ModuleId::VoiceChallenge => 1,
        ModuleId::TouchHaptic => 2,
    }
}

impl Shared {
    fn publish(&self, next: RegistrationState) {
        let previous = self.state.send_replace(next);
        let current = self.state.borrow();
        if previous.name() != current.name() {
            tracing::info!(from = previous.name(), to = current.name(), "registration state");
        }
    }

    fn clear_skips(&self) {
        for flag in &self.skip_requested {
            flag.store(false, Ordering::SeqCst);
        }
    }

    fn skip_pending(&self, module: ModuleId) -> bool {
        self.skip_requested[slot(module)].load(Ordering::SeqCst)
    }

    /// Resolves once a skip of `module` has been requested, checking every `poll`.
    async fn wait_for_skip(&self, module: ModuleId, poll: Duration) {
        while !self.skip_pending(module) {
            tokio::time::sleep(poll).await;
        }
    }
}

/// Commands and observation for a running registration.
#[derive(Clone)]
pub struct RegistrationHandle {
    shared: Arc<Shared>,
}

impl RegistrationHandle {
    /// Request a skip of `module`. Accepted only while that skippable module runs.
    pub fn skip(&self, module: ModuleId) -> bool {
        if !module.is_skippable() || self.shared.state.borrow().active_module() != Some(module) {
            tracing::debug!(module = module.as_str(), "skip ignored");
            return false;
        }
        self.shared.skip_requested[slot(module)].store(true, Ordering::SeqCst);
        true
    }

    /// Forward a user tap to the touch module. Ignored outside module C.
    pub fn register_tap(&self) -> bool {
        matches!(*self.shared.state.borrow(), RegistrationState::ModuleC(_))
            && self.shared.taps.register_tap()
    }

    pub fn subscribe(&self) -> watch::Receiver<RegistrationState> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> RegistrationState {
        self.shared.state.borrow().clone()
    }
}

// ── Orchestrator ───────────────────────────────────────────────────────

/// How a skippable module ended.
enum Completion {
    Finished(EvidenceAtom),
    Skipped,
}

/// Drives one registration attempt at a time.
pub struct RegistrationOrchestrator<N> {
    config: RegistrationConfig,
    face: FaceLivenessProcessor,
    voice: VoiceChallengeProcessor,
    touch: TouchHapticProcessor,
    network: N,
    keys: Arc<dyn KeyStore>,
    clock: Arc<dyn Clock>,
    shared: Arc<Shared>,
    stats: StatsCounter,
    atoms: BTreeMap<ModuleId, EvidenceAtom>,
    skips: u32,
}

impl<N: NetworkClient> RegistrationOrchestrator<N> {
    pub fn new(
        config: RegistrationConfig,
        sensors: Sensors,
        classifiers: Classifiers,
        network: N,
        keys: Arc<dyn KeyStore>,
        clock: Arc<dyn Clock>,
    ) -> (Self, RegistrationHandle) {
        let (state, _) = watch::channel(RegistrationState::Idle);
        let shared = Arc::new(Shared {
            state,
            skip_requested: Default::default(),
            taps: TapRegistrar::new(),
        });
        let orchestrator = Self {
            face: FaceLivenessProcessor::new(config.face.clone(), sensors.camera, classifiers.face),
            voice: VoiceChallengeProcessor::new(
                config.voice.clone(),
                sensors.microphone,
                classifiers.voice,
            ),
            touch: TouchHapticProcessor::new(
                config.touch.clone(),
                sensors.haptic,
                shared.taps.clone(),
            ),
            config,
            network,
            keys,
            clock,
            shared: shared.clone(),
            stats: StatsCounter::new(&[
                STAT_ATTEMPTS,
                STAT_SKIPS,
                STAT_SUBMISSIONS,
                STAT_SUCCESSES,
                STAT_FAILURES,
                STAT_RETRIES,
            ]),
            atoms: BTreeMap::new(),
            skips: 0,
        };
        (orchestrator, RegistrationHandle { shared })
    }

    pub fn handle(&self) -> RegistrationHandle {
        RegistrationHandle {
            shared: self.shared.clone(),
        }
    }

    pub fn state(&self) -> RegistrationState {
        self.shared.state.borrow().clone()
    }

    pub fn stats(&self) -> &StatsCounter {
        &self.stats
    }

    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    /// Skips taken in the current attempt.
    pub fn skips(&self) -> u32 {
        self.skips
    }

    /// Run one attempt from `Idle` to `Success` or `Failure`.
    ///
    /// A finished attempt must be reset with [`retry`](Self::retry) first.
    pub async fn run(&mut self) -> Result<Credential, RegistrationError> {
        if !matches!(*self.shared.state.borrow(), RegistrationState::Idle) {
            return Err(RegistrationError::Other(
                "registration already started; retry() resets it".to_string(),
            ));
        }
        self.stats.increment(STAT_ATTEMPTS);
        let result = self.attempt().await;
        match &result {
            Ok(credential) => {
                self.stats.increment(STAT_SUCCESSES);
                tracing::info!(
                    credential = %credential.id,
                    grade = %credential.grade,
                    trust_score = credential.trust_score,
                    "registration succeeded"
                );
            }
            Err(e) => {
                self.stats.increment(STAT_FAILURES);
                tracing::warn!(error = %e, retryable = e.is_retryable(), "registration failed");
                self.shared.publish(RegistrationState::Failure(e.to_failure()));
            }
        }
        result
    }

    /// Discard every in-flight result and return to `Idle`.
    pub fn retry(&mut self) {
        self.atoms.clear();
        self.skips = 0;
        self.shared.clear_skips();
        self.stats.increment(STAT_RETRIES);
        self.shared.publish(RegistrationState::Idle);
    }

    async fn attempt(&mut self) -> Result<Credential, RegistrationError> {
        self.shared.publish(RegistrationState::RequestingNonce);
        let nonce = self.network.request_nonce().await?;
        let ctx = ModuleContext::new(
            session_id_for(&nonce),
            nonce.value(),
            self.config.tick_interval(),
        );
        tracing::debug!(session = %ctx.session_id, "nonce issued");

        let face = self.run_mandatory(ModuleId::FaceLiveness, &ctx).await?;
        self.atoms.insert(ModuleId::FaceLiveness, face);
        for module in [ModuleId::VoiceChallenge, ModuleId::TouchHaptic] {
            let atom = match self.run_skippable(module, &ctx).await? {
                Completion::Finished(atom) => atom,
                Completion::Skipped => {
                    self.skips += 1;
                    self.stats.increment(STAT_SKIPS);
                    tracing::info!(module = module.as_str(), skips = self.skips, "module skipped");
                    skipped_atom(&ctx.session_id, &ctx.nonce, module)
                }
            };
            self.atoms.insert(module, atom);
        }

        self.shared.publish(RegistrationState::ComputingGraph);
        let [face, voice, touch] = ModuleId::ALL.map(|m| self.atoms.get(&m).cloned());
        let face = face.ok_or(RegistrationError::MissingModuleResults(ModuleId::FaceLiveness))?;
        let voice = voice.ok_or(RegistrationError::MissingModuleResults(ModuleId::VoiceChallenge))?;
        let touch = touch.ok_or(RegistrationError::MissingModuleResults(ModuleId::TouchHaptic))?;

        let raw = score_graph(ModuleScores {
            face: face.score(),
            voice: voice.score(),
            touch: touch.score(),
        });
        for edge in &raw.edges {
            tracing::debug!(edge = %edge.kind.name(), score = edge.score, passed = edge.passed, "consistency edge");
        }
        let grade = demote(raw.grade, self.skips);
        if grade != raw.grade {
            tracing::debug!(raw = %raw.grade, demoted = %grade, skips = self.skips, "grade demoted");
        }
        let summary = raw.with_grade(grade);
        if grade == TrustGrade::D {
            return Err(RegistrationError::TrustGradeTooLow { grade });
        }

        self.shared.publish(RegistrationState::Submitting);
        let now = self.clock.now();
        if nonce.is_expired(now) {
            tracing::warn!(
                age_secs = nonce.issued_at().elapsed_since(now),
                ttl_secs = nonce.ttl_secs(),
                "nonce expired before submission"
            );
            return Err(RegistrationError::NonceExpired);
        }
        let mut package = RegistrationPackage {
            session_id: ctx.session_id.clone(),
            nonce: ctx.nonce.clone(),
            face,
            voice,
            touch,
            summary: summary.clone(),
            signature: None,
        };
        sign_package(&mut package, self.keys.as_ref(), &self.config.key_id)?;
        let expiration = now.plus_days(self.config.credential_validity_days);
        self.stats.increment(STAT_SUBMISSIONS);
        let credential = self.network.register(&package, expiration).await?;

        self.shared.publish(RegistrationState::Success {
            credential: credential.clone(),
            summary,
        });
        Ok(credential)
    }

    async fn run_module(&self, module: ModuleId, ctx: &ModuleContext) -> Result<EvidenceAtom, ModuleError> {
        let shared = self.shared.clone();
        let on_progress = move |p: ModuleProgress| {
            shared.publish(RegistrationState::running(module, Some(p)));
        };
        match module {
            ModuleId::FaceLiveness => self.face.run(ctx, on_progress).await,
            ModuleId::VoiceChallenge => self.voice.run(ctx, on_progress).await,
            ModuleId::TouchHaptic => self.touch.run(ctx, on_progress).await,
        }
    }

    async fn run_mandatory(&self, module: ModuleId, ctx: &ModuleContext) -> Result<EvidenceAtom, RegistrationError> {
        self.shared.publish(RegistrationState::running(module, None));
        self.run_module(module, ctx)
            .await
            .map_err(|e| RegistrationError::from_module(module, e))
    }

    /// Run `module` against the skip poller. Whichever finishes first wins and the other is dropped.
    async fn run_skippable(&self, module: ModuleId, ctx: &ModuleContext) -> Result<Completion, RegistrationError> {
        self.shared.skip_requested[slot(module)].store(false, Ordering::SeqCst);
        self.shared.publish(RegistrationState::running(module, None));
        let poll = self.config.skip_poll_interval();
        tokio::select! {
            result = self.run_module(module, ctx) => result
                .map(Completion::Finished)
                .map_err(|e| RegistrationError::from_module(module, e)),
            () = self.shared.wait_for_skip(module, poll) => Ok(Completion::Skipped),
        }
    }
}
