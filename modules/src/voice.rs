//! Module B: three-phase voice challenge ("ah", silence, "oh").
//!
//! The microphone pushes audio features into a [`VoiceAccumulator`] which
//! classifies every sample as it arrives and keeps a ring buffer of results.
//! Once per tick the processor reads the dominant prediction over the newest
//! results and counts the tick toward the current phase if it matches.

use crate::atom::{build_atom, ModuleContext, RunOutcome};
use crate::cell::{Accumulator, StateCell};
use crate::config::VoiceConfig;
use crate::error::ModuleError;
use crate::sensor::{SensorGuard, SensorSource};
use crate::ticker::Ticker;
use livegate_classifier::{AudioSample, VoiceClassifier};
use livegate_types::{
    ClassifierResult, EvidenceAtom, Label, ModuleId, ModuleProgress, StatusMessage, VoiceLabel,
};
use livegate_utils::stats::{ratio, RollingWindow};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Score ceiling shared by the face and voice modules.
const MAX_SCORE: f64 = 98.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoicePhase {
    Ah,
    Silence,
    Oh,
}

impl VoicePhase {
    /// Phase active at `tick` when each phase lasts `phase_ticks`.
    pub fn for_tick(tick: u32, phase_ticks: u32) -> Self {
        match tick / phase_ticks.max(1) {
            0 => Self::Ah,
            1 => Self::Silence,
            _ => Self::Oh,
        }
    }

    pub fn target(&self) -> VoiceLabel {
        match self {
            Self::Ah => VoiceLabel::Ah,
            Self::Silence => VoiceLabel::Silence,
            Self::Oh => VoiceLabel::Oh,
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            Self::Ah => "Say \"ahhh\"",
            Self::Silence => "Stay quiet",
            Self::Oh => "Say \"ohhh\"",
        }
    }

    fn confirmation(&self) -> &'static str {
        match self {
            Self::Ah => "Good, keep going",
            Self::Silence => "Nice and quiet",
            Self::Oh => "Good, almost done",
        }
    }
}

impl fmt::Display for VoicePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ah => "ah",
            Self::Silence => "silence",
            Self::Oh => "oh",
        })
    }
}

/// Majority label over a set of results.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DominantPrediction<L> {
    pub label: L,
    /// Mean confidence of the results carrying `label`.
    pub confidence: f64,
    /// How many results carried `label`.
    pub count: usize,
}

/// The most frequent label, ties broken by enumeration order. `None` when empty.
pub fn dominant_prediction<'a, L, I>(results: I) -> Option<DominantPrediction<L>>
where
    L: Label,
    I: IntoIterator<Item = &'a ClassifierResult<L>>,
{
    let mut tally: BTreeMap<L, (usize, f64)> = BTreeMap::new();
    for r in results {
        let entry = tally.entry(r.label).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += r.confidence;
    }

    let mut best: Option<(L, usize, f64)> = None;
    for label in L::ALL {
        if let Some(&(count, sum)) = tally.get(label) {
            if best.map_or(true, |(_, c, _)| count > c) {
                best = Some((*label, count, sum));
            }
        }
    }
    best.map(|(label, count, sum)| DominantPrediction {
        label,
        confidence: sum / count as f64,
        count,
    })
}

/// Classifies audio at sensor rate and buffers the results.
pub struct VoiceAccumulator {
    classifier: VoiceClassifier,
    results: RollingWindow<ClassifierResult<VoiceLabel>>,
    dominant_window: usize,
    received: u64,
}

impl VoiceAccumulator {
    pub fn new(classifier: VoiceClassifier, config: &VoiceConfig) -> Self {
        Self {
            classifier,
            results: RollingWindow::new(config.buffer_capacity),
            dominant_window: config.dominant_window,
            received: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct VoiceSnapshot {
    pub dominant: Option<DominantPrediction<VoiceLabel>>,
    /// Whether the newest result came from a fallback classifier.
    pub latest_fallback: bool,
    pub received: u64,
    pub buffered: usize,
}

impl Accumulator for VoiceAccumulator {
    type Input = AudioSample;
    type Snapshot = VoiceSnapshot;

    fn apply(&mut self, sample: AudioSample) {
        let result = self.classifier.infer(&sample);
        self.results.push(result);
        self.received += 1;
    }

    fn snapshot(&self) -> VoiceSnapshot {
        VoiceSnapshot {
            dominant: dominant_prediction(self.results.latest(self.dominant_window)),
            latest_fallback: self.results.iter().next_back().map_or(false, |r| r.fallback),
            received: self.received,
            buffered: self.results.len(),
        }
    }
}

/// Per-phase tick counts for one run.
#[derive(Clone, Debug)]
pub struct VoiceTally {
    config: VoiceConfig,
    ah_matches: u32,
    silence_matches: u32,
    oh_matches: u32,
}

impl VoiceTally {
    pub fn new(config: &VoiceConfig) -> Self {
        Self {
            config: config.clone(),
            ah_matches: 0,
            silence_matches: 0,
            oh_matches: 0,
        }
    }

    /// Whether a tick in `phase` with this dominant label counts toward it.
    pub fn matches(&self, phase: VoicePhase, dominant: Option<VoiceLabel>, fallback: bool) -> bool {
        let Some(label) = dominant else {
            return false;
        };
        if label == phase.target() {
            return true;
        }
        // A fallback classifier confuses the two vowels; accept either while it decides.
        phase == VoicePhase::Oh && self.config.lenient_voiced_fallback && fallback && label.is_voiced()
    }

    /// Count one tick. Returns whether it matched.
    pub fn record(&mut self, phase: VoicePhase, dominant: Option<VoiceLabel>, fallback: bool) -> bool {
        let matched = self.matches(phase, dominant, fallback);
        if matched {
            *self.counter(phase) += 1;
        }
        matched
    }

    fn counter(&mut self, phase: VoicePhase) -> &mut u32 {
        match phase {
            VoicePhase::Ah => &mut self.ah_matches,
            VoicePhase::Silence => &mut self.silence_matches,
            VoicePhase::Oh => &mut self.oh_matches,
        }
    }

    pub fn matches_in(&self, phase: VoicePhase) -> u32 {
        match phase {
            VoicePhase::Ah => self.ah_matches,
            VoicePhase::Silence => self.silence_matches,
            VoicePhase::Oh => self.oh_matches,
        }
    }

    pub fn silence_ratio(&self) -> f64 {
        ratio(self.silence_matches as usize, self.config.phase_ticks as usize)
    }

    /// Check the phases in order and score the run.
    pub fn evaluate(&self) -> Result<f64, ModuleError> {
        if self.ah_matches < self.config.min_phase_matches {
            return Err(ModuleError::AudioNotDetected {
                phase: VoicePhase::Ah,
            });
        }
        if self.silence_ratio() < self.config.min_silence_ratio {
            return Err(ModuleError::AudioNotDetected {
                phase: VoicePhase::Silence,
            });
        }
        if self.oh_matches < self.config.min_phase_matches {
            return Err(ModuleError::AudioNotDetected {
                phase: VoicePhase::Oh,
            });
        }
        Ok(self.score())
    }

    pub fn score(&self) -> f64 {
        let voiced = ratio(
            (self.ah_matches + self.oh_matches) as usize,
            2 * self.config.phase_ticks as usize,
        );
        (60.0 + voiced * 25.0 + self.silence_ratio() * 15.0).min(MAX_SCORE)
    }
}

/// Module B processor.
pub struct VoiceChallengeProcessor {
    config: VoiceConfig,
    microphone: Arc<dyn SensorSource<AudioSample>>,
    classifier: VoiceClassifier,
}

impl VoiceChallengeProcessor {
    pub fn new(
        config: VoiceConfig,
        microphone: Arc<dyn SensorSource<AudioSample>>,
        classifier: VoiceClassifier,
    ) -> Self {
        Self {
            config,
            microphone,
            classifier,
        }
    }

    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    /// Run the three phases and seal the outcome.
    ///
    /// Dropping the returned future stops the microphone and discards the buffer.
    pub async fn run<F>(&self, ctx: &ModuleContext, mut on_progress: F) -> Result<EvidenceAtom, ModuleError>
    where
        F: FnMut(ModuleProgress),
    {
        let accumulator = VoiceAccumulator::new(self.classifier.clone(), &self.config);
        let cell = StateCell::spawn(accumulator, self.config.inbox_capacity);
        let guard = SensorGuard::start(self.microphone.clone(), cell.sink())?;

        let total = self.config.duration_ticks();
        let mut ticker = Ticker::new(ctx.tick_interval, total);
        let mut tally = VoiceTally::new(&self.config);
        let mut sampled_ticks = 0u32;
        let mut received = 0u64;

        while let Some(tick) = ticker.next().await {
            let snap = cell.snapshot().await.ok_or(ModuleError::AccumulatorStopped)?;
            received = snap.received;
            let phase = VoicePhase::for_tick(tick, self.config.phase_ticks);
            let dominant = snap.dominant.map(|d| d.label);
            if dominant.is_some() {
                sampled_ticks += 1;
            }
            let matched = tally.record(phase, dominant, snap.latest_fallback);
            tracing::debug!(
                tick,
                %phase,
                dominant = dominant.map_or("none", |l| l.as_str()),
                matched,
                "voice tick"
            );

            let status = if matched {
                StatusMessage::success(phase.confirmation())
            } else {
                StatusMessage::prompt(phase.instruction())
            };
            let indicators = BTreeMap::from([
                (
                    "dominant_confidence".to_string(),
                    snap.dominant.map_or(0.0, |d| d.confidence),
                ),
                ("phase_matches".to_string(), tally.matches_in(phase) as f64),
                ("dropped_samples".to_string(), cell.dropped() as f64),
            ]);
            on_progress(ModuleProgress {
                module: ModuleId::VoiceChallenge,
                tick,
                total_ticks: total,
                time_remaining_secs: ticker.remaining_secs(tick),
                status,
                indicators,
            });
        }
        drop(guard);

        let score = tally.evaluate()?;
        let outcome = RunOutcome {
            duration: ticker.elapsed(),
            sample_count: sampled_ticks,
            dropped_samples: cell.dropped(),
            ..RunOutcome::default()
        }
        .flag("ah_phase", true)
        .flag("silence_phase", true)
        .flag("oh_phase", true)
        .flag("model_backed", self.classifier.is_model_backed())
        .count("ah_matches", tally.matches_in(VoicePhase::Ah) as u64)
        .count("silence_matches", tally.matches_in(VoicePhase::Silence) as u64)
        .count("oh_matches", tally.matches_in(VoicePhase::Oh) as u64)
        .count("samples_received", received);
        tracing::info!(module = ModuleId::VoiceChallenge.as_str(), score, "module complete");
        Ok(build_atom(ctx, ModuleId::VoiceChallenge, score, outcome))
    }
}
