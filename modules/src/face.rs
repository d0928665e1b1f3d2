//! Module A: face liveness.

use crate::atom::{build_atom, ModuleContext, RunOutcome};
use crate::cell::{Latest, StateCell};
use crate::config::FaceConfig;
use crate::error::ModuleError;
use crate::sensor::{SensorGuard, SensorSource};
use crate::ticker::Ticker;
use livegate_classifier::{FaceClassifier, FaceSample};
use livegate_types::{
    ClassifierResult, EvidenceAtom, FaceLabel, Label, ModuleId, ModuleProgress, StatusMessage,
};
use livegate_utils::stats::{ratio, RollingWindow, RunningMean};
use std::collections::BTreeMap;
use std::sync::Arc;

const MAX_SCORE: f64 = 98.0;

/// The camera runs far faster than the tick; only the newest frame matters.
const CAMERA_INBOX: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FrameCheck {
    face: bool,
    gaze: bool,
}

/// Counts and running liveness over one run.
#[derive(Clone, Debug)]
pub struct FaceTally {
    config: FaceConfig,
    recent: RollingWindow<FrameCheck>,
    ticks: u32,
    face_ticks: u32,
    liveness: RunningMean,
}

impl FaceTally {
    pub fn new(config: &FaceConfig) -> Self {
        Self {
            config: config.clone(),
            recent: RollingWindow::new(config.window),
            ticks: 0,
            face_ticks: 0,
            liveness: RunningMean::new(),
        }
    }

    /// Fold one sampled frame. An undecided classifier (`None`) counts as zero liveness.
    pub fn record(&mut self, face_detected: bool, gaze_centered: bool, live_probability: Option<f64>) {
        self.record_tick(face_detected, gaze_centered);
        self.liveness.push(live_probability.unwrap_or(0.0));
    }

    /// Fold a tick on which no frame had arrived yet. Counts against the face ratio only.
    pub fn record_missing_frame(&mut self) {
        self.record_tick(false, false);
    }

    fn record_tick(&mut self, face_detected: bool, gaze_centered: bool) {
        self.ticks += 1;
        if face_detected {
            self.face_ticks += 1;
        }
        self.recent.push(FrameCheck {
            face: face_detected,
            gaze: face_detected && gaze_centered,
        });
    }

    /// Share of all ticks with a face in frame.
    pub fn face_ratio(&self) -> f64 {
        ratio(self.face_ticks as usize, self.ticks as usize)
    }

    /// Mean liveness over every sampled frame.
    pub fn liveness_mean(&self) -> f64 {
        self.liveness.mean()
    }

    /// Share of recent ticks with a centered gaze.
    pub fn gaze_ratio(&self) -> f64 {
        ratio(self.recent.count_where(|c| c.gaze), self.recent.len())
    }

    /// Share of recent ticks with a face in frame.
    pub fn recent_face_ratio(&self) -> f64 {
        ratio(self.recent.count_where(|c| c.face), self.recent.len())
    }

    /// Check face, then liveness, then gaze, and score the run.
    pub fn evaluate(&self) -> Result<f64, ModuleError> {
        let face_ratio = self.face_ratio();
        if face_ratio < self.config.min_face_ratio {
            return Err(ModuleError::FaceNotDetected { ratio: face_ratio });
        }
        let mean = self.liveness_mean();
        if mean < self.config.min_liveness_mean {
            return Err(ModuleError::LivenessNotDetected { mean });
        }
        let gaze = self.gaze_ratio();
        if gaze < self.config.min_gaze_ratio {
            return Err(ModuleError::GazeNotDetected { ratio: gaze });
        }
        Ok(self.score())
    }

    pub fn score(&self) -> f64 {
        (40.0 + self.liveness_mean() * 40.0 + self.gaze_ratio() * 20.0).min(MAX_SCORE)
    }
}

/// What to tell the user about the current frame. Face beats liveness beats gaze.
fn guidance(sample: Option<&FaceSample>, result: &ClassifierResult<FaceLabel>) -> StatusMessage {
    match sample {
        Some(s) if s.face_detected => {
            if result.label != FaceLabel::Live {
                StatusMessage::warning("Remove filters and make sure you're in good light")
            } else if !s.is_gaze_centered() {
                StatusMessage::prompt("Look directly at the camera")
            } else {
                StatusMessage::info("Checking...")
            }
        }
        _ => StatusMessage::warning("Position your face inside the frame"),
    }
}

/// Module A processor.
pub struct FaceLivenessProcessor {
    config: FaceConfig,
    camera: Arc<dyn SensorSource<FaceSample>>,
    classifier: FaceClassifier,
}

impl FaceLivenessProcessor {
    pub fn new(
        config: FaceConfig,
        camera: Arc<dyn SensorSource<FaceSample>>,
        classifier: FaceClassifier,
    ) -> Self {
        Self {
            config,
            camera,
            classifier,
        }
    }

    pub fn config(&self) -> &FaceConfig {
        &self.config
    }

    /// Sample the camera once per tick for the configured duration and seal the outcome.
    pub async fn run<F>(&self, ctx: &ModuleContext, mut on_progress: F) -> Result<EvidenceAtom, ModuleError>
    where
        F: FnMut(ModuleProgress),
    {
        let cell = StateCell::spawn(Latest::<FaceSample>::default(), CAMERA_INBOX);
        let guard = SensorGuard::start(self.camera.clone(), cell.sink())?;

        let total = self.config.duration_ticks;
        let mut ticker = Ticker::new(ctx.tick_interval, total);
        let mut tally = FaceTally::new(&self.config);
        let mut sampled_ticks = 0u32;
        let mut fallback_ticks = 0u64;

        while let Some(tick) = ticker.next().await {
            let snap = cell.snapshot().await.ok_or(ModuleError::AccumulatorStopped)?;
            let sample = snap.value.as_ref();
            let result = match sample {
                Some(s) => {
                    sampled_ticks += 1;
                    self.classifier.infer(s)
                }
                None => ClassifierResult::unknown_fallback(),
            };
            if sample.is_some() && result.fallback {
                fallback_ticks += 1;
            }

            let face_detected = sample.map_or(false, |s| s.face_detected);
            let gaze_centered = sample.map_or(false, |s| s.is_gaze_centered());
            match sample {
                Some(_) => {
                    let live = (!result.label.is_unknown()).then(|| result.probability(FaceLabel::Live));
                    tally.record(face_detected, gaze_centered, live);
                }
                None => tally.record_missing_frame(),
            }
            tracing::debug!(
                tick,
                face_detected,
                gaze_centered,
                label = result.label.as_str(),
                fallback = result.fallback,
                "face tick"
            );

            let indicators = BTreeMap::from([
                ("face_ratio".to_string(), tally.recent_face_ratio()),
                ("liveness_mean".to_string(), tally.liveness_mean()),
                ("gaze_ratio".to_string(), tally.gaze_ratio()),
                ("dropped_samples".to_string(), cell.dropped() as f64),
            ]);
            on_progress(ModuleProgress {
                module: ModuleId::FaceLiveness,
                tick,
                total_ticks: total,
                time_remaining_secs: ticker.remaining_secs(tick),
                status: guidance(sample, &result),
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
        .flag("face_detected", true)
        .flag("liveness", true)
        .flag("gaze_centered", true)
        .flag("model_backed", self.classifier.is_model_backed())
        .flag("used_fallback", fallback_ticks > 0)
        .count("ticks", tally.ticks as u64)
        .count("face_ticks", tally.face_ticks as u64)
        .count("fallback_ticks", fallback_ticks);
        tracing::info!(module = ModuleId::FaceLiveness.as_str(), score, "module complete");
        Ok(build_atom(ctx, ModuleId::FaceLiveness, score, outcome))
    }
}
