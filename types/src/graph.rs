//! Evidence graph types: edges between modules and the session trust summary.

use crate::module::ModuleId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal trust grade. `A` is best.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrustGrade {
    A,
    B,
    C,
    D,
}

impl TrustGrade {
    pub const ALL: [TrustGrade; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Position in the ordering, 0 for `A` through 3 for `D`.
    pub fn index(&self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }

    /// Grade at `index`, saturating at `D`.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(3)]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for TrustGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named pair of modules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    FaceVoice,
    FaceTouch,
    VoiceTouch,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 3] = [Self::FaceVoice, Self::FaceTouch, Self::VoiceTouch];

    pub fn modules(&self) -> (ModuleId, ModuleId) {
        match self {
            Self::FaceVoice => (ModuleId::FaceLiveness, ModuleId::VoiceChallenge),
            Self::FaceTouch => (ModuleId::FaceLiveness, ModuleId::TouchHaptic),
            Self::VoiceTouch => (ModuleId::VoiceChallenge, ModuleId::TouchHaptic),
        }
    }

    /// "A-B", "A-C" or "B-C".
    pub fn name(&self) -> String {
        let (x, y) = self.modules();
        format!("{}-{}", x.letter(), y.letter())
    }
}

/// Consistency score between two modules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub kind: EdgeKind,
    /// Score in [0, 100].
    pub score: f64,
    /// Whether `score` met the edge's threshold.
    pub passed: bool,
}

/// Per-module scores feeding the graph.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleScores {
    pub face: f64,
    pub voice: f64,
    pub touch: f64,
}

impl ModuleScores {
    pub fn mean(&self) -> f64 {
        (self.face + self.voice + self.touch) / 3.0
    }
}

/// Result of scoring the three evidence atoms of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvidenceGraphSummary {
    pub edges: [GraphEdge; 3],
    pub grade: TrustGrade,
    /// Trust score in [0, 100].
    pub trust_score: f64,
    pub module_scores: ModuleScores,
}

impl EvidenceGraphSummary {
    pub fn edge(&self, kind: EdgeKind) -> &GraphEdge {
        match kind {
            EdgeKind::FaceVoice => &self.edges[0],
            EdgeKind::FaceTouch => &self.edges[1],
            EdgeKind::VoiceTouch => &self.edges[2],
        }
    }

    /// Same summary with the grade replaced (used for skip demotion).
    pub fn with_grade(mut self, grade: TrustGrade) -> Self {
        self.grade = grade;
        self
    }
}
