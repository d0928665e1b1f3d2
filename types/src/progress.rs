//! Per-tick progress snapshots for the UI. Not part of the evidence chain.

use crate::module::ModuleId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    /// The user should act right now.
    Prompt,
    Warning,
    Success,
}

/// Guidance shown to the user for the current tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Info,
        }
    }

    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Prompt,
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Warning,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Success,
        }
    }
}

/// Transient state of the active module, emitted once per tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleProgress {
    pub module: ModuleId,
    /// Zero-based tick that produced this snapshot.
    pub tick: u32,
    pub total_ticks: u32,
    pub time_remaining_secs: u32,
    pub status: StatusMessage,
    /// Live quality indicators, e.g. `face_ratio` or `dominant_confidence`.
    pub indicators: BTreeMap<String, f64>,
}

impl ModuleProgress {
    pub fn indicator(&self, name: &str) -> Option<f64> {
        self.indicators.get(name).copied()
    }
}
