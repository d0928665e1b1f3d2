//! Registration orchestration and evidence fusion.
//!
//! A registration runs face liveness (mandatory), then the voice and touch
//! challenges (each skippable), fuses the three module scores into an evidence
//! graph, demotes the trust grade for every skip, and submits a signed package
//! for credential issuance.
//!
//! - [`graph`]: pairwise edge scores, trust grade, trust score, skip demotion
//! - [`orchestrator`]: the session state machine and its [`RegistrationHandle`]
//! - [`client`]: the [`NetworkClient`] contract for nonce issuance and registration

pub mod client;
pub mod config;
pub mod error;
pub mod graph;
pub mod orchestrator;
pub mod package;
pub mod state;

pub use client::NetworkClient;
pub use config::{ClassifierConfig, ConfigError, RegistrationConfig};
pub use error::{FailureKind, FailureReason, RegistrationError};
pub use graph::{demote, edge_score, edge_threshold, grade_for, score_graph};
pub use orchestrator::{Classifiers, RegistrationHandle, RegistrationOrchestrator, Sensors};
pub use package::{session_id_for, sign_package, signing_bytes, verify_package};
pub use state::RegistrationState;
