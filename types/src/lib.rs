//! Fundamental types for the LiveGate registration pipeline.
//!
//! This crate defines the data shared across every other crate in the workspace:
//! session identifiers and nonces, classifier labels and results, evidence atoms,
//! the evidence graph summary, registration packages, per-tick module progress,
//! and the error types reported by external collaborators.

pub mod error;
pub mod evidence;
pub mod graph;
pub mod hash;
pub mod keys;
pub mod label;
pub mod module;
pub mod package;
pub mod progress;
pub mod session;
pub mod time;

pub use error::{KeyStoreError, NetworkError, SensorError};
pub use evidence::{EvidenceAtom, TimelineMetadata, SKIPPED_FLAG};
pub use graph::{EdgeKind, EvidenceGraphSummary, GraphEdge, ModuleScores, TrustGrade};
pub use hash::Digest32;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use label::{ClassifierResult, FaceLabel, Label, VoiceLabel};
pub use module::ModuleId;
pub use package::{Credential, RegistrationPackage};
pub use progress::{ModuleProgress, Severity, StatusMessage};
pub use session::{Nonce, SessionId};
pub use time::{Clock, SystemClock, Timestamp};
