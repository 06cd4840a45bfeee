#![forbid(unsafe_code)]

//! Host-driven runtime for formcheck.
//!
//! The runtime connects the pure validators in `formcheck-core` to a page
//! through the [`FormHost`] capability trait. [`FormOrchestrator`] receives
//! typed events, renders feedback, debounces input validation, gates
//! submission, and autosaves the session against an injected [`Clock`].
//!
//! # Modules
//!
//! - [`host`]: the `FormHost` trait, controls, markers, and `FormView`.
//! - [`feedback`]: verdict rendering and the single degradation point.
//! - [`debounce`]: per-key trailing-edge scheduler.
//! - [`interval`]: fixed-rate recurring task.
//! - [`snapshot`]: in-memory capture and restore.
//! - [`orchestrator`]: event dispatch and the submission state machine.
//! - [`config`]: identifiers, timings, environment overrides.

pub mod clock;
pub mod config;
pub mod debounce;
pub mod error;
pub mod feedback;
pub mod host;
pub mod interval;
pub mod orchestrator;
pub mod snapshot;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, FormConfig, FormConfigParse};
pub use debounce::{DebounceScheduler, DebounceStats};
pub use error::RuntimeError;
pub use feedback::{FeedbackRenderer, FeedbackState, Target};
pub use host::{
    Control, ControlId, ControlKind, FormHost, FormView, HostError, HostResult, Marker,
};
pub use interval::RecurringTask;
pub use orchestrator::{
    FormEvent, FormOrchestrator, FormReport, Msg, OrchestratorStats, StepResult, SubmitPhase,
};
pub use snapshot::{SessionSnapshot, Snapshot, SnapshotValue};
