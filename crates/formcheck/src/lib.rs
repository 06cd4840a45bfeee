#![forbid(unsafe_code)]

//! formcheck public facade crate.
//!
//! Re-exports the rule engine from `formcheck-core` and the host-driven
//! runtime from `formcheck-runtime`, with one error type spanning both and a
//! small prelude.
//!
//! ```ignore
//! use formcheck::prelude::*;
//!
//! fn run<H: FormHost>(page: H) -> formcheck::Result<()> {
//!     let rules = std::sync::Arc::new(RuleSet::registration()?);
//!     let mut form = FormOrchestrator::new(rules, FormConfig::from_env(), page);
//!     form.attach()?;
//!     form.handle_event(FormEvent::Submit);
//!     Ok(())
//! }
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use formcheck_core::{
    Check, FieldLookup, FieldType, FieldValue, NoLookup, Pattern, RuleDescriptor, RuleError,
    RuleSet, RuleSetBuilder, StrengthCriteria, StrengthResult, StrengthTier, Verdict, evaluate,
    evaluate_group, score,
};

// --- Runtime re-exports ----------------------------------------------------

pub use formcheck_runtime::{
    Clock, ConfigError, Control, ControlId, ControlKind, FormConfig, FormEvent, FormHost,
    FormOrchestrator, FormReport, FormView, HostError, HostResult, ManualClock, Marker, Msg,
    RuntimeError, SessionSnapshot, Snapshot, SnapshotValue, SubmitPhase, SystemClock,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for formcheck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The rule table could not be built.
    Rules(RuleError),
    /// The orchestrator could not attach.
    Runtime(RuntimeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rules(err) => write!(f, "{err}"),
            Self::Runtime(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rules(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

impl From<RuleError> for Error {
    fn from(err: RuleError) -> Self {
        Self::Rules(err)
    }
}

impl From<RuntimeError> for Error {
    fn from(err: RuntimeError) -> Self {
        Self::Runtime(err)
    }
}

/// Standard result type for formcheck APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, FieldValue, FormConfig, FormEvent, FormHost, FormOrchestrator, Result,
        RuleDescriptor, RuleSet, StrengthTier, SubmitPhase, Verdict,
    };

    pub use crate::{core, runtime};
}

pub use formcheck_core as core;
pub use formcheck_runtime as runtime;
