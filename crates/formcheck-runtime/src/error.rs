#![forbid(unsafe_code)]

use std::fmt;

/// Errors from orchestrator lifecycle calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The host has no form container with this id.
    FormMissing(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FormMissing(id) => write!(f, "form `{id}` not found on the page"),
        }
    }
}

impl std::error::Error for RuntimeError {}
