#![forbid(unsafe_code)]

//! Verdict → visible feedback.
//!
//! The renderer turns a [`Verdict`] into one of three states on the host:
//!
//! | State | Field markers | Slot |
//! |---|---|---|
//! | error | `+error -success` | message written, shown |
//! | success | `-error +success` | hidden, text kept |
//! | cleared | `-error` | hidden |
//!
//! Group targets (checkbox groups) only touch their slot. Every host write
//! goes through [`absorb`], so the policy for missing fields and slots lives
//! in one place.

use formcheck_core::Verdict;

use crate::host::{FormHost, HostResult, Marker};

/// What a feedback operation is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// A single field, addressed by name.
    Field(&'a str),
    /// A checkbox group, addressed by its shared name.
    Group(&'a str),
}

impl<'a> Target<'a> {
    #[must_use]
    pub fn name(&self) -> &'a str {
        match *self {
            Self::Field(name) | Self::Group(name) => name,
        }
    }
}

/// The visible state a renderer call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackState {
    Error,
    Success,
    Cleared,
}

/// Swallow the outcome of a host write.
///
/// Missing fields, slots, and controls are part of normal operation (a page
/// may omit any feedback slot), so they are dropped without logging.
#[inline]
pub fn absorb(result: HostResult) {
    let _ = result;
}

/// Writes verdicts to a host.
#[derive(Debug, Clone)]
pub struct FeedbackRenderer {
    slot_prefix: String,
}

impl Default for FeedbackRenderer {
    fn default() -> Self {
        Self::new("error-")
    }
}

impl FeedbackRenderer {
    /// A renderer whose slots are named `<prefix><field>`.
    #[must_use]
    pub fn new(slot_prefix: impl Into<String>) -> Self {
        Self {
            slot_prefix: slot_prefix.into(),
        }
    }

    /// The slot id for `name`.
    #[must_use]
    pub fn slot_for(&self, name: &str) -> String {
        format!("{}{name}", self.slot_prefix)
    }

    /// Render `verdict` as the error or success state.
    pub fn render<H: FormHost + ?Sized>(
        &self,
        host: &mut H,
        target: Target<'_>,
        verdict: &Verdict,
    ) -> FeedbackState {
        if verdict.valid {
            self.show_success(host, target);
            FeedbackState::Success
        } else {
            self.show_error(host, target, &verdict.message);
            FeedbackState::Error
        }
    }

    pub fn show_error<H: FormHost + ?Sized>(&self, host: &mut H, target: Target<'_>, message: &str) {
        let slot = self.slot_for(target.name());
        absorb(host.set_slot_text(&slot, message));
        absorb(host.set_slot_visible(&slot, true));
        if let Target::Field(name) = target {
            absorb(host.set_marker(name, Marker::ERROR, true));
            absorb(host.set_marker(name, Marker::SUCCESS, false));
        }
    }

    pub fn show_success<H: FormHost + ?Sized>(&self, host: &mut H, target: Target<'_>) {
        let slot = self.slot_for(target.name());
        absorb(host.set_slot_visible(&slot, false));
        if let Target::Field(name) = target {
            absorb(host.set_marker(name, Marker::ERROR, false));
            absorb(host.set_marker(name, Marker::SUCCESS, true));
        }
    }

    /// The focus state: error removed, slot hidden, success untouched.
    pub fn clear<H: FormHost + ?Sized>(&self, host: &mut H, target: Target<'_>) -> FeedbackState {
        let slot = self.slot_for(target.name());
        absorb(host.set_slot_visible(&slot, false));
        if let Target::Field(name) = target {
            absorb(host.set_marker(name, Marker::ERROR, false));
        }
        FeedbackState::Cleared
    }
}
