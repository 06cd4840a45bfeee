#![forbid(unsafe_code)]

//! The host capability contract.
//!
//! A [`FormHost`] exposes the controls of one form by name and a feedback
//! slot addressable by id. It is the only way the runtime reaches the page:
//! the orchestrator reads controls through [`FormHost::controls`] and writes
//! every visible change through the setter methods.
//!
//! [`FormView`] is a snapshot of the controls taken at the start of an
//! operation; it answers value and membership questions without calling back
//! into the host.

use std::fmt;

use bitflags::bitflags;
use formcheck_core::{FieldLookup, FieldValue};

// ---------------------------------------------------------------------------
// Marker
// ---------------------------------------------------------------------------

bitflags! {
    /// Validation state markers on a field.
    ///
    /// Neither flag set is the neutral state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Marker: u8 {
        const ERROR = 0b01;
        const SUCCESS = 0b10;
    }
}

impl Marker {
    /// Class-style names of the set flags, `error` before `success`.
    #[must_use]
    pub fn class_names(self) -> Vec<&'static str> {
        let mut names = Vec::with_capacity(2);
        if self.contains(Self::ERROR) {
            names.push("error");
        }
        if self.contains(Self::SUCCESS) {
            names.push("success");
        }
        names
    }
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

/// The kind of an input control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Text,
    Email,
    Password,
    Number,
    Date,
    Select,
    Textarea,
    Checkbox,
    Radio,
}

impl ControlKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Number => "number",
            Self::Date => "date",
            Self::Select => "select",
            Self::Textarea => "textarea",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
        }
    }

    /// Returns `true` for controls whose state is a checked flag.
    #[must_use]
    pub const fn is_checkable(self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable handle for one control, unique within a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub usize);

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One input control as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub id: ControlId,
    pub name: String,
    pub kind: ControlKind,
    /// Raw value. For checkboxes and radios this is the option value.
    pub value: String,
    pub checked: bool,
}

impl Control {
    /// The value the validators see for this single control.
    ///
    /// Checkboxes map to their checked state. A radio maps to its option
    /// value when checked and to empty text otherwise.
    #[must_use]
    pub fn field_value(&self) -> FieldValue {
        match self.kind {
            ControlKind::Checkbox => FieldValue::Checked(self.checked),
            ControlKind::Radio if self.checked => FieldValue::text(self.value.as_str()),
            ControlKind::Radio => FieldValue::default(),
            _ => FieldValue::text(self.value.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A host operation addressed something the page does not have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// No control carries this field name.
    MissingField(String),
    /// No feedback or strength slot with this id.
    MissingSlot(String),
    /// No control with this id.
    MissingControl(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(name) => write!(f, "no field named `{name}`"),
            Self::MissingSlot(slot) => write!(f, "no slot `{slot}`"),
            Self::MissingControl(id) => write!(f, "no control `{id}`"),
        }
    }
}

impl std::error::Error for HostError {}

/// Result of a host operation.
pub type HostResult = Result<(), HostError>;

// ---------------------------------------------------------------------------
// FormHost
// ---------------------------------------------------------------------------

/// Capabilities a page must offer to be driven by the runtime.
pub trait FormHost {
    /// Whether a form container with this id exists.
    fn form_present(&self, form_id: &str) -> bool;

    /// Every input control of the form, in document order.
    fn controls(&self) -> Vec<Control>;

    /// Replace a control's value.
    fn set_value(&mut self, id: ControlId, value: &str) -> HostResult;

    /// Set a checkbox or radio's checked state.
    fn set_checked(&mut self, id: ControlId, checked: bool) -> HostResult;

    /// Replace the text of a slot.
    fn set_slot_text(&mut self, slot: &str, text: &str) -> HostResult;

    /// Show or hide a slot.
    fn set_slot_visible(&mut self, slot: &str, visible: bool) -> HostResult;

    /// Add (`on = true`) or remove markers on every control named `field`.
    fn set_marker(&mut self, field: &str, marker: Marker, on: bool) -> HostResult;

    /// Replace the class list and label of a strength slot.
    fn set_strength(&mut self, slot: &str, class: &str, label: &str) -> HostResult;

    /// Enable or disable the submit control and set its label.
    fn set_submit_control(&mut self, id: &str, enabled: bool, label: &str) -> HostResult;

    /// Perform the real submission.
    fn submit(&mut self);
}

impl<H: FormHost + ?Sized> FormHost for &mut H {
    fn form_present(&self, form_id: &str) -> bool {
        (**self).form_present(form_id)
    }
    fn controls(&self) -> Vec<Control> {
        (**self).controls()
    }
    fn set_value(&mut self, id: ControlId, value: &str) -> HostResult {
        (**self).set_value(id, value)
    }
    fn set_checked(&mut self, id: ControlId, checked: bool) -> HostResult {
        (**self).set_checked(id, checked)
    }
    fn set_slot_text(&mut self, slot: &str, text: &str) -> HostResult {
        (**self).set_slot_text(slot, text)
    }
    fn set_slot_visible(&mut self, slot: &str, visible: bool) -> HostResult {
        (**self).set_slot_visible(slot, visible)
    }
    fn set_marker(&mut self, field: &str, marker: Marker, on: bool) -> HostResult {
        (**self).set_marker(field, marker, on)
    }
    fn set_strength(&mut self, slot: &str, class: &str, label: &str) -> HostResult {
        (**self).set_strength(slot, class, label)
    }
    fn set_submit_control(&mut self, id: &str, enabled: bool, label: &str) -> HostResult {
        (**self).set_submit_control(id, enabled, label)
    }
    fn submit(&mut self) {
        (**self).submit();
    }
}

// ---------------------------------------------------------------------------
// FormView
// ---------------------------------------------------------------------------

/// A point-in-time copy of a host's controls.
#[derive(Debug, Clone, Default)]
pub struct FormView {
    controls: Vec<Control>,
}

impl FormView {
    /// Read the current controls of `host`.
    #[must_use]
    pub fn capture<H: FormHost + ?Sized>(host: &H) -> Self {
        Self {
            controls: host.controls(),
        }
    }

    #[must_use]
    pub fn from_controls(controls: Vec<Control>) -> Self {
        Self { controls }
    }

    #[must_use]
    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Controls named `name`, in document order.
    pub fn members<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Control> + 'a {
        self.controls.iter().filter(move |c| c.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.members(name).next().is_some()
    }

    /// The value of field `name`.
    ///
    /// For a radio group this is the checked option (empty when none is
    /// checked). Otherwise it is the first control with that name.
    #[must_use]
    pub fn field_value(&self, name: &str) -> Option<FieldValue> {
        let first = self.members(name).next()?;
        if first.kind == ControlKind::Radio {
            let chosen = self
                .members(name)
                .find(|c| c.checked)
                .map(|c| FieldValue::text(c.value.as_str()));
            return Some(chosen.unwrap_or_default());
        }
        Some(first.field_value())
    }

    /// Number of checked controls named `name`.
    #[must_use]
    pub fn checked_count(&self, name: &str) -> usize {
        self.members(name).filter(|c| c.checked).count()
    }

    /// Distinct field names in document order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for control in &self.controls {
            if !names.contains(&control.name.as_str()) {
                names.push(control.name.as_str());
            }
        }
        names
    }

    /// The name of the control with id `id`.
    #[must_use]
    pub fn name_of(&self, id: ControlId) -> Option<&str> {
        self.controls
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }
}

impl FieldLookup for FormView {
    fn current_value(&self, name: &str) -> Option<FieldValue> {
        self.field_value(name)
    }
}

// ---------------------------------------------------------------------------
// Test host
// ---------------------------------------------------------------------------
