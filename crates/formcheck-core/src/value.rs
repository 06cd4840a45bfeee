#![forbid(unsafe_code)]

//! Field values as the validators see them, and the lookup seam used by
//! relational rules.

use std::collections::{BTreeMap, HashMap};

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// The current value of a single named field.
///
/// Text-like controls (text, email, password, number, date, select, textarea,
/// and the checked option of a radio group) carry their raw string. Checkboxes
/// carry their checked state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Raw, untrimmed text.
    Text(String),
    /// Checkbox state.
    Checked(bool),
}

impl FieldValue {
    /// Create a text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// The trimmed text, or `None` for checkbox values.
    #[must_use]
    pub fn trimmed(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.trim()),
            Self::Checked(_) => None,
        }
    }

    /// Returns `true` when the trimmed text is empty.
    ///
    /// A checkbox is never empty: its requiredness is decided by its checked
    /// state, not by presence of a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trimmed().is_some_and(str::is_empty)
    }

    /// Returns `true` for a checked checkbox.
    #[must_use]
    pub fn is_checked(&self) -> bool {
        matches!(self, Self::Checked(true))
    }

    /// Compare two values the way the relational rule does: text exactly as
    /// entered, checkboxes by state, and mixed kinds never match.
    ///
    /// Whitespace is significant here. `" secret"` and `"secret"` differ.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Checked(a), Self::Checked(b)) => a == b,
            _ => false,
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Checked(value)
    }
}

// ---------------------------------------------------------------------------
// FieldLookup
// ---------------------------------------------------------------------------

/// Resolves another field's current value by name.
///
/// Used by relational rules (`match_field`). Returning `None` means the
/// field does not exist, and the relational check passes.
pub trait FieldLookup {
    /// The current value of `name`, if such a field exists.
    fn current_value(&self, name: &str) -> Option<FieldValue>;
}

impl<T: FieldLookup + ?Sized> FieldLookup for &T {
    fn current_value(&self, name: &str) -> Option<FieldValue> {
        (**self).current_value(name)
    }
}

impl FieldLookup for HashMap<String, FieldValue> {
    fn current_value(&self, name: &str) -> Option<FieldValue> {
        self.get(name).cloned()
    }
}

impl FieldLookup for BTreeMap<String, FieldValue> {
    fn current_value(&self, name: &str) -> Option<FieldValue> {
        self.get(name).cloned()
    }
}

impl FieldLookup for [(&str, FieldValue)] {
    fn current_value(&self, name: &str) -> Option<FieldValue> {
        self.iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.clone())
    }
}

/// A lookup with no fields. Every relational check passes against it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl FieldLookup for NoLookup {
    fn current_value(&self, _name: &str) -> Option<FieldValue> {
        None
    }
}
