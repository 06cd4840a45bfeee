#![forbid(unsafe_code)]

//! In-memory capture and restore of in-progress input.

use std::collections::BTreeMap;

use crate::feedback::absorb;
use crate::host::{ControlKind, FormHost, FormView};

/// The remembered value of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "value", rename_all = "lowercase"))]
pub enum SnapshotValue {
    /// Text-like controls.
    Text(String),
    /// A lone checkbox.
    Checked(bool),
    /// The checked option of a radio group.
    Choice(String),
    /// The checked options of a checkbox group, in document order.
    Selection(Vec<String>),
}

/// Field name → last-known value.
pub type Snapshot = BTreeMap<String, SnapshotValue>;

/// Read every control of `host` into a snapshot.
///
/// A radio group with nothing checked has no entry.
#[must_use]
pub fn read<H: FormHost + ?Sized>(host: &H) -> Snapshot {
    let view = FormView::capture(host);
    let mut snapshot = Snapshot::new();
    for name in view.field_names() {
        let members: Vec<_> = view.members(name).collect();
        let Some(first) = members.first() else {
            continue;
        };
        let value = match first.kind {
            ControlKind::Checkbox if members.len() > 1 => SnapshotValue::Selection(
                members
                    .iter()
                    .filter(|c| c.checked)
                    .map(|c| c.value.clone())
                    .collect(),
            ),
            ControlKind::Checkbox => SnapshotValue::Checked(first.checked),
            ControlKind::Radio => match members.iter().find(|c| c.checked) {
                Some(chosen) => SnapshotValue::Choice(chosen.value.clone()),
                None => continue,
            },
            _ => SnapshotValue::Text(first.value.clone()),
        };
        snapshot.insert(name.to_string(), value);
    }
    snapshot
}

/// Write `snapshot` back into the controls of `host`.
///
/// Controls without an entry, and entries whose shape does not fit the
/// control, are left alone. Returns the number of controls written.
pub fn write<H: FormHost + ?Sized>(host: &mut H, snapshot: &Snapshot) -> usize {
    let view = FormView::capture(host);
    let mut written = 0;
    for control in view.controls() {
        let Some(saved) = snapshot.get(&control.name) else {
            continue;
        };
        match (control.kind, saved) {
            (ControlKind::Checkbox, SnapshotValue::Checked(on)) => {
                absorb(host.set_checked(control.id, *on));
            }
            (ControlKind::Checkbox, SnapshotValue::Selection(values)) => {
                absorb(host.set_checked(control.id, values.contains(&control.value)));
            }
            (ControlKind::Radio, SnapshotValue::Choice(value)) => {
                absorb(host.set_checked(control.id, *value == control.value));
            }
            (kind, SnapshotValue::Text(value)) if !kind.is_checkable() => {
                absorb(host.set_value(control.id, value));
            }
            _ => continue,
        }
        written += 1;
    }
    written
}

/// The session's remembered input.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    current: Snapshot,
    captures: u64,
}

impl SessionSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with the current state of `host`.
    pub fn capture<H: FormHost + ?Sized>(&mut self, host: &H) -> &Snapshot {
        self.current = read(host);
        self.captures += 1;
        &self.current
    }

    /// Write the held snapshot back into `host`.
    pub fn restore<H: FormHost + ?Sized>(&self, host: &mut H) -> usize {
        write(host, &self.current)
    }

    #[must_use]
    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// Number of captures taken so far.
    #[must_use]
    pub fn captures(&self) -> u64 {
        self.captures
    }
}
