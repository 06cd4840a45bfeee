#![forbid(unsafe_code)]

//! In-memory page implementing [`FormHost`].
//!
//! [`MemoryPage`] holds controls, feedback slots, strength slots, and a
//! submit control. Every host call is appended to a journal so tests can
//! assert on exactly what the runtime did, and [`MemoryPage::dump`] renders
//! the visible state as deterministic text for snapshot comparison.

use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;

use formcheck_runtime::{
    Control, ControlId, ControlKind, FormHost, FormView, HostError, HostResult, Marker,
};
use serde_json::json;

// ============================================================================
// Page parts
// ============================================================================

/// A feedback slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slot {
    pub text: String,
    pub visible: bool,
}

/// A strength meter slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrengthSlot {
    pub class: String,
    pub label: String,
}

/// The submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub id: String,
    pub enabled: bool,
    pub label: String,
}

/// One recorded host call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    SetValue { id: ControlId, value: String },
    SetChecked { id: ControlId, checked: bool },
    SlotText { slot: String, text: String },
    SlotVisible { slot: String, visible: bool },
    Marker { field: String, marker: Marker, on: bool },
    Strength { slot: String, class: String, label: String },
    SubmitControl { id: String, enabled: bool, label: String },
    Submit,
}

impl HostOp {
    /// Short operation name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetValue { .. } => "set_value",
            Self::SetChecked { .. } => "set_checked",
            Self::SlotText { .. } => "slot_text",
            Self::SlotVisible { .. } => "slot_visible",
            Self::Marker { .. } => "marker",
            Self::Strength { .. } => "strength",
            Self::SubmitControl { .. } => "submit_control",
            Self::Submit => "submit",
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::SetValue { id, value } => json!({"op": self.name(), "id": id.0, "value": value}),
            Self::SetChecked { id, checked } => {
                json!({"op": self.name(), "id": id.0, "checked": checked})
            }
            Self::SlotText { slot, text } => json!({"op": self.name(), "slot": slot, "text": text}),
            Self::SlotVisible { slot, visible } => {
                json!({"op": self.name(), "slot": slot, "visible": visible})
            }
            Self::Marker { field, marker, on } => json!({
                "op": self.name(),
                "field": field,
                "marker": marker.class_names(),
                "on": on,
            }),
            Self::Strength { slot, class, label } => {
                json!({"op": self.name(), "slot": slot, "class": class, "label": label})
            }
            Self::SubmitControl { id, enabled, label } => {
                json!({"op": self.name(), "id": id, "enabled": enabled, "label": label})
            }
            Self::Submit => json!({"op": self.name()}),
        }
    }
}

/// A journal entry: the call and whether the page could honour it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub op: HostOp,
    pub applied: bool,
}

// ============================================================================
// MemoryPage
// ============================================================================

/// An in-memory form page.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    form_id: Option<String>,
    controls: Vec<Control>,
    markers: BTreeMap<String, Marker>,
    slots: BTreeMap<String, Slot>,
    strength: BTreeMap<String, StrengthSlot>,
    submit: Option<SubmitControl>,
    submissions: u32,
    journal: Vec<JournalEntry>,
}

impl MemoryPage {
    /// An empty page with a form container `form_id`.
    #[must_use]
    pub fn new(form_id: impl Into<String>) -> Self {
        Self {
            form_id: Some(form_id.into()),
            ..Self::default()
        }
    }

    /// A page with no form container.
    #[must_use]
    pub fn without_form() -> Self {
        Self::default()
    }

    // -- Builder ------------------------------------------------------------

    /// Append a control.
    #[must_use]
    pub fn control(mut self, kind: ControlKind, name: &str, value: &str, checked: bool) -> Self {
        let id = ControlId(self.controls.len());
        self.controls.push(Control {
            id,
            name: name.to_string(),
            kind,
            value: value.to_string(),
            checked,
        });
        self
    }

    #[must_use]
    pub fn text(self, name: &str) -> Self {
        self.control(ControlKind::Text, name, "", false)
    }

    #[must_use]
    pub fn email(self, name: &str) -> Self {
        self.control(ControlKind::Email, name, "", false)
    }

    #[must_use]
    pub fn password(self, name: &str) -> Self {
        self.control(ControlKind::Password, name, "", false)
    }

    #[must_use]
    pub fn number(self, name: &str) -> Self {
        self.control(ControlKind::Number, name, "", false)
    }

    #[must_use]
    pub fn date(self, name: &str) -> Self {
        self.control(ControlKind::Date, name, "", false)
    }

    #[must_use]
    pub fn select(self, name: &str) -> Self {
        self.control(ControlKind::Select, name, "", false)
    }

    #[must_use]
    pub fn textarea(self, name: &str) -> Self {
        self.control(ControlKind::Textarea, name, "", false)
    }

    /// A lone checkbox with option value `on`.
    #[must_use]
    pub fn checkbox(self, name: &str) -> Self {
        self.control(ControlKind::Checkbox, name, "on", false)
    }

    /// One checkbox per option, all sharing `name`.
    #[must_use]
    pub fn checkbox_group(self, name: &str, options: &[&str]) -> Self {
        options.iter().fold(self, |page, option| {
            page.control(ControlKind::Checkbox, name, option, false)
        })
    }

    /// One radio per option, all sharing `name`.
    #[must_use]
    pub fn radio_group(self, name: &str, options: &[&str]) -> Self {
        options.iter().fold(self, |page, option| {
            page.control(ControlKind::Radio, name, option, false)
        })
    }

    /// Add an empty, hidden slot.
    #[must_use]
    pub fn slot(mut self, id: &str) -> Self {
        self.slots.insert(id.to_string(), Slot::default());
        self
    }

    /// Add a `<prefix><name>` slot for every distinct control name.
    #[must_use]
    pub fn feedback_slots(self, prefix: &str) -> Self {
        let names: Vec<String> = FormView::from_controls(self.controls.clone())
            .field_names()
            .into_iter()
            .map(|name| format!("{prefix}{name}"))
            .collect();
        names.iter().fold(self, |page, id| page.slot(id))
    }

    #[must_use]
    pub fn strength_slot(mut self, id: &str) -> Self {
        self.strength.insert(id.to_string(), StrengthSlot::default());
        self
    }

    #[must_use]
    pub fn submit_control(mut self, id: &str, label: &str) -> Self {
        self.submit = Some(SubmitControl {
            id: id.to_string(),
            enabled: true,
            label: label.to_string(),
        });
        self
    }

    // -- User interaction ---------------------------------------------------

    /// Replace the value of the first control named `name`.
    pub fn type_value(&mut self, name: &str, value: &str) -> bool {
        match self.controls.iter_mut().find(|c| c.name == name) {
            Some(control) => {
                control.value = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Set the checked state of the checkbox `name` with option `option`.
    pub fn check(&mut self, name: &str, option: &str, on: bool) -> bool {
        match self
            .controls
            .iter_mut()
            .find(|c| c.name == name && c.value == option && c.kind == ControlKind::Checkbox)
        {
            Some(control) => {
                control.checked = on;
                true
            }
            None => false,
        }
    }

    /// Select `option` in radio group `name`, unchecking the others.
    pub fn choose(&mut self, name: &str, option: &str) -> bool {
        let mut found = false;
        for control in self
            .controls
            .iter_mut()
            .filter(|c| c.name == name && c.kind == ControlKind::Radio)
        {
            control.checked = control.value == option;
            found |= control.checked;
        }
        found
    }

    // -- Queries ------------------------------------------------------------

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.controls
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    #[must_use]
    pub fn is_checked(&self, name: &str, option: &str) -> bool {
        self.controls
            .iter()
            .any(|c| c.name == name && c.value == option && c.checked)
    }

    #[must_use]
    pub fn slot_state(&self, id: &str) -> Option<&Slot> {
        self.slots.get(id)
    }

    /// Text of a visible slot; `None` when hidden or absent.
    #[must_use]
    pub fn shown_message(&self, id: &str) -> Option<&str> {
        self.slots
            .get(id)
            .filter(|s| s.visible)
            .map(|s| s.text.as_str())
    }

    #[must_use]
    pub fn marker(&self, field: &str) -> Marker {
        self.markers.get(field).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn strength(&self, id: &str) -> Option<&StrengthSlot> {
        self.strength.get(id)
    }

    #[must_use]
    pub fn submit_state(&self) -> Option<&SubmitControl> {
        self.submit.as_ref()
    }

    #[must_use]
    pub fn submissions(&self) -> u32 {
        self.submissions
    }

    #[must_use]
    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Journal entries whose target was missing.
    #[must_use]
    pub fn misses(&self) -> usize {
        self.journal.iter().filter(|e| !e.applied).count()
    }

    /// The journal as JSON lines, one host call per line.
    #[must_use]
    pub fn journal_jsonl(&self) -> String {
        let mut out = String::new();
        for (seq, entry) in self.journal.iter().enumerate() {
            let mut value = entry.op.to_json();
            if let Some(obj) = value.as_object_mut() {
                obj.insert("seq".into(), json!(seq));
                obj.insert("applied".into(), json!(entry.applied));
            }
            out.push_str(&value.to_string());
            out.push('\n');
        }
        out
    }

    /// Render the visible state as text.
    ///
    /// ```text
    /// form dynamicForm
    /// field username text [error] value="ab"
    /// field interests checkbox [] selected=[coding,music]
    /// slot error-username shown "Username must be ..."
    /// strength strength-password class="password-strength weak" label="Password strength: WEAK"
    /// submit submitBtn enabled "Create Account"
    /// submissions 0
    /// ```
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "form {}", self.form_id.as_deref().unwrap_or("-"));

        let view = FormView::from_controls(self.controls.clone());
        for name in view.field_names() {
            let members: Vec<&Control> = view.members(name).collect();
            let Some(first) = members.first() else {
                continue;
            };
            let markers = self.marker(name).class_names().join(",");
            let state = match first.kind {
                ControlKind::Checkbox if members.len() > 1 => {
                    let selected: Vec<&str> = members
                        .iter()
                        .filter(|c| c.checked)
                        .map(|c| c.value.as_str())
                        .collect();
                    format!("selected=[{}]", selected.join(","))
                }
                ControlKind::Checkbox => format!("checked={}", first.checked),
                ControlKind::Radio => {
                    let chosen = members
                        .iter()
                        .find(|c| c.checked)
                        .map_or("-", |c| c.value.as_str());
                    format!("chosen={chosen}")
                }
                _ => format!("value={:?}", first.value),
            };
            let _ = writeln!(out, "field {name} {} [{markers}] {state}", first.kind);
        }

        for (id, slot) in &self.slots {
            let shown = if slot.visible { "shown" } else { "hidden" };
            let _ = writeln!(out, "slot {id} {shown} {:?}", slot.text);
        }
        for (id, meter) in &self.strength {
            let _ = writeln!(
                out,
                "strength {id} class={:?} label={:?}",
                meter.class, meter.label
            );
        }
        if let Some(submit) = &self.submit {
            let enabled = if submit.enabled { "enabled" } else { "disabled" };
            let _ = writeln!(out, "submit {} {enabled} {:?}", submit.id, submit.label);
        }
        let _ = writeln!(out, "submissions {}", self.submissions);
        out
    }

    fn record(&mut self, op: HostOp, result: HostResult) -> HostResult {
        self.journal.push(JournalEntry {
            op,
            applied: result.is_ok(),
        });
        result
    }

    fn control_mut(&mut self, id: ControlId) -> Result<&mut Control, HostError> {
        self.controls
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| HostError::MissingControl(id.to_string()))
    }
}

impl FormHost for MemoryPage {
    fn form_present(&self, form_id: &str) -> bool {
        self.form_id.as_deref() == Some(form_id)
    }

    fn controls(&self) -> Vec<Control> {
        self.controls.clone()
    }

    fn set_value(&mut self, id: ControlId, value: &str) -> HostResult {
        let result = self.control_mut(id).map(|c| c.value = value.to_string());
        self.record(
            HostOp::SetValue {
                id,
                value: value.to_string(),
            },
            result,
        )
    }

    fn set_checked(&mut self, id: ControlId, checked: bool) -> HostResult {
        let result = self.control_mut(id).map(|c| c.checked = checked);
        self.record(HostOp::SetChecked { id, checked }, result)
    }

    fn set_slot_text(&mut self, slot: &str, text: &str) -> HostResult {
        let result = match self.slots.get_mut(slot) {
            Some(s) => {
                s.text = text.to_string();
                Ok(())
            }
            None => Err(HostError::MissingSlot(slot.to_string())),
        };
        self.record(
            HostOp::SlotText {
                slot: slot.to_string(),
                text: text.to_string(),
            },
            result,
        )
    }

    fn set_slot_visible(&mut self, slot: &str, visible: bool) -> HostResult {
        let result = match self.slots.get_mut(slot) {
            Some(s) => {
                s.visible = visible;
                Ok(())
            }
            None => Err(HostError::MissingSlot(slot.to_string())),
        };
        self.record(
            HostOp::SlotVisible {
                slot: slot.to_string(),
                visible,
            },
            result,
        )
    }

    fn set_marker(&mut self, field: &str, marker: Marker, on: bool) -> HostResult {
        let result = if self.controls.iter().any(|c| c.name == field) {
            self.markers
                .entry(field.to_string())
                .or_default()
                .set(marker, on);
            Ok(())
        } else {
            Err(HostError::MissingField(field.to_string()))
        };
        self.record(
            HostOp::Marker {
                field: field.to_string(),
                marker,
                on,
            },
            result,
        )
    }

    fn set_strength(&mut self, slot: &str, class: &str, label: &str) -> HostResult {
        let result = match self.strength.get_mut(slot) {
            Some(meter) => {
                meter.class = class.to_string();
                meter.label = label.to_string();
                Ok(())
            }
            None => Err(HostError::MissingSlot(slot.to_string())),
        };
        self.record(
            HostOp::Strength {
                slot: slot.to_string(),
                class: class.to_string(),
                label: label.to_string(),
            },
            result,
        )
    }

    fn set_submit_control(&mut self, id: &str, enabled: bool, label: &str) -> HostResult {
        let result = match self.submit.as_mut().filter(|s| s.id == id) {
            Some(submit) => {
                submit.enabled = enabled;
                submit.label = label.to_string();
                Ok(())
            }
            None => Err(HostError::MissingControl(id.to_string())),
        };
        self.record(
            HostOp::SubmitControl {
                id: id.to_string(),
                enabled,
                label: label.to_string(),
            },
            result,
        )
    }

    fn submit(&mut self) {
        self.submissions += 1;
        self.journal.push(JournalEntry {
            op: HostOp::Submit,
            applied: true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page() -> MemoryPage {
        MemoryPage::new("f")
            .text("username")
            .checkbox_group("interests", &["coding", "music"])
            .radio_group("gender", &["f", "m"])
            .checkbox("terms")
            .feedback_slots("error-")
            .submit_control("go", "Go")
    }

    #[test]
    fn feedback_slots_cover_every_name() {
        let p = page();
        for id in ["error-username", "error-interests", "error-gender", "error-terms"] {
            assert!(p.slot_state(id).is_some(), "{id}");
        }
    }

    #[test]
    fn choose_unchecks_siblings() {
        let mut p = page();
        assert!(p.choose("gender", "f"));
        assert!(p.choose("gender", "m"));
        assert!(!p.is_checked("gender", "f"));
        assert!(p.is_checked("gender", "m"));
        assert!(!p.choose("gender", "x"));
    }

    #[test]
    fn missing_targets_are_journaled_as_misses() {
        let mut p = page();
        assert!(p.set_slot_text("error-ghost", "x").is_err());
        assert!(p.set_marker("ghost", Marker::ERROR, true).is_err());
        assert!(p.set_submit_control("other", false, "x").is_err());
        assert_eq!(p.misses(), 3);
        assert_eq!(p.journal().len(), 3);
    }

    #[test]
    fn dump_is_stable() {
        let mut p = page();
        p.type_value("username", "ab");
        p.check("interests", "music", true);
        p.choose("gender", "m");
        let _ = p.set_marker("username", Marker::ERROR, true);
        let _ = p.set_slot_text("error-username", "too short");
        let _ = p.set_slot_visible("error-username", true);

        let expected = "\
form f
field username text [error] value=\"ab\"
field interests checkbox [] selected=[music]
field gender radio [] chosen=m
field terms checkbox [] checked=false
slot error-gender hidden \"\"
slot error-interests hidden \"\"
slot error-terms hidden \"\"
slot error-username shown \"too short\"
submit go enabled \"Go\"
submissions 0
";
        assert_eq!(p.dump(), expected);
        assert_eq!(p.dump(), p.clone().dump());
    }

    #[test]
    fn journal_jsonl_is_one_object_per_line() {
        let mut p = page();
        let _ = p.set_slot_visible("error-username", true);
        p.submit();
        let jsonl = p.journal_jsonl();
        let lines: Vec<&str> = jsonl.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["op"], "slot_visible");
        assert_eq!(first["seq"], 0);
        assert_eq!(first["applied"], true);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["op"], "submit");
    }
}
