#![forbid(unsafe_code)]

//! End-to-end tests for the registration form.
//!
//! These tests drive a [`FormOrchestrator`] over the in-memory registration
//! page with a manual clock, covering:
//!
//! - Field-level validation on blur and after the debounce window
//! - Password strength scoring on every keystroke
//! - Full-form validation gating submission
//! - The delayed submission and the busy submit control
//! - Autosave cadence tied to attach/detach
//!
//! # Invariants
//!
//! 1. **Debounce**: N rapid inputs on one field produce exactly one
//!    evaluation, against the last value.
//! 2. **Gate**: the host's `submit` runs only after a valid submit plus the
//!    configured delay, and never more than once per submit.
//! 3. **Feedback shape**: a failing field carries the error marker and a
//!    shown slot; a passing field carries the success marker and a hidden slot.
//! 4. **Lifecycle**: no timer fires after detach.
//!
//! Run: `cargo test -p formcheck-harness --test registration_e2e`

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use formcheck_harness::MemoryPage;
use formcheck_harness::fixtures::{
    fill_valid, registration_form, registration_page, registration_rules,
};
use formcheck_runtime::{
    FormConfig, FormEvent, FormOrchestrator, ManualClock, Marker, RuntimeError, SubmitPhase,
};
use pretty_assertions::assert_eq;

type Form = FormOrchestrator<MemoryPage, ManualClock>;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Emit a JSONL log entry to stderr for verbose test logging.
fn log_jsonl(step: &str, data: &[(&str, &str)]) {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let ts = COUNTER.fetch_add(1, Ordering::Relaxed);
    let fields: Vec<String> = std::iter::once(format!("\"ts\":\"T{ts:06}\""))
        .chain(std::iter::once(format!("\"step\":\"{step}\"")))
        .chain(data.iter().map(|(k, v)| format!("\"{k}\":\"{v}\"")))
        .collect();
    eprintln!("{{{}}}", fields.join(","));
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn attached() -> Form {
    let mut form = registration_form().unwrap();
    form.attach().unwrap();
    form
}

fn type_into(form: &mut Form, field: &str, value: &str) {
    form.host_mut().type_value(field, value);
    form.handle_event(FormEvent::Input(field.into()));
}

fn blur(form: &mut Form, field: &str) {
    form.handle_event(FormEvent::Blur(field.into()));
}

fn settle(form: &mut Form) {
    form.advance_time(form.config().debounce);
    form.step();
}

const RULED_TEXT_FIELDS: [&str; 9] = [
    "username",
    "email",
    "password",
    "confirmPassword",
    "firstName",
    "lastName",
    "age",
    "birthDate",
    "country",
];

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

#[test]
fn short_username_shows_rule_message() {
    let mut form = attached();
    form.host_mut().type_value("username", "ab");
    blur(&mut form, "username");

    log_jsonl("blur", &[("field", "username"), ("value", "ab")]);
    assert_eq!(form.host().marker("username"), Marker::ERROR);
    assert_eq!(
        form.host().shown_message("error-username"),
        Some("Username must be 3-20 characters, alphanumeric and underscore only")
    );
}

#[test]
fn email_validates_after_debounce() {
    let mut form = attached();

    type_into(&mut form, "email", "a@b.com");
    assert_eq!(form.host().marker("email"), Marker::empty());
    settle(&mut form);
    assert_eq!(form.host().marker("email"), Marker::SUCCESS);
    assert_eq!(form.host().shown_message("error-email"), None);

    type_into(&mut form, "email", "a-b.com");
    settle(&mut form);
    assert_eq!(form.host().marker("email"), Marker::ERROR);
    assert_eq!(
        form.host().shown_message("error-email"),
        Some("Please enter a valid email address")
    );
}

#[test]
fn rapid_inputs_evaluate_once_with_last_value() {
    let mut form = attached();
    let keystrokes = ["j", "jo", "joh", "john", "john_", "john_d", "john_do", "john_doe"];
    for text in keystrokes {
        type_into(&mut form, "username", text);
        form.advance_time(ms(100));
        assert_eq!(form.step().validations_fired, 0, "after {text:?}");
    }

    form.advance_time(ms(400));
    let result = form.step();
    log_jsonl(
        "debounce",
        &[
            ("inputs", &keystrokes.len().to_string()),
            ("fired", &result.validations_fired.to_string()),
        ],
    );
    assert_eq!(result.validations_fired, 1);
    assert_eq!(form.stats().field_validations, 1);
    assert_eq!(form.host().marker("username"), Marker::SUCCESS);

    form.advance_time(ms(2000));
    assert_eq!(form.step().validations_fired, 0);
}

#[test]
fn confirm_password_tracks_password() {
    let mut form = attached();
    form.host_mut().type_value("password", "Secur3!Pass");
    type_into(&mut form, "confirmPassword", "Secur3!Pas");
    settle(&mut form);
    assert_eq!(
        form.host().shown_message("error-confirmPassword"),
        Some("Passwords do not match")
    );

    type_into(&mut form, "confirmPassword", "Secur3!Pass");
    settle(&mut form);
    assert_eq!(form.host().marker("confirmPassword"), Marker::SUCCESS);
}

#[test]
fn focus_clears_error_but_keeps_success() {
    let mut form = attached();
    blur(&mut form, "firstName");
    assert_eq!(form.host().marker("firstName"), Marker::ERROR);
    form.handle_event(FormEvent::Focus("firstName".into()));
    assert_eq!(form.host().marker("firstName"), Marker::empty());
    assert_eq!(form.host().shown_message("error-firstName"), None);

    form.host_mut().type_value("lastName", "Doe");
    blur(&mut form, "lastName");
    form.handle_event(FormEvent::Focus("lastName".into()));
    assert_eq!(form.host().marker("lastName"), Marker::SUCCESS);
}

#[test]
fn interests_group_validates_on_change() {
    let mut form = attached();
    for option in ["coding", "music", "sports", "travel", "reading", "gaming"] {
        form.host_mut().check("interests", option, true);
        form.handle_event(FormEvent::Change("interests".into()));
    }
    assert_eq!(
        form.host().shown_message("error-interests"),
        Some("Please select 1-5 interests")
    );
    assert_eq!(form.host().marker("interests"), Marker::empty());

    form.host_mut().check("interests", "gaming", false);
    form.handle_event(FormEvent::Change("interests".into()));
    assert_eq!(form.host().shown_message("error-interests"), None);
}

// ---------------------------------------------------------------------------
// Strength
// ---------------------------------------------------------------------------

#[test]
fn eight_char_mixed_password_is_strong() {
    let mut form = attached();
    type_into(&mut form, "password", "Abcdef1!");
    let meter = form.host().strength("strength-password").unwrap();
    assert_eq!(meter.class, "password-strength strong");
    assert_eq!(meter.label, "Password strength: STRONG");

    let scored = form.score_strength("password").unwrap();
    assert_eq!(scored.score, 5);
}

#[test]
fn strength_follows_every_keystroke() {
    let mut form = attached();
    let mut labels = Vec::new();
    for text in ["a", "aB", "aB3", "aB3$", "aB3$efgh", "aB3$efghijkl"] {
        type_into(&mut form, "password", text);
        labels.push(form.host().strength("strength-password").unwrap().label.clone());
    }
    assert_eq!(
        labels,
        vec![
            "Password strength: WEAK",
            "Password strength: WEAK",
            "Password strength: FAIR",
            "Password strength: GOOD",
            "Password strength: STRONG",
            "Password strength: STRONG",
        ]
    );
    assert_eq!(form.stats().strength_scores, 6);
    assert!(!form.is_validation_pending("password"));
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[test]
fn unchecked_terms_blocks_submission() {
    let mut form = attached();
    fill_valid(form.host_mut());
    form.host_mut().check("terms", "on", false);

    form.handle_event(FormEvent::Submit);

    assert_eq!(form.phase(), SubmitPhase::Blocked);
    let report = form.last_report().unwrap();
    assert!(!report.valid);
    assert_eq!(report.failures, vec!["terms"]);
    assert_eq!(report.evaluated, 11);

    assert_eq!(form.host().marker("terms"), Marker::ERROR);
    assert_eq!(
        form.host().shown_message("error-terms"),
        Some("You must accept the terms and conditions")
    );
    for field in RULED_TEXT_FIELDS {
        assert_eq!(form.host().marker(field), Marker::SUCCESS, "{field}");
        assert_eq!(form.host().shown_message(&format!("error-{field}")), None);
    }
    assert_eq!(form.host().shown_message("error-interests"), None);

    let submit = form.host().submit_state().unwrap();
    assert!(submit.enabled);
    assert_eq!(submit.label, "Create Account");

    form.advance_time(ms(10_000));
    form.step();
    assert_eq!(form.host().submissions(), 0);
}

#[test]
fn empty_submit_flags_every_ruled_field() {
    let mut form = attached();
    form.handle_event(FormEvent::Submit);
    let report = form.last_report().unwrap();
    // An empty age is not a number to bound; birthDate only has a type.
    assert_eq!(
        report.failures,
        vec![
            "username",
            "email",
            "password",
            "firstName",
            "lastName",
            "age",
            "country",
            "interests",
            "terms",
        ]
    );
    assert_eq!(form.host().marker("confirmPassword"), Marker::SUCCESS);
}

#[test]
fn valid_submit_fires_once_after_delay() {
    let mut form = attached();
    fill_valid(form.host_mut());
    form.handle_event(FormEvent::Submit);

    assert_eq!(form.phase(), SubmitPhase::Submitting);
    let submit = form.host().submit_state().unwrap();
    assert!(!submit.enabled);
    assert_eq!(submit.label, "Creating Account...");

    form.advance_time(ms(999));
    assert!(!form.step().submitted);
    form.handle_event(FormEvent::Submit);
    form.advance_time(ms(1));
    let result = form.step();
    log_jsonl("submit", &[("submitted", &result.submitted.to_string())]);
    assert!(result.submitted);
    assert_eq!(form.host().submissions(), 1);

    form.advance_time(ms(30_000));
    form.step();
    assert_eq!(form.host().submissions(), 1);
    assert_eq!(form.stats().form_validations, 1);
}

#[test]
fn blocked_then_corrected_submit_goes_through() {
    let mut form = attached();
    fill_valid(form.host_mut());
    form.host_mut().type_value("age", "12");
    form.handle_event(FormEvent::Submit);
    assert_eq!(form.last_report().unwrap().failures, vec!["age"]);
    assert_eq!(
        form.host().shown_message("error-age"),
        Some("Age must be between 13 and 80")
    );

    form.handle_event(FormEvent::Focus("age".into()));
    assert_eq!(form.phase(), SubmitPhase::Idle);
    form.host_mut().type_value("age", "13");
    blur(&mut form, "age");
    form.handle_event(FormEvent::Submit);
    assert_eq!(form.phase(), SubmitPhase::Submitting);

    form.advance_time(form.config().submit_delay);
    assert!(form.step().submitted);
}

#[test]
fn custom_submit_delay_is_honoured() {
    let config = FormConfig::default().with_submit_delay(ms(250));
    let mut form = Form::with_clock(
        registration_rules().unwrap(),
        config,
        registration_page(),
        ManualClock::new(),
    );
    form.attach().unwrap();
    fill_valid(form.host_mut());
    form.handle_event(FormEvent::Submit);
    form.advance_time(ms(250));
    assert!(form.step().submitted);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn attach_fails_without_form_container() {
    let mut form = Form::with_clock(
        registration_rules().unwrap(),
        FormConfig::default(),
        MemoryPage::without_form(),
        ManualClock::new(),
    );
    assert_eq!(
        form.attach(),
        Err(RuntimeError::FormMissing("dynamicForm".into()))
    );
    assert_eq!(form.next_deadline(), None);
}

#[test]
fn autosave_runs_every_interval_until_detach() {
    let mut form = attached();
    form.host_mut().type_value("username", "john_doe");

    let mut saves = 0;
    for _ in 0..4 {
        form.advance_time(ms(5000));
        if form.step().autosaved {
            saves += 1;
        }
    }
    assert_eq!(saves, 4);
    assert_eq!(form.session().captures(), 4);

    form.detach();
    form.advance_time(ms(60_000));
    assert!(!form.step().autosaved);
    assert_eq!(form.session().captures(), 4);
}

#[test]
fn autosave_does_not_fire_early() {
    let mut form = attached();
    form.advance_time(ms(4999));
    assert!(!form.step().autosaved);
    form.advance_time(ms(1));
    assert!(form.step().autosaved);
}

#[test]
fn detach_cancels_scheduled_submission() {
    let mut form = attached();
    fill_valid(form.host_mut());
    form.handle_event(FormEvent::Submit);
    assert!(!form.host().submit_state().unwrap().enabled);
    form.detach();
    assert_eq!(form.phase(), SubmitPhase::Idle);
    let submit = form.host().submit_state().unwrap();
    assert!(submit.enabled);
    assert_eq!(submit.label, "Create Account");

    form.attach().unwrap();
    form.advance_time(ms(5000));
    assert!(!form.step().submitted);
    assert_eq!(form.host().submissions(), 0);

    form.handle_event(FormEvent::Submit);
    assert_eq!(form.phase(), SubmitPhase::Submitting);
    form.advance_time(ms(1000));
    assert!(form.step().submitted);
    assert_eq!(form.host().submissions(), 1);
}

#[test]
fn interests_missing_from_page_still_blocks_submit() {
    let page = MemoryPage::new("dynamicForm")
        .text("username")
        .checkbox("terms")
        .feedback_slots("error-")
        .slot("error-interests")
        .submit_control("submitBtn", "Create Account");
    let rules = registration_rules().unwrap();
    let mut form = Form::with_clock(
        rules.clone(),
        FormConfig::default(),
        page,
        ManualClock::new(),
    );
    form.attach().unwrap();
    form.host_mut().type_value("username", "alice");
    form.host_mut().check("terms", "on", true);
    form.handle_event(FormEvent::Submit);

    assert_eq!(form.phase(), SubmitPhase::Blocked);
    let report = form.last_report().unwrap();
    assert_eq!(report.failures, vec!["interests"]);
    assert_eq!(report.evaluated, 3);
    assert_eq!(
        form.host().shown_message("error-interests"),
        rules.get("interests").unwrap().message.as_deref()
    );

    form.advance_time(ms(5000));
    form.step();
    assert_eq!(form.host().submissions(), 0);
    assert!(form.host().submit_state().unwrap().enabled);
}

#[test]
fn missing_slots_do_not_stop_validation() {
    let page = MemoryPage::new("dynamicForm")
        .text("username")
        .submit_control("submitBtn", "Create Account");
    let mut form = Form::with_clock(
        registration_rules().unwrap(),
        FormConfig::default(),
        page,
        ManualClock::new(),
    );
    form.attach().unwrap();
    form.host_mut().type_value("username", "ab");
    blur(&mut form, "username");

    assert_eq!(form.host().marker("username"), Marker::ERROR);
    assert_eq!(form.host().misses(), 2);

    type_into(&mut form, "password", "whatever");
    assert_eq!(form.stats().strength_scores, 0);
}
