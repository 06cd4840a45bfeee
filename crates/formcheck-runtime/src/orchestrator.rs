#![forbid(unsafe_code)]

//! Event-driven form orchestration.
//!
//! [`FormOrchestrator`] owns a host, a clock, and the shared [`RuleSet`]. It
//! turns typed [`FormEvent`]s into validator calls and feedback, gates
//! submission, debounces input validation, and autosaves the session.
//!
//! The host drives everything; nothing here blocks or spawns:
//!
//! 1. Deliver events with [`FormOrchestrator::handle_event`] (immediately) or
//!    [`FormOrchestrator::push_event`] (queued).
//! 2. Advance time (for a [`ManualClock`], [`FormOrchestrator::advance_time`]).
//! 3. Call [`FormOrchestrator::step`] to drain queued events and fire due
//!    timers: debounced validations, autosave, and the delayed submission.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use formcheck_runtime::{FormConfig, FormEvent, FormOrchestrator, ManualClock};
//!
//! let rules = Arc::new(formcheck_core::RuleSet::registration()?);
//! let mut form = FormOrchestrator::with_clock(rules, FormConfig::default(), page, ManualClock::new());
//! form.attach()?;
//!
//! form.push_event(FormEvent::Input("username".into()));
//! form.advance_time(Duration::from_millis(500));
//! let result = form.step();
//! assert_eq!(result.validations_fired, 1);
//! ```
//!
//! # Submission phases
//!
//! ```text
//! Idle ──Submit──▶ Validating ──invalid──▶ Blocked ──interaction──▶ Idle
//!                      │
//!                      └──valid──▶ Submitting ──delay──▶ host.submit()
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use formcheck_core::{RuleSet, StrengthResult, Verdict, evaluate, evaluate_group};
use tracing::{debug, debug_span, info};

use crate::clock::{Clock, ManualClock, SystemClock};
use crate::config::FormConfig;
use crate::debounce::DebounceScheduler;
use crate::error::RuntimeError;
use crate::feedback::{FeedbackRenderer, FeedbackState, Target, absorb};
use crate::host::{ControlKind, FormHost, FormView};
use crate::interval::RecurringTask;
use crate::snapshot::SessionSnapshot;

// ---------------------------------------------------------------------------
// Events and messages
// ---------------------------------------------------------------------------

/// A user or page event, already translated by the host glue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// A control lost focus.
    Blur(String),
    /// A control gained focus.
    Focus(String),
    /// A control's value changed while typing.
    Input(String),
    /// A checkable control toggled.
    Change(String),
    /// The form was submitted.
    Submit,
    /// The page is going away.
    Unload,
}

impl FormEvent {
    /// The field this event names, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Blur(f) | Self::Focus(f) | Self::Input(f) | Self::Change(f) => Some(f),
            Self::Submit | Self::Unload => None,
        }
    }
}

/// Everything the orchestrator reacts to: host events plus its own timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Event(FormEvent),
    /// A debounced validation came due.
    Validate(String),
    /// The autosave period elapsed.
    Autosave,
    /// The submit delay elapsed.
    SubmitDue,
}

impl From<FormEvent> for Msg {
    fn from(event: FormEvent) -> Self {
        Self::Event(event)
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Where the form is in the submission flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Validating,
    /// The last submit found invalid fields.
    Blocked,
    /// Validation passed; the real submission is scheduled or done.
    Submitting,
}

/// Result of a full-form validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormReport {
    pub valid: bool,
    /// Names of failing fields and groups, in document order.
    pub failures: Vec<String>,
    /// Number of fields and groups evaluated.
    pub evaluated: usize,
}

impl FormReport {
    fn new() -> Self {
        Self {
            valid: true,
            failures: Vec::new(),
            evaluated: 0,
        }
    }

    fn record(&mut self, name: &str, verdict: &Verdict) {
        self.evaluated += 1;
        if !verdict.valid {
            self.valid = false;
            self.failures.push(name.to_string());
        }
    }
}

/// What a [`FormOrchestrator::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Queued events handled during this step.
    pub events_processed: u32,
    /// Debounced validations that fired.
    pub validations_fired: u32,
    /// Whether the autosave ran.
    pub autosaved: bool,
    /// Whether the real submission ran.
    pub submitted: bool,
    /// Phase after the step.
    pub phase: SubmitPhase,
}

/// Running counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorStats {
    pub events: u64,
    /// Events delivered while detached.
    pub ignored_events: u64,
    pub field_validations: u64,
    pub group_validations: u64,
    pub form_validations: u64,
    pub debounce_fires: u64,
    pub strength_scores: u64,
    pub autosaves: u64,
    pub blocked_submits: u64,
    pub submissions: u64,
}

// ---------------------------------------------------------------------------
// FormOrchestrator
// ---------------------------------------------------------------------------

/// Drives validation, feedback, and submission for one form.
pub struct FormOrchestrator<H: FormHost, C: Clock = SystemClock> {
    rules: Arc<RuleSet>,
    config: FormConfig,
    renderer: FeedbackRenderer,
    host: H,
    clock: C,
    attached: bool,
    phase: SubmitPhase,
    queue: VecDeque<FormEvent>,
    debounce: DebounceScheduler<String>,
    autosave: RecurringTask,
    submit_due: Option<Duration>,
    session: SessionSnapshot,
    last_report: Option<FormReport>,
    stats: OrchestratorStats,
}

impl<H: FormHost> FormOrchestrator<H, SystemClock> {
    /// Create an orchestrator on wall-clock time.
    #[must_use]
    pub fn new(rules: Arc<RuleSet>, config: FormConfig, host: H) -> Self {
        Self::with_clock(rules, config, host, SystemClock::new())
    }
}

impl<H: FormHost> FormOrchestrator<H, ManualClock> {
    /// Advance the deterministic clock by `dt`.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    /// Set the deterministic clock to an absolute time.
    pub fn set_time(&mut self, now: Duration) {
        self.clock.set(now);
    }
}

impl<H: FormHost, C: Clock> FormOrchestrator<H, C> {
    /// Create an orchestrator with an explicit clock.
    #[must_use]
    pub fn with_clock(rules: Arc<RuleSet>, config: FormConfig, host: H, clock: C) -> Self {
        let renderer = FeedbackRenderer::new(config.slot_prefix.clone());
        let autosave = RecurringTask::new(config.autosave_interval);
        Self {
            rules,
            config,
            renderer,
            host,
            clock,
            attached: false,
            phase: SubmitPhase::Idle,
            queue: VecDeque::new(),
            debounce: DebounceScheduler::new(),
            autosave,
            submit_due: None,
            session: SessionSnapshot::new(),
            last_report: None,
            stats: OrchestratorStats::default(),
        }
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Start handling events and start the autosave task.
    ///
    /// Fails if the host has no form with the configured id.
    pub fn attach(&mut self) -> Result<(), RuntimeError> {
        if !self.host.form_present(&self.config.form_id) {
            return Err(RuntimeError::FormMissing(self.config.form_id.clone()));
        }
        self.attached = true;
        self.autosave.start(self.clock.now_mono());
        info!(
            form = %self.config.form_id,
            rules = self.rules.len(),
            autosave_ms = self.config.autosave_interval.as_millis() as u64,
            "form attached"
        );
        Ok(())
    }

    /// Stop handling events and cancel every pending timer: debounced
    /// validations, the autosave task, and a scheduled submission.
    ///
    /// A cancelled submission hands the submit control back, enabled and
    /// showing `submit_label`.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        self.autosave.stop();
        self.debounce.clear();
        self.queue.clear();
        if self.submit_due.take().is_some() {
            absorb(self.host.set_submit_control(
                &self.config.submit_id,
                true,
                &self.config.submit_label,
            ));
            debug!("scheduled submission cancelled");
        }
        self.phase = SubmitPhase::Idle;
        info!(form = %self.config.form_id, "form detached");
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    // -- Dispatch -----------------------------------------------------------

    /// Queue an event for the next [`step`](Self::step).
    pub fn push_event(&mut self, event: FormEvent) {
        self.queue.push_back(event);
    }

    /// Handle an event now.
    pub fn handle_event(&mut self, event: FormEvent) {
        self.update(Msg::Event(event));
    }

    /// Handle one message. Ignored while detached.
    ///
    /// Timer messages are normally produced by [`tick`](Self::tick); sending
    /// them directly runs the action regardless of its deadline.
    pub fn update(&mut self, msg: Msg) {
        if !self.attached {
            self.stats.ignored_events += 1;
            debug!(?msg, "message ignored while detached");
            return;
        }
        match msg {
            Msg::Event(event) => {
                self.stats.events += 1;
                self.on_event(event);
            }
            Msg::Validate(field) => {
                self.stats.debounce_fires += 1;
                debug!(field = %field, "debounced validation fired");
                self.validate_field(&field);
            }
            Msg::Autosave => {
                self.stats.autosaves += 1;
                let fields = self.session.capture(&self.host).len();
                debug!(fields, "autosaved");
            }
            Msg::SubmitDue => self.submit_now(),
        }
    }

    /// Drain queued events, then fire due timers.
    pub fn step(&mut self) -> StepResult {
        let mut events_processed: u32 = 0;
        while let Some(event) = self.queue.pop_front() {
            events_processed += 1;
            self.handle_event(event);
        }
        let mut result = self.tick();
        result.events_processed = events_processed;
        result
    }

    /// Fire due timers without touching the event queue.
    pub fn tick(&mut self) -> StepResult {
        let mut result = StepResult {
            events_processed: 0,
            validations_fired: 0,
            autosaved: false,
            submitted: false,
            phase: self.phase,
        };
        if !self.attached {
            return result;
        }
        let now = self.clock.now_mono();

        for (field, ()) in self.debounce.poll(now) {
            self.update(Msg::Validate(field));
            result.validations_fired += 1;
        }
        if self.autosave.poll(now) {
            self.update(Msg::Autosave);
            result.autosaved = true;
        }
        if self.submit_due.is_some_and(|due| now >= due) {
            self.update(Msg::SubmitDue);
            result.submitted = true;
        }

        result.phase = self.phase;
        result
    }

    fn on_event(&mut self, event: FormEvent) {
        if self.phase == SubmitPhase::Blocked && event.field().is_some() {
            self.set_phase(SubmitPhase::Idle);
        }
        match event {
            FormEvent::Blur(field) => {
                self.validate_field(&field);
            }
            FormEvent::Focus(field) => {
                self.clear_feedback(&field);
            }
            FormEvent::Input(field) => self.on_input(&field),
            FormEvent::Change(field) => {
                if self.is_group(&field) {
                    self.validate_group(&field);
                }
            }
            FormEvent::Submit => self.on_submit(),
            FormEvent::Unload => {
                let fields = self.session.capture(&self.host).len();
                debug!(fields, "captured on unload");
            }
        }
    }

    fn on_input(&mut self, field: &str) {
        if self.config.strength_field.as_deref() == Some(field) {
            self.score_strength(field);
        }
        if self.is_debounced(field) {
            let now = self.clock.now_mono();
            let superseded =
                self.debounce
                    .schedule(field.to_string(), (), self.config.debounce, now);
            debug!(field, superseded, "validation scheduled");
        }
    }

    fn on_submit(&mut self) {
        if self.phase == SubmitPhase::Submitting {
            debug!("submit ignored while submitting");
            return;
        }
        self.set_phase(SubmitPhase::Validating);
        let report = self.validate_form();
        let valid = report.valid;
        self.last_report = Some(report);

        if !valid {
            self.stats.blocked_submits += 1;
            self.set_phase(SubmitPhase::Blocked);
            return;
        }

        absorb(self.host.set_submit_control(
            &self.config.submit_id,
            false,
            &self.config.busy_label,
        ));
        let due = self
            .clock
            .now_mono()
            .saturating_add(self.config.submit_delay);
        self.submit_due = Some(due);
        self.set_phase(SubmitPhase::Submitting);
        info!(
            delay_ms = self.config.submit_delay.as_millis() as u64,
            "submission scheduled"
        );
    }

    fn submit_now(&mut self) {
        if self.submit_due.take().is_none() {
            return;
        }
        self.stats.submissions += 1;
        self.host.submit();
        info!(form = %self.config.form_id, "submitted");
    }

    fn set_phase(&mut self, phase: SubmitPhase) {
        if self.phase != phase {
            debug!(from = ?self.phase, to = ?phase, "phase changed");
            self.phase = phase;
        }
    }

    // -- Validation ---------------------------------------------------------

    /// Validate one field and render the verdict.
    ///
    /// Group rules are routed to [`validate_group`](Self::validate_group).
    /// Returns `None` (and renders nothing) when the field has no rule or the
    /// host has no such field.
    pub fn validate_field(&mut self, name: &str) -> Option<Verdict> {
        let rules = Arc::clone(&self.rules);
        let rule = rules.get(name)?;
        if rule.is_group() {
            return self.validate_group(name);
        }
        let view = FormView::capture(&self.host);
        let value = view.field_value(name)?;
        let verdict = evaluate(name, rule, &value, &view);
        self.stats.field_validations += 1;
        debug!(field = name, valid = verdict.valid, "field validated");
        self.renderer
            .render(&mut self.host, Target::Field(name), &verdict);
        Some(verdict)
    }

    /// Validate a checkbox group and render the verdict into its slot.
    ///
    /// Returns `None` when `name` has no group rule or no members on the page.
    pub fn validate_group(&mut self, name: &str) -> Option<Verdict> {
        let rules = Arc::clone(&self.rules);
        let rule = rules.get(name).filter(|r| r.is_group())?;
        let view = FormView::capture(&self.host);
        if !view.contains(name) {
            return None;
        }
        let checked = view.checked_count(name);
        let verdict = evaluate_group(name, rule, checked);
        self.stats.group_validations += 1;
        debug!(group = name, checked, valid = verdict.valid, "group validated");
        self.renderer
            .render(&mut self.host, Target::Group(name), &verdict);
        Some(verdict)
    }

    /// Validate every field that has a rule and render every verdict.
    ///
    /// Fields are walked in document order. Group rules with no members on
    /// the page are then evaluated with nothing checked.
    pub fn validate_form(&mut self) -> FormReport {
        let span = debug_span!("validate_form", form = %self.config.form_id);
        let _guard = span.enter();

        let rules = Arc::clone(&self.rules);
        let view = FormView::capture(&self.host);
        let mut report = FormReport::new();

        for name in view.field_names() {
            let Some(rule) = rules.get(name) else {
                continue;
            };
            let (verdict, target) = if rule.is_group() {
                let verdict = evaluate_group(name, rule, view.checked_count(name));
                (verdict, Target::Group(name))
            } else {
                let value = view.field_value(name).unwrap_or_default();
                (evaluate(name, rule, &value, &view), Target::Field(name))
            };
            self.renderer.render(&mut self.host, target, &verdict);
            report.record(name, &verdict);
        }

        for (name, rule) in rules.iter() {
            if !rule.is_group() || view.contains(name) {
                continue;
            }
            let verdict = evaluate_group(name, rule, 0);
            debug!(group = name, valid = verdict.valid, "group absent from page");
            self.renderer
                .render(&mut self.host, Target::Group(name), &verdict);
            report.record(name, &verdict);
        }

        self.stats.form_validations += 1;
        debug!(
            valid = report.valid,
            evaluated = report.evaluated,
            failures = ?report.failures,
            "form validated"
        );
        report
    }

    /// Score the current value of `field` and render it into its strength
    /// slot. Returns `None` if the host has no such field.
    pub fn score_strength(&mut self, field: &str) -> Option<StrengthResult> {
        let view = FormView::capture(&self.host);
        let control = view.members(field).next()?;
        let result = formcheck_core::score(&control.value);
        self.stats.strength_scores += 1;
        let slot = self.config.strength_slot(field);
        absorb(
            self.host
                .set_strength(&slot, &result.css_class(), &result.label()),
        );
        Some(result)
    }

    /// Put `field` in the cleared state.
    pub fn clear_feedback(&mut self, field: &str) -> FeedbackState {
        let target = if self.is_group(field) {
            Target::Group(field)
        } else {
            Target::Field(field)
        };
        self.renderer.clear(&mut self.host, target)
    }

    fn is_group(&self, field: &str) -> bool {
        self.rules.get(field).is_some_and(|r| r.is_group())
    }

    fn is_debounced(&self, field: &str) -> bool {
        self.config.is_debounced(field)
            || self
                .host
                .controls()
                .iter()
                .any(|c| c.name == field && c.kind == ControlKind::Email)
    }

    // -- Session ------------------------------------------------------------

    /// Write the last captured snapshot back into the host.
    pub fn restore(&mut self) -> usize {
        self.session.restore(&mut self.host)
    }

    #[must_use]
    pub fn session(&self) -> &SessionSnapshot {
        &self.session
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    /// The report of the most recent submit attempt.
    #[must_use]
    pub fn last_report(&self) -> Option<&FormReport> {
        self.last_report.as_ref()
    }

    /// Whether a debounced validation is pending for `field`.
    #[must_use]
    pub fn is_validation_pending(&self, field: &str) -> bool {
        self.debounce.is_pending(&field.to_string())
    }

    /// The earliest time at which [`tick`](Self::tick) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        [
            self.debounce.next_deadline(),
            self.autosave.next_due(),
            self.submit_due,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    #[must_use]
    pub fn stats(&self) -> OrchestratorStats {
        self.stats
    }

    #[must_use]
    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    #[must_use]
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Give the host back.
    pub fn into_host(self) -> H {
        self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::test_host::TestHost;
    use crate::host::{ControlKind, Marker};
    use formcheck_core::{RuleDescriptor, StrengthTier};

    type Form = FormOrchestrator<TestHost, ManualClock>;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn page() -> TestHost {
        TestHost::new()
            .control("username", ControlKind::Text, "")
            .control("email", ControlKind::Email, "")
            .control("password", ControlKind::Password, "")
            .control("confirmPassword", ControlKind::Password, "")
            .control("nickname", ControlKind::Text, "")
            .checked("interests", ControlKind::Checkbox, "coding", false)
            .checked("interests", ControlKind::Checkbox, "music", false)
            .checked("terms", ControlKind::Checkbox, "on", false)
            .strength_slot("strength-password")
    }

    fn rules() -> Arc<RuleSet> {
        Arc::new(
            RuleSet::builder()
                .rule("username", RuleDescriptor::new().length(3, 20).message("bad username"))
                .rule("password", RuleDescriptor::new().min_length(8).message("short"))
                .rule(
                    "confirmPassword",
                    RuleDescriptor::new().matches("password").message("mismatch"),
                )
                .rule(
                    "interests",
                    RuleDescriptor::new().checkbox_group(1, 1).message("pick one"),
                )
                .rule(
                    "terms",
                    RuleDescriptor::new().required().checkbox().message("accept"),
                )
                .build()
                .unwrap(),
        )
    }

    fn form() -> Form {
        let mut f = Form::with_clock(rules(), FormConfig::default(), page(), ManualClock::new());
        f.attach().unwrap();
        f
    }

    fn fill_valid(f: &mut Form) {
        let h = f.host_mut();
        h.type_value("username", "alice");
        h.type_value("password", "longenough");
        h.type_value("confirmPassword", "longenough");
        h.set_box("interests", "music", true);
        h.set_box("terms", "on", true);
    }

    #[test]
    fn attach_requires_form() {
        let mut host = page();
        host.form = false;
        let mut f = Form::with_clock(rules(), FormConfig::default(), host, ManualClock::new());
        assert_eq!(
            f.attach(),
            Err(RuntimeError::FormMissing("dynamicForm".into()))
        );
        assert!(!f.is_attached());
    }

    #[test]
    fn events_ignored_while_detached() {
        let mut f = Form::with_clock(rules(), FormConfig::default(), page(), ManualClock::new());
        f.handle_event(FormEvent::Blur("username".into()));
        assert_eq!(f.stats().ignored_events, 1);
        assert_eq!(f.host().marker("username"), Marker::empty());
    }

    #[test]
    fn blur_validates_immediately() {
        let mut f = form();
        f.host_mut().type_value("username", "ab");
        f.handle_event(FormEvent::Blur("username".into()));
        assert_eq!(f.host().marker("username"), Marker::ERROR);
        assert_eq!(
            f.host().slot("error-username"),
            Some(&("bad username".to_string(), true))
        );
    }

    #[test]
    fn blur_on_unruled_field_renders_nothing() {
        let mut f = form();
        f.handle_event(FormEvent::Blur("nickname".into()));
        assert_eq!(f.host().marker("nickname"), Marker::empty());
        assert_eq!(f.stats().field_validations, 0);
    }

    #[test]
    fn focus_clears_error() {
        let mut f = form();
        f.handle_event(FormEvent::Blur("username".into()));
        f.handle_event(FormEvent::Focus("username".into()));
        assert_eq!(f.host().marker("username"), Marker::empty());
        assert_eq!(f.host().slot("error-username").map(|s| s.1), Some(false));
    }

    #[test]
    fn input_is_debounced() {
        let mut f = form();
        for (i, text) in ["a", "al", "ali"].into_iter().enumerate() {
            f.host_mut().type_value("username", text);
            f.handle_event(FormEvent::Input("username".into()));
            f.advance_time(ms(100));
            assert_eq!(f.tick().validations_fired, 0, "input {i}");
        }
        assert!(f.is_validation_pending("username"));
        f.advance_time(ms(400));
        assert_eq!(f.tick().validations_fired, 1);
        assert_eq!(f.stats().field_validations, 1);
        assert_eq!(f.host().marker("username"), Marker::SUCCESS);
    }

    #[test]
    fn email_controls_are_debounced_by_kind() {
        let mut f = form();
        f.handle_event(FormEvent::Input("email".into()));
        assert!(f.is_validation_pending("email"));
        f.handle_event(FormEvent::Input("nickname".into()));
        assert!(!f.is_validation_pending("nickname"));
    }

    #[test]
    fn password_input_scores_strength_without_debounce() {
        let mut f = form();
        f.host_mut().type_value("password", "Abcdef1!");
        f.handle_event(FormEvent::Input("password".into()));
        assert!(!f.is_validation_pending("password"));
        assert_eq!(
            f.host().strength.get("strength-password"),
            Some(&(
                "password-strength strong".to_string(),
                "Password strength: STRONG".to_string()
            ))
        );
        assert_eq!(
            f.score_strength("password").map(|r| r.tier),
            Some(StrengthTier::Strong)
        );
    }

    #[test]
    fn change_on_group_member_validates_group() {
        let mut f = form();
        f.host_mut().set_box("interests", "coding", true);
        f.host_mut().set_box("interests", "music", true);
        f.handle_event(FormEvent::Change("interests".into()));
        assert_eq!(
            f.host().slot("error-interests"),
            Some(&("pick one".to_string(), true))
        );
        assert_eq!(f.host().marker("interests"), Marker::empty());
    }

    #[test]
    fn change_on_plain_checkbox_is_noop() {
        let mut f = form();
        f.handle_event(FormEvent::Change("terms".into()));
        assert_eq!(f.stats().field_validations, 0);
        assert_eq!(f.stats().group_validations, 0);
    }

    #[test]
    fn invalid_submit_blocks_then_interaction_unblocks() {
        let mut f = form();
        f.handle_event(FormEvent::Submit);
        assert_eq!(f.phase(), SubmitPhase::Blocked);
        let report = f.last_report().unwrap();
        assert_eq!(
            report.failures,
            vec!["username", "password", "interests", "terms"]
        );
        assert_eq!(report.evaluated, 5);
        assert_eq!(f.host().submit_control, Some((true, "Create Account".into())));

        f.handle_event(FormEvent::Focus("username".into()));
        assert_eq!(f.phase(), SubmitPhase::Idle);
    }

    #[test]
    fn valid_submit_waits_for_delay() {
        let mut f = form();
        fill_valid(&mut f);
        f.handle_event(FormEvent::Submit);
        assert_eq!(f.phase(), SubmitPhase::Submitting);
        assert_eq!(
            f.host().submit_control,
            Some((false, "Creating Account...".into()))
        );

        f.advance_time(ms(999));
        assert!(!f.tick().submitted);
        assert_eq!(f.host().submissions, 0);

        f.advance_time(ms(1));
        assert!(f.tick().submitted);
        assert_eq!(f.host().submissions, 1);

        f.advance_time(ms(5000));
        f.tick();
        assert_eq!(f.host().submissions, 1);
    }

    #[test]
    fn second_submit_while_submitting_is_ignored() {
        let mut f = form();
        fill_valid(&mut f);
        f.handle_event(FormEvent::Submit);
        f.advance_time(ms(500));
        f.handle_event(FormEvent::Submit);
        assert_eq!(f.stats().form_validations, 1);
        f.advance_time(ms(500));
        f.tick();
        f.advance_time(ms(1000));
        f.tick();
        assert_eq!(f.host().submissions, 1);
    }

    #[test]
    fn step_drains_queue_then_fires_timers() {
        let mut f = form();
        f.push_event(FormEvent::Input("username".into()));
        f.push_event(FormEvent::Input("username".into()));
        f.advance_time(ms(500));
        let r = f.step();
        // Both inputs were scheduled at t=500, so nothing is due yet.
        assert_eq!(r.events_processed, 2);
        assert_eq!(r.validations_fired, 0);
        f.advance_time(ms(500));
        assert_eq!(f.step().validations_fired, 1);
    }

    #[test]
    fn autosave_runs_while_attached_only() {
        let mut f = form();
        f.host_mut().type_value("username", "alice");
        f.advance_time(ms(5000));
        assert!(f.step().autosaved);
        assert_eq!(f.session().captures(), 1);

        f.detach();
        f.advance_time(ms(20_000));
        assert!(!f.step().autosaved);
        assert_eq!(f.session().captures(), 1);
        assert_eq!(f.next_deadline(), None);
    }

    #[test]
    fn detach_drops_pending_validations() {
        let mut f = form();
        f.handle_event(FormEvent::Input("username".into()));
        f.detach();
        assert!(!f.is_validation_pending("username"));
        f.attach().unwrap();
        f.advance_time(ms(1000));
        assert_eq!(f.step().validations_fired, 0);
    }

    #[test]
    fn detach_hands_back_submit_control() {
        let mut f = form();
        fill_valid(&mut f);
        f.handle_event(FormEvent::Submit);
        assert_eq!(
            f.host().submit_control,
            Some((false, "Creating Account...".into()))
        );

        f.detach();
        assert_eq!(f.phase(), SubmitPhase::Idle);
        assert_eq!(f.host().submit_control, Some((true, "Create Account".into())));
        assert_eq!(f.next_deadline(), None);

        f.attach().unwrap();
        f.advance_time(ms(5000));
        f.step();
        assert_eq!(f.host().submissions, 0);
        f.handle_event(FormEvent::Submit);
        assert_eq!(f.phase(), SubmitPhase::Submitting);
        f.advance_time(ms(1000));
        assert!(f.tick().submitted);
        assert_eq!(f.host().submissions, 1);
    }

    #[test]
    fn detach_without_pending_submission_leaves_control_alone() {
        let config = FormConfig::default().with_submit_label("Sign up");
        let mut f = Form::with_clock(rules(), config, page(), ManualClock::new());
        f.attach().unwrap();
        f.detach();
        assert_eq!(f.host().submit_control, Some((true, "Create Account".into())));

        f.attach().unwrap();
        fill_valid(&mut f);
        f.handle_event(FormEvent::Submit);
        f.detach();
        assert_eq!(f.host().submit_control, Some((true, "Sign up".into())));
    }

    #[test]
    fn group_rule_without_members_fails_its_minimum() {
        let host = TestHost::new()
            .control("username", ControlKind::Text, "alice")
            .checked("terms", ControlKind::Checkbox, "on", true);
        let mut f = Form::with_clock(rules(), FormConfig::default(), host, ManualClock::new());
        f.attach().unwrap();
        f.handle_event(FormEvent::Submit);

        assert_eq!(f.phase(), SubmitPhase::Blocked);
        let report = f.last_report().unwrap();
        assert_eq!(report.failures, vec!["interests"]);
        assert_eq!(report.evaluated, 3);
        assert_eq!(f.host().submissions, 0);
    }

    #[test]
    fn optional_group_without_members_passes() {
        let rules = Arc::new(
            RuleSet::builder()
                .rule("tags", RuleDescriptor::new().checkbox_group(0, 3))
                .build()
                .unwrap(),
        );
        let host = TestHost::new().control("username", ControlKind::Text, "");
        let mut f = Form::with_clock(rules, FormConfig::default(), host, ManualClock::new());
        f.attach().unwrap();
        let report = f.validate_form();
        assert!(report.valid);
        assert_eq!(report.evaluated, 1);
    }

    #[test]
    fn next_deadline_is_earliest_timer() {
        let mut f = form();
        assert_eq!(f.next_deadline(), Some(ms(5000)));
        f.handle_event(FormEvent::Input("username".into()));
        assert_eq!(f.next_deadline(), Some(ms(500)));
    }

    #[test]
    fn unload_captures_and_restore_writes_back() {
        let mut f = form();
        f.host_mut().type_value("username", "alice");
        f.handle_event(FormEvent::Unload);
        f.host_mut().type_value("username", "mallory");
        f.restore();
        let view = FormView::capture(f.host());
        assert_eq!(
            view.field_value("username"),
            Some(formcheck_core::FieldValue::text("alice"))
        );
    }
}
