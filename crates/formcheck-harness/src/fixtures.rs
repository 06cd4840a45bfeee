#![forbid(unsafe_code)]

//! The account registration page and its rules.

use std::sync::Arc;

use formcheck_core::{RuleError, RuleSet};
use formcheck_runtime::{FormConfig, FormOrchestrator, ManualClock};

use crate::page::MemoryPage;

/// Interest options offered on the registration page.
pub const INTERESTS: [&str; 6] = ["coding", "music", "sports", "travel", "reading", "gaming"];

/// Gender options offered on the registration page.
pub const GENDERS: [&str; 3] = ["male", "female", "other"];

/// The registration page with every control empty and every slot hidden.
#[must_use]
pub fn registration_page() -> MemoryPage {
    let config = FormConfig::default();
    MemoryPage::new(config.form_id.as_str())
        .text("username")
        .email("email")
        .password("password")
        .password("confirmPassword")
        .text("firstName")
        .text("lastName")
        .number("age")
        .date("birthDate")
        .radio_group("gender", &GENDERS)
        .select("country")
        .checkbox_group("interests", &INTERESTS)
        .textarea("bio")
        .checkbox("terms")
        .feedback_slots(&config.slot_prefix)
        .strength_slot(&config.strength_slot("password"))
        .submit_control(&config.submit_id, &config.submit_label)
}

/// The registration rules, shared.
pub fn registration_rules() -> Result<Arc<RuleSet>, RuleError> {
    RuleSet::registration().map(Arc::new)
}

/// A detached orchestrator over a fresh registration page on a manual clock.
pub fn registration_form() -> Result<FormOrchestrator<MemoryPage, ManualClock>, RuleError> {
    Ok(FormOrchestrator::with_clock(
        registration_rules()?,
        FormConfig::default(),
        registration_page(),
        ManualClock::new(),
    ))
}

/// Fill every field with a value that passes its rule.
pub fn fill_valid(page: &mut MemoryPage) {
    page.type_value("username", "john_doe");
    page.type_value("email", "john@example.com");
    page.type_value("password", "Secur3!Pass");
    page.type_value("confirmPassword", "Secur3!Pass");
    page.type_value("firstName", "John");
    page.type_value("lastName", "Doe");
    page.type_value("age", "30");
    page.type_value("birthDate", "1994-05-06");
    page.choose("gender", "male");
    page.type_value("country", "us");
    page.check("interests", "coding", true);
    page.check("interests", "music", true);
    page.check("terms", "on", true);
}
