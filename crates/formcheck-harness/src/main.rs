#![forbid(unsafe_code)]

//! Scripted registration session.
//!
//! Replays a typical sign-up against the in-memory registration page on a
//! manual clock: a too-short username, a blocked submit, corrections, and a
//! successful submission. Prints the page dump after each phase.
//!
//! # Running
//!
//! ```sh
//! cargo run -p formcheck-harness
//! FORMCHECK_LOG=debug cargo run -p formcheck-harness
//! FORMCHECK_LOG=debug FORMCHECK_SUBMIT_DELAY_MS=250 cargo run -p formcheck-harness -- --jsonl
//! ```
//!
//! `--jsonl` prints the host-call journal as JSON lines instead of dumps.

use std::process::ExitCode;
use std::time::Duration;

use formcheck_harness::MemoryPage;
use formcheck_harness::fixtures::{registration_page, registration_rules};
use formcheck_runtime::{FormConfig, FormEvent, FormOrchestrator, ManualClock, SubmitPhase};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "FORMCHECK_LOG";

type Form = FormOrchestrator<MemoryPage, ManualClock>;

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn type_into(form: &mut Form, field: &str, value: &str) {
    form.handle_event(FormEvent::Focus(field.into()));
    form.host_mut().type_value(field, value);
    form.handle_event(FormEvent::Input(field.into()));
}

fn leave(form: &mut Form, field: &str) {
    form.handle_event(FormEvent::Blur(field.into()));
}

fn wait(form: &mut Form, ms: u64) {
    form.advance_time(Duration::from_millis(ms));
    form.step();
}

fn report(form: &Form, title: &str, jsonl: bool) {
    if jsonl {
        return;
    }
    println!("== {title} ({:?}) ==", form.phase());
    print!("{}", form.host().dump());
    println!();
}

fn run(jsonl: bool) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = FormConfig::from_env_with_diagnostics();
    for error in &parsed.errors {
        warn!(%error, "ignoring configuration value");
    }
    let config = parsed.config;
    let submit_delay = config.submit_delay;

    let mut form = Form::with_clock(
        registration_rules()?,
        config,
        registration_page(),
        ManualClock::new(),
    );
    form.attach()?;

    type_into(&mut form, "username", "jd");
    wait(&mut form, 600);
    report(&form, "short username", jsonl);

    type_into(&mut form, "password", "Secur3!Pass");
    leave(&mut form, "password");
    form.handle_event(FormEvent::Submit);
    report(&form, "submit with missing fields", jsonl);

    type_into(&mut form, "username", "john_doe");
    type_into(&mut form, "email", "john@example.com");
    type_into(&mut form, "confirmPassword", "Secur3!Pass");
    wait(&mut form, 600);
    for (field, value) in [
        ("firstName", "John"),
        ("lastName", "Doe"),
        ("age", "30"),
        ("birthDate", "1994-05-06"),
        ("country", "us"),
    ] {
        type_into(&mut form, field, value);
        leave(&mut form, field);
    }
    form.host_mut().choose("gender", "male");
    for interest in ["coding", "travel"] {
        form.host_mut().check("interests", interest, true);
        form.handle_event(FormEvent::Change("interests".into()));
    }
    form.host_mut().check("terms", "on", true);
    form.handle_event(FormEvent::Change("terms".into()));

    form.handle_event(FormEvent::Submit);
    report(&form, "submit scheduled", jsonl);

    wait(&mut form, submit_delay.as_millis() as u64);
    form.handle_event(FormEvent::Unload);
    report(&form, "after delay", jsonl);

    let stats = form.stats();
    info!(
        field_validations = stats.field_validations,
        group_validations = stats.group_validations,
        form_validations = stats.form_validations,
        submissions = stats.submissions,
        "session finished"
    );

    if jsonl {
        print!("{}", form.host().journal_jsonl());
    }

    if form.phase() == SubmitPhase::Submitting && form.host().submissions() == 1 {
        Ok(())
    } else {
        Err("scripted session did not submit".into())
    }
}

fn main() -> ExitCode {
    init_logging();
    let jsonl = std::env::args().skip(1).any(|arg| arg == "--jsonl");
    match run(jsonl) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("formcheck-harness: {e}");
            ExitCode::FAILURE
        }
    }
}
