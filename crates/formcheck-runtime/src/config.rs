#![forbid(unsafe_code)]

//! Runtime configuration.
//!
//! [`FormConfig::default`] carries the registration page's identifiers and
//! timings. Every value can be overridden with builder methods or, for the
//! timings and the submit labels, from the environment:
//!
//! | Variable | Field | Format |
//! |---|---|---|
//! | `FORMCHECK_DEBOUNCE_MS` | `debounce` | milliseconds |
//! | `FORMCHECK_AUTOSAVE_MS` | `autosave_interval` | milliseconds, `0` disables |
//! | `FORMCHECK_SUBMIT_DELAY_MS` | `submit_delay` | milliseconds |
//! | `FORMCHECK_BUSY_LABEL` | `busy_label` | non-empty text |
//! | `FORMCHECK_SUBMIT_LABEL` | `submit_label` | non-empty text |

use std::env;
use std::fmt;
use std::time::Duration;

const ENV_DEBOUNCE_MS: &str = "FORMCHECK_DEBOUNCE_MS";
const ENV_AUTOSAVE_MS: &str = "FORMCHECK_AUTOSAVE_MS";
const ENV_SUBMIT_DELAY_MS: &str = "FORMCHECK_SUBMIT_DELAY_MS";
const ENV_BUSY_LABEL: &str = "FORMCHECK_BUSY_LABEL";
const ENV_SUBMIT_LABEL: &str = "FORMCHECK_SUBMIT_LABEL";

/// Configuration for a [`FormOrchestrator`](crate::orchestrator::FormOrchestrator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    /// Id of the form container that must exist on attach.
    pub form_id: String,
    /// Id of the submit control.
    pub submit_id: String,
    /// Label of the submit control while it is enabled.
    pub submit_label: String,
    /// Label shown on the submit control while submitting.
    pub busy_label: String,
    /// Prefix of per-field feedback slots (`error-username`).
    pub slot_prefix: String,
    /// Prefix of the strength slot (`strength-password`).
    pub strength_prefix: String,
    /// Field whose input is scored for strength, if any.
    pub strength_field: Option<String>,
    /// Fields validated on input after `debounce`, in addition to every
    /// email control.
    pub debounced_fields: Vec<String>,
    /// Quiet window for debounced validation.
    pub debounce: Duration,
    /// Autosave period. Zero disables the recurring capture.
    pub autosave_interval: Duration,
    /// Delay between a successful validation and the real submission.
    pub submit_delay: Duration,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            form_id: "dynamicForm".into(),
            submit_id: "submitBtn".into(),
            submit_label: "Create Account".into(),
            busy_label: "Creating Account...".into(),
            slot_prefix: "error-".into(),
            strength_prefix: "strength-".into(),
            strength_field: Some("password".into()),
            debounced_fields: vec!["username".into(), "confirmPassword".into()],
            debounce: Duration::from_millis(500),
            autosave_interval: Duration::from_millis(5000),
            submit_delay: Duration::from_millis(1000),
        }
    }
}

impl FormConfig {
    #[must_use]
    pub fn with_form_id(mut self, id: impl Into<String>) -> Self {
        self.form_id = id.into();
        self
    }

    #[must_use]
    pub fn with_submit_id(mut self, id: impl Into<String>) -> Self {
        self.submit_id = id.into();
        self
    }

    #[must_use]
    pub fn with_submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = label.into();
        self
    }

    #[must_use]
    pub fn with_busy_label(mut self, label: impl Into<String>) -> Self {
        self.busy_label = label.into();
        self
    }

    #[must_use]
    pub fn with_slot_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.slot_prefix = prefix.into();
        self
    }

    /// Score `field` for strength, or disable scoring with `None`.
    #[must_use]
    pub fn with_strength_field(mut self, field: Option<&str>) -> Self {
        self.strength_field = field.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_debounced_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.debounced_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce = delay;
        self
    }

    #[must_use]
    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = interval;
        self
    }

    #[must_use]
    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    /// Slot id for a field's strength meter.
    #[must_use]
    pub fn strength_slot(&self, field: &str) -> String {
        format!("{}{field}", self.strength_prefix)
    }

    /// Whether `field` is one of the named debounced fields.
    #[must_use]
    pub fn is_debounced(&self, field: &str) -> bool {
        self.debounced_fields.iter().any(|f| f == field)
    }

    /// Defaults overridden from the process environment. Malformed values
    /// are ignored; use [`from_env_with_diagnostics`](Self::from_env_with_diagnostics)
    /// to see them.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with_diagnostics().config
    }

    #[must_use]
    pub fn from_env_with_diagnostics() -> FormConfigParse {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden through `get`, which maps a variable name to its
    /// value.
    #[must_use]
    pub fn from_lookup<F>(mut get: F) -> FormConfigParse
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut errors = Vec::new();

        let mut millis = |key: &'static str, field: &'static str, target: &mut Duration| {
            if let Some(value) = get(key) {
                match value.trim().parse::<u64>() {
                    Ok(ms) => *target = Duration::from_millis(ms),
                    Err(_) => errors.push(ConfigError::new(
                        field,
                        value,
                        "expected non-negative integer milliseconds",
                    )),
                }
            }
        };
        millis(ENV_DEBOUNCE_MS, "debounce", &mut config.debounce);
        millis(ENV_AUTOSAVE_MS, "autosave_interval", &mut config.autosave_interval);
        millis(ENV_SUBMIT_DELAY_MS, "submit_delay", &mut config.submit_delay);

        let mut label = |key: &'static str, field: &'static str, target: &mut String| {
            if let Some(value) = get(key) {
                if value.trim().is_empty() {
                    errors.push(ConfigError::new(field, value, "expected non-empty text"));
                } else {
                    *target = value;
                }
            }
        };
        label(ENV_SUBMIT_LABEL, "submit_label", &mut config.submit_label);
        label(ENV_BUSY_LABEL, "busy_label", &mut config.busy_label);

        FormConfigParse { config, errors }
    }
}

/// Outcome of reading configuration from the environment.
#[derive(Debug, Clone)]
pub struct FormConfigParse {
    pub config: FormConfig,
    pub errors: Vec<ConfigError>,
}

/// A configuration value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}
