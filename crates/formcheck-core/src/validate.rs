#![forbid(unsafe_code)]

//! Pure field and group validators.
//!
//! [`evaluate`] runs the fixed priority chain for a single field; the first
//! failing check decides the verdict. [`evaluate_group`] checks the
//! cardinality of a checkbox group. Neither touches a host or a clock.

use std::fmt;

use crate::rules::{FieldType, RuleDescriptor};
use crate::value::{FieldLookup, FieldValue};

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

/// Which step of the chain produced a failing verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    Required,
    MinLength,
    MaxLength,
    Pattern,
    MinValue,
    MaxValue,
    Match,
    Unchecked,
    MinItems,
    MaxItems,
}

impl Check {
    /// Stable identifier for programmatic handling.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength => "too_short",
            Self::MaxLength => "too_long",
            Self::Pattern => "pattern",
            Self::MinValue => "too_small",
            Self::MaxValue => "too_large",
            Self::Match => "mismatch",
            Self::Unchecked => "unchecked",
            Self::MinItems => "too_few",
            Self::MaxItems => "too_many",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Outcome of evaluating one field or group.
///
/// The message is empty when the verdict is valid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Verdict {
    pub valid: bool,
    pub message: String,
    /// The failing check, `None` when valid.
    pub check: Option<Check>,
}

impl Verdict {
    /// A passing verdict.
    #[must_use]
    pub fn pass() -> Self {
        Self {
            valid: true,
            message: String::new(),
            check: None,
        }
    }

    /// A failing verdict.
    #[must_use]
    pub fn fail(check: Check, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            check: Some(check),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

// ---------------------------------------------------------------------------
// Field evaluation
// ---------------------------------------------------------------------------

/// Evaluate `value` for field `name` against `rule`.
///
/// The chain, first failure wins:
///
/// 1. `required` with an empty trimmed value.
/// 2. trimmed length below `min_length`.
/// 3. trimmed length above `max_length`.
/// 4. trimmed value not fully matching `pattern`.
/// 5. number fields with a non-empty value: the value is parsed with
///    leading-integer semantics and compared against `min` then `max`. An
///    unparseable value fails neither bound. Once entered, this step decides
///    the verdict.
///
///    A length or numeric bound of zero is treated as unset, so `number(0.0,
///    10.0)` accepts `-1`. Group bounds in [`evaluate_group`] have no such
///    exception.
/// 6. `match_field` resolving through `lookup` to a value that differs from
///    this one as entered, whitespace included.
///    An unresolved field passes.
/// 7. a required checkbox that is unchecked.
///
/// `name` only feeds the fallback message of step 1 when the rule carries
/// no message of its own.
pub fn evaluate<L>(name: &str, rule: &RuleDescriptor, value: &FieldValue, lookup: &L) -> Verdict
where
    L: FieldLookup + ?Sized,
{
    let text = value.trimmed();

    if rule.required && value.is_empty() {
        return Verdict::fail(
            Check::Required,
            rule.message_or(|| format!("{name} is required")),
        );
    }

    if let Some(text) = text {
        let len = text.chars().count();
        if let Some(min) = rule.min_length.filter(|&m| m != 0)
            && len < min
        {
            return Verdict::fail(
                Check::MinLength,
                rule.message_or(|| format!("Minimum {min} characters required")),
            );
        }
        if let Some(max) = rule.max_length.filter(|&m| m != 0)
            && len > max
        {
            return Verdict::fail(
                Check::MaxLength,
                rule.message_or(|| format!("Maximum {max} characters allowed")),
            );
        }
        if let Some(pattern) = &rule.pattern
            && !pattern.is_full_match(text)
        {
            return Verdict::fail(Check::Pattern, rule.message_or(|| "Invalid format".into()));
        }
        if rule.field_type == FieldType::Number && !text.is_empty() {
            return check_bounds(rule, parse_int_prefix(text));
        }
    }

    if let Some(other) = &rule.match_field
        && let Some(expected) = lookup.current_value(other)
        && !value.same_as(&expected)
    {
        return Verdict::fail(Check::Match, rule.message_or(|| "Fields do not match".into()));
    }

    if rule.field_type == FieldType::Checkbox && rule.required && !value.is_checked() {
        return Verdict::fail(
            Check::Unchecked,
            rule.message_or(|| "This field is required".into()),
        );
    }

    Verdict::pass()
}

fn check_bounds(rule: &RuleDescriptor, parsed: Option<f64>) -> Verdict {
    let Some(n) = parsed else {
        return Verdict::pass();
    };
    if let Some(min) = rule.min.filter(|&m| m != 0.0)
        && n < min
    {
        return Verdict::fail(
            Check::MinValue,
            rule.message_or(|| format!("Minimum value is {min}")),
        );
    }
    if let Some(max) = rule.max.filter(|&m| m != 0.0)
        && n > max
    {
        return Verdict::fail(
            Check::MaxValue,
            rule.message_or(|| format!("Maximum value is {max}")),
        );
    }
    Verdict::pass()
}

/// Parse the leading integer of `text`.
///
/// Leading whitespace and a single sign are accepted, followed by either a
/// `0x`/`0X` hexadecimal run or a decimal run. Parsing stops at the first
/// character outside the run; `"42abc"` is 42 and `"1.9"` is 1. Returns
/// `None` when no digit is found.
#[must_use]
pub fn parse_int_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = match s.get(..2) {
        Some("0x" | "0X") => (16, &s[2..]),
        _ => (10, s),
    };

    let mut acc: Option<f64> = None;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else { break };
        acc = Some(acc.unwrap_or(0.0) * f64::from(radix) + f64::from(d));
    }
    acc.map(|n| if negative { -n } else { n })
}

// ---------------------------------------------------------------------------
// Group evaluation
// ---------------------------------------------------------------------------

/// Evaluate the number of checked members of group `name` against `rule`.
///
/// Unset bounds are not checked.
pub fn evaluate_group(name: &str, rule: &RuleDescriptor, checked: usize) -> Verdict {
    if let Some(min) = rule.min_items
        && checked < min
    {
        return Verdict::fail(
            Check::MinItems,
            rule.message_or(|| format!("Select at least {min} option(s) for {name}")),
        );
    }
    if let Some(max) = rule.max_items
        && checked > max
    {
        return Verdict::fail(
            Check::MaxItems,
            rule.message_or(|| format!("Select at most {max} option(s) for {name}")),
        );
    }
    Verdict::pass()
}
