#![forbid(unsafe_code)]

//! Rule descriptors and the immutable rule table.
//!
//! A [`RuleSet`] maps each validated field name to exactly one
//! [`RuleDescriptor`]. It is built once (in code via [`RuleSet::builder`], or
//! from JSON with the `json` feature) and then shared read-only, typically as
//! an `Arc<RuleSet>`.
//!
//! # Example
//!
//! ```rust
//! use formcheck_core::rules::{Pattern, RuleDescriptor, RuleSet};
//!
//! let rules = RuleSet::builder()
//!     .rule(
//!         "username",
//!         RuleDescriptor::new()
//!             .length(3, 20)
//!             .pattern(Pattern::new("[a-zA-Z0-9_]+").unwrap())
//!             .message("Username must be 3-20 characters"),
//!     )
//!     .rule("confirmPassword", RuleDescriptor::new().matches("password"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(rules.len(), 2);
//! assert_eq!(rules.dangling_references(), vec!["password"]);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use regex::Regex;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while constructing a rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// A pattern failed to compile.
    InvalidPattern {
        /// The pattern source as written.
        pattern: String,
        /// The compiler's explanation.
        reason: String,
    },
    /// The same field name was given two descriptors.
    DuplicateField(String),
    /// A `type` value that names no known field type.
    UnknownFieldType(String),
    /// Malformed JSON rule document.
    #[cfg(feature = "json")]
    Json(String),
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { pattern, reason } => {
                write!(f, "invalid pattern `{pattern}`: {reason}")
            }
            Self::DuplicateField(name) => write!(f, "duplicate rule for field `{name}`"),
            Self::UnknownFieldType(kind) => write!(f, "unknown field type `{kind}`"),
            #[cfg(feature = "json")]
            Self::Json(msg) => write!(f, "rule document error: {msg}"),
        }
    }
}

impl std::error::Error for RuleError {}

// ---------------------------------------------------------------------------
// FieldType
// ---------------------------------------------------------------------------

/// Which evaluation branch applies to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Date,
    Checkbox,
    CheckboxGroup,
}

impl FieldType {
    /// The identifier used in rule documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Checkbox => "checkbox",
            Self::CheckboxGroup => "checkbox-group",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            "date" => Ok(Self::Date),
            "checkbox" => Ok(Self::Checkbox),
            "checkbox-group" => Ok(Self::CheckboxGroup),
            other => Err(RuleError::UnknownFieldType(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// A compiled regular expression with full-string match semantics.
///
/// The source is anchored on both ends when compiled, so `[a-z]+` rejects
/// `"abc1"`. Sources that already carry `^`/`$` anchors compile to the same
/// language.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern.
    pub fn new(source: impl Into<String>) -> Result<Self, RuleError> {
        let source = source.into();
        let regex =
            Regex::new(&format!("^(?:{source})$")).map_err(|e| RuleError::InvalidPattern {
                pattern: source.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { source, regex })
    }

    /// The pattern as written.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns `true` if the whole of `value` matches.
    #[must_use]
    pub fn is_full_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

// ---------------------------------------------------------------------------
// RuleDescriptor
// ---------------------------------------------------------------------------

/// Configuration describing how to validate one field.
///
/// Every attribute is optional. Which ones are consulted depends on
/// `field_type`; see [`crate::validate::evaluate`] for the priority chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleDescriptor {
    /// The trimmed value must be non-empty.
    pub required: bool,
    /// Minimum trimmed length in characters. Zero means unset.
    pub min_length: Option<usize>,
    /// Maximum trimmed length in characters. Zero means unset.
    pub max_length: Option<usize>,
    /// Full-string pattern the trimmed value must match.
    pub pattern: Option<Pattern>,
    /// Evaluation branch.
    pub field_type: FieldType,
    /// Lower numeric bound (number fields only). Zero means unset.
    pub min: Option<f64>,
    /// Upper numeric bound (number fields only). Zero means unset.
    pub max: Option<f64>,
    /// Another field whose value this one must equal.
    pub match_field: Option<String>,
    /// Minimum checked members (checkbox groups only). Zero is a real bound.
    pub min_items: Option<usize>,
    /// Maximum checked members (checkbox groups only).
    pub max_items: Option<usize>,
    /// The single message shown whichever check fails.
    pub message: Option<String>,
}

impl RuleDescriptor {
    /// An empty descriptor: a text field that always passes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Set both length bounds.
    #[must_use]
    pub fn length(self, min: usize, max: usize) -> Self {
        self.min_length(min).max_length(max)
    }

    #[must_use]
    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    #[must_use]
    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// A number field bounded to `min..=max`.
    #[must_use]
    pub fn number(mut self, min: f64, max: f64) -> Self {
        self.field_type = FieldType::Number;
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// A single checkbox. Combine with [`required`](Self::required) to demand
    /// that it be checked.
    #[must_use]
    pub fn checkbox(mut self) -> Self {
        self.field_type = FieldType::Checkbox;
        self
    }

    /// A checkbox group accepting `min..=max` checked members.
    #[must_use]
    pub fn checkbox_group(mut self, min: usize, max: usize) -> Self {
        self.field_type = FieldType::CheckboxGroup;
        self.min_items = Some(min);
        self.max_items = Some(max);
        self
    }

    /// Require equality with another field's current value.
    #[must_use]
    pub fn matches(mut self, field: impl Into<String>) -> Self {
        self.match_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns `true` for checkbox-group descriptors.
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.field_type == FieldType::CheckboxGroup
    }

    /// The configured message, or `fallback` when none is set.
    pub(crate) fn message_or(&self, fallback: impl FnOnce() -> String) -> String {
        self.message.clone().unwrap_or_else(fallback)
    }
}

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

/// Immutable mapping from field name to rule descriptor.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    order: Vec<String>,
    rules: HashMap<String, RuleDescriptor>,
}

impl RuleSet {
    /// Start building a rule set.
    #[must_use]
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::default()
    }

    /// The descriptor for `field`, if one exists.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&RuleDescriptor> {
        self.rules.get(field)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.rules.contains_key(field)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate `(field, descriptor)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleDescriptor)> {
        self.order
            .iter()
            .filter_map(|name| self.rules.get(name).map(|rule| (name.as_str(), rule)))
    }

    /// `match_field` targets that have no descriptor of their own.
    ///
    /// Such references are legal: the relational check passes silently
    /// whenever the host cannot resolve the field. This is a diagnostic only.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<&str> {
        let mut dangling: Vec<&str> = self
            .iter()
            .filter_map(|(_, rule)| rule.match_field.as_deref())
            .filter(|target| !self.contains(target))
            .collect();
        dangling.dedup();
        dangling
    }

    /// The account registration rules.
    pub fn registration() -> Result<Self, RuleError> {
        Self::builder()
            .rule(
                "username",
                RuleDescriptor::new()
                    .length(3, 20)
                    .pattern(Pattern::new("^[a-zA-Z0-9_]+$")?)
                    .message("Username must be 3-20 characters, alphanumeric and underscore only"),
            )
            .rule(
                "email",
                RuleDescriptor::new()
                    .pattern(Pattern::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")?)
                    .message("Please enter a valid email address"),
            )
            .rule(
                "password",
                RuleDescriptor::new()
                    .min_length(8)
                    .message("Password must be at least 8 characters long"),
            )
            .rule(
                "confirmPassword",
                RuleDescriptor::new()
                    .matches("password")
                    .message("Passwords do not match"),
            )
            .rule(
                "firstName",
                RuleDescriptor::new()
                    .length(1, 50)
                    .message("First name is required and must be 1-50 characters"),
            )
            .rule(
                "lastName",
                RuleDescriptor::new()
                    .length(1, 50)
                    .message("Last name is required and must be 1-50 characters"),
            )
            .rule(
                "age",
                RuleDescriptor::new()
                    .number(13.0, 80.0)
                    .message("Age must be between 13 and 80"),
            )
            .rule(
                "birthDate",
                RuleDescriptor::new()
                    .field_type(FieldType::Date)
                    .message("Please enter a valid birth date"),
            )
            .rule(
                "country",
                RuleDescriptor::new()
                    .required()
                    .message("Please select your country"),
            )
            .rule(
                "interests",
                RuleDescriptor::new()
                    .checkbox_group(1, 5)
                    .message("Please select 1-5 interests"),
            )
            .rule(
                "terms",
                RuleDescriptor::new()
                    .required()
                    .checkbox()
                    .message("You must accept the terms and conditions"),
            )
            .build()
    }
}

/// Builder for [`RuleSet`].
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    set: RuleSet,
    duplicate: Option<String>,
}

impl RuleSetBuilder {
    /// Add the descriptor for `field`.
    ///
    /// A second descriptor for the same field is reported by [`build`](Self::build).
    #[must_use]
    pub fn rule(mut self, field: impl Into<String>, rule: RuleDescriptor) -> Self {
        let field = field.into();
        if self.set.rules.contains_key(&field) {
            self.duplicate.get_or_insert(field);
            return self;
        }
        self.set.order.push(field.clone());
        self.set.rules.insert(field, rule);
        self
    }

    /// Finish the rule set.
    pub fn build(self) -> Result<RuleSet, RuleError> {
        match self.duplicate {
            Some(field) => Err(RuleError::DuplicateField(field)),
            None => Ok(self.set),
        }
    }
}

// ---------------------------------------------------------------------------
// JSON documents (feature `json`)
// ---------------------------------------------------------------------------

#[cfg(feature = "json")]
mod json {
    use super::{FieldType, Pattern, RuleDescriptor, RuleError, RuleSet};
    use serde::Deserialize;

    /// One descriptor as written in a rule document.
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase", deny_unknown_fields)]
    struct RawRule {
        #[serde(default)]
        required: bool,
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<String>,
        #[serde(rename = "type")]
        field_type: Option<String>,
        min: Option<f64>,
        max: Option<f64>,
        match_field: Option<String>,
        min_items: Option<usize>,
        max_items: Option<usize>,
        message: Option<String>,
    }

    impl RawRule {
        fn into_descriptor(self) -> Result<RuleDescriptor, RuleError> {
            let field_type = match self.field_type.as_deref() {
                Some(kind) => kind.parse::<FieldType>()?,
                None => FieldType::Text,
            };
            let pattern = self.pattern.map(Pattern::new).transpose()?;
            Ok(RuleDescriptor {
                required: self.required,
                min_length: self.min_length,
                max_length: self.max_length,
                pattern,
                field_type,
                min: self.min,
                max: self.max,
                match_field: self.match_field,
                min_items: self.min_items,
                max_items: self.max_items,
                message: self.message,
            })
        }
    }

    impl RuleSet {
        /// Parse a rule document: a JSON object keyed by field name.
        ///
        /// Keys use the camelCase spelling (`minLength`, `matchField`, ...) and
        /// `type` takes the kebab-case field type (`"checkbox-group"`). Rules are
        /// registered in the map order `serde_json` yields: sorted by key unless
        /// its `preserve_order` feature is on.
        pub fn from_json(document: &str) -> Result<Self, RuleError> {
            let raw: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(document).map_err(|e| RuleError::Json(e.to_string()))?;
            let mut builder = RuleSet::builder();
            for (field, value) in raw {
                let rule: RawRule = serde_json::from_value(value)
                    .map_err(|e| RuleError::Json(format!("{field}: {e}")))?;
                builder = builder.rule(field, rule.into_descriptor()?);
            }
            builder.build()
        }
    }
}
