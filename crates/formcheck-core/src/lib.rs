#![forbid(unsafe_code)]

//! Rule-driven field validation.
//!
//! This crate holds the pure half of formcheck: rule descriptors and the
//! immutable [`RuleSet`], the field and group validators, and password
//! strength scoring. Nothing here talks to a host or reads a clock; see
//! `formcheck-runtime` for the event-driven side.
//!
//! # Example
//!
//! ```rust
//! use formcheck_core::{FieldValue, NoLookup, RuleSet, evaluate};
//!
//! let rules = RuleSet::registration().unwrap();
//! let verdict = evaluate(
//!     "username",
//!     rules.get("username").unwrap(),
//!     &FieldValue::text("ab"),
//!     &NoLookup,
//! );
//! assert!(!verdict.valid);
//! ```

pub mod rules;
pub mod strength;
pub mod validate;
pub mod value;

pub use rules::{FieldType, Pattern, RuleDescriptor, RuleError, RuleSet, RuleSetBuilder};
pub use strength::{StrengthCriteria, StrengthResult, StrengthTier, score};
pub use validate::{Check, Verdict, evaluate, evaluate_group, parse_int_prefix};
pub use value::{FieldLookup, FieldValue, NoLookup};
