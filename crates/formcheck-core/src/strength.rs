#![forbid(unsafe_code)]

//! Password strength scoring.

use std::fmt;

/// Coarse strength bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StrengthTier {
    Weak,
    Fair,
    Good,
    Strong,
}

impl StrengthTier {
    /// Bucket a raw score: ≤2 weak, 3 fair, 4 good, ≥5 strong.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            0..=2 => Self::Weak,
            3 => Self::Fair,
            4 => Self::Good,
            _ => Self::Strong,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Strong => "strong",
        }
    }
}

impl fmt::Display for StrengthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the six criteria a password meets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrengthCriteria {
    pub at_least_8: bool,
    pub at_least_12: bool,
    pub lowercase: bool,
    pub uppercase: bool,
    pub digit: bool,
    pub symbol: bool,
}

impl StrengthCriteria {
    /// Inspect `password`. Length is counted in characters.
    #[must_use]
    pub fn of(password: &str) -> Self {
        let len = password.chars().count();
        let mut criteria = Self {
            at_least_8: len >= 8,
            at_least_12: len >= 12,
            ..Self::default()
        };
        for c in password.chars() {
            match c {
                'a'..='z' => criteria.lowercase = true,
                'A'..='Z' => criteria.uppercase = true,
                '0'..='9' => criteria.digit = true,
                _ => criteria.symbol = true,
            }
        }
        criteria
    }

    /// Number of criteria met, `0..=6`.
    #[must_use]
    pub fn score(&self) -> u8 {
        [
            self.at_least_8,
            self.at_least_12,
            self.lowercase,
            self.uppercase,
            self.digit,
            self.symbol,
        ]
        .into_iter()
        .map(u8::from)
        .sum()
    }
}

/// Scored password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrengthResult {
    pub tier: StrengthTier,
    pub score: u8,
}

impl StrengthResult {
    /// CSS-style class list written to the strength slot.
    #[must_use]
    pub fn css_class(&self) -> String {
        format!("password-strength {}", self.tier)
    }

    /// Human-readable label, e.g. `Password strength: GOOD`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("Password strength: {}", self.tier.as_str().to_ascii_uppercase())
    }
}

/// Score a password against the six criteria.
#[must_use]
pub fn score(password: &str) -> StrengthResult {
    let score = StrengthCriteria::of(password).score();
    StrengthResult {
        tier: StrengthTier::from_score(score),
        score,
    }
}
