//! Content-safety rule table and validator.
//!
//! A [`SafetyPolicy`] holds forbidden regular expressions and required
//! hedging phrases. The built-in table is [`SafetyPolicy::default`]; callers
//! may swap in their own via [`SafetyPolicy::new`].
//!
//! Validation never edits text. A failing [`Verdict`] means the composed
//! reflection is discarded as a whole.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::error::{InputError, Result};

pub const DEFAULT_HEDGING_PHRASES: &[&str] = &[
    "may suggest",
    "could indicate",
    "resembles",
    "appears to",
    "might reflect",
    "seems to show",
    "patterns that resemble",
    "which may relate to",
    "possibly connected to",
];

/// Imperatives, clinical terms, and second-person pathology assertions.
pub const DEFAULT_FORBIDDEN_PATTERNS: &[&str] = &[
    r"\byou should\b",
    r"\byou must\b",
    r"\byou need to\b",
    r"\bstop\b.*\bing\b",
    r"\bdiagnos",
    r"\bdepression\b",
    r"\banxiety disorder\b",
    r"\bbipolar\b",
    r"\bschizophren",
    r"\byou are experiencing\b",
    r"\byou have\b.*\bdisorder\b",
];

#[derive(Debug, Clone)]
pub struct SafetyPolicy {
    forbidden: Vec<Regex>,
    hedging: Vec<String>,
}

impl SafetyPolicy {
    /// Compile a rule table.
    ///
    /// Patterns are matched case-insensitively. Hedging phrases are stored
    /// lowercase; blank phrases are dropped and at least one must remain.
    pub fn new<P, H>(forbidden: P, hedging: H) -> Result<Self>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        H: IntoIterator,
        H::Item: AsRef<str>,
    {
        let forbidden = forbidden
            .into_iter()
            .map(|p| compile(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let hedging: Vec<String> = hedging
            .into_iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        if hedging.is_empty() {
            return Err(InputError::NoHedgingPhrases);
        }

        Ok(Self { forbidden, hedging })
    }

    pub fn forbidden_patterns(&self) -> impl Iterator<Item = &str> {
        self.forbidden.iter().map(Regex::as_str)
    }

    pub fn hedging_phrases(&self) -> &[String] {
        &self.hedging
    }
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FORBIDDEN_PATTERNS, DEFAULT_HEDGING_PHRASES)
            .expect("built-in safety rules compile")
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| InputError::InvalidForbiddenPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// A single reason text failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    Forbidden { pattern: String, matched: String },
    MissingHedge,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Forbidden { pattern, matched } => {
                write!(f, "forbidden pattern {} matched \"{}\"", pattern, matched)
            }
            Violation::MissingHedge => f.write_str("no hedging phrase present"),
        }
    }
}

/// Outcome of checking one text against a policy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Verdict {
    pub violations: Vec<Violation>,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_accepted() {
            return f.write_str("accepted");
        }
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConstraintValidator {
    policy: SafetyPolicy,
}

impl ConstraintValidator {
    pub fn new(policy: SafetyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SafetyPolicy {
        &self.policy
    }

    /// Report every forbidden match and a missing hedge, in rule order.
    pub fn check(&self, text: &str) -> Verdict {
        let mut violations: Vec<Violation> = self
            .policy
            .forbidden
            .iter()
            .filter_map(|re| {
                re.find(text).map(|m| Violation::Forbidden {
                    pattern: re.as_str().to_string(),
                    matched: m.as_str().to_string(),
                })
            })
            .collect();

        let lower = text.to_lowercase();
        if !self.policy.hedging.iter().any(|h| lower.contains(h.as_str())) {
            violations.push(Violation::MissingHedge);
        }

        Verdict { violations }
    }

    pub fn is_valid(&self, text: &str) -> bool {
        self.check(text).is_accepted()
    }
}
