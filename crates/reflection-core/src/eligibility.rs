//! Entry-count, date-span, and rate gate evaluated before any analysis.

use serde::{Deserialize, Serialize};

/// Why a window was refused by [`EligibilityGate::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ineligible {
    InsufficientEntries { count: usize, required: usize },
    InsufficientSpan { days: i64, required: i64 },
    RateLimited { recent: usize, limit: usize },
}

/// Thresholds for generating a reflection. Fails closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityGate {
    pub min_entries: usize,
    pub min_span_days: i64,
    /// Reflections allowed in the trailing week; at this count the gate closes.
    pub max_recent: usize,
}

impl Default for EligibilityGate {
    fn default() -> Self {
        Self {
            min_entries: 3,
            min_span_days: 7,
            max_recent: 2,
        }
    }
}

impl EligibilityGate {
    pub fn should_generate(&self, entry_count: usize, span_days: i64, recent: usize) -> bool {
        self.check(entry_count, span_days, recent).is_none()
    }

    /// First failing condition, checked in the order count, span, rate.
    pub fn check(&self, entry_count: usize, span_days: i64, recent: usize) -> Option<Ineligible> {
        if entry_count < self.min_entries {
            return Some(Ineligible::InsufficientEntries {
                count: entry_count,
                required: self.min_entries,
            });
        }
        if span_days < self.min_span_days {
            return Some(Ineligible::InsufficientSpan {
                days: span_days,
                required: self.min_span_days,
            });
        }
        if recent >= self.max_recent {
            return Some(Ineligible::RateLimited {
                recent,
                limit: self.max_recent,
            });
        }
        None
    }
}
