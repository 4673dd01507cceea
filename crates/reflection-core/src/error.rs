//! Errors for malformed pipeline input.
//!
//! Only programming errors live here. Expected negative outcomes
//! (ineligible window, no grounding concept, failed validation) are
//! [`Generation::Rejected`](crate::engine::Generation::Rejected) values,
//! not errors.

use thiserror::Error;

/// Result alias for operations that validate their input.
pub type Result<T> = std::result::Result<T, InputError>;

/// Malformed input detected at a pipeline boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    /// Entry id was empty.
    #[error("entry id must not be empty")]
    EmptyEntryId,

    /// Entry text was empty or whitespace.
    #[error("entry '{id}' has empty text")]
    EmptyEntryText { id: String },

    /// Concept name was empty or whitespace.
    #[error("concept '{id}' has an empty name")]
    EmptyConceptName { id: String },

    /// Date and value sequences for a metric differ in length.
    #[error("metric '{metric}' has {values} values for {dates} dates")]
    LengthMismatch {
        metric: String,
        dates: usize,
        values: usize,
    },

    /// A metric value was NaN or infinite.
    #[error("metric '{metric}' has a non-finite value at index {index}")]
    NonFiniteValue { metric: String, index: usize },

    /// Trend analysis was asked to cover zero dates.
    #[error("temporal window requires at least one date")]
    EmptyWindow,

    /// Rolling-average window was not positive.
    #[error("rolling window must be at least one day, got {0}")]
    InvalidWindow(i64),

    /// A forbidden pattern failed to compile.
    #[error("invalid forbidden pattern '{pattern}': {reason}")]
    InvalidForbiddenPattern { pattern: String, reason: String },

    /// The safety policy had no hedging phrases.
    #[error("safety policy requires at least one non-empty hedging phrase")]
    NoHedgingPhrases,
}
