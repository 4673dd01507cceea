//! # Reflection Core
//!
//! Pure, deterministic logic for the reflection pipeline: data models,
//! temporal trend detection, pattern aggregation, concept retrieval,
//! confidence scoring, template composition, and content-safety validation.
//!
//! This crate contains no tokio runtime, filesystem I/O, or configuration
//! parsing. External collaborators (emotion classifier, theme clusterer,
//! linguistic parser) are consumed through the traits in [`analyzers`] and
//! injected into [`engine::ReflectionEngine`] at construction.
//!
//! ## Pipeline
//!
//! ```text
//! entries ──▶ eligibility ──▶ analyzers ──▶ trends ──▶ patterns
//!                 │                                       │
//!                 ▼                                       ▼
//!              Reject ◀──────── no concept ◀──────── retrieval
//!                 ▲                                       │
//!                 │                                       ▼
//!              failed ◀── validate ◀── compose ◀── confidence
//!                             │
//!                             ▼
//!                           Emit
//! ```
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Entries, concepts, trends, reflection output |
//! | [`error`] | Malformed-input errors |
//! | [`analyzers`] | Collaborator traits and per-entry analysis |
//! | [`stats`] | Regression, autocorrelation, Student-t p-values |
//! | [`trend`] | Per-metric trend and cycle detection |
//! | [`aggregate`] | Categorical pattern labels |
//! | [`retrieve`] | Keyword-overlap concept ranking |
//! | [`confidence`] | Capped confidence scoring |
//! | [`compose`] | Hedged template composition |
//! | [`policy`] | Swappable safety rule table and validator |
//! | [`eligibility`] | Entry-count, span, and rate gate |
//! | [`engine`] | Orchestrating state machine |

pub mod aggregate;
pub mod analyzers;
pub mod compose;
pub mod confidence;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod models;
pub mod policy;
pub mod retrieve;
pub mod stats;
pub mod trend;

pub use analyzers::Analyzers;
pub use engine::{Generation, ReflectionEngine, RejectReason, DISCLAIMER, MODEL_VERSION};
pub use error::InputError;
pub use models::{ConceptRecord, EntrySample, ReflectionOutput};
