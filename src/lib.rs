//! # Pensieve Reflect
//!
//! Grounded reflection generation over a window of journal entries.
//!
//! The pipeline itself lives in the `reflection-core` crate. This crate
//! supplies everything around it: TOML configuration, JSON input loading,
//! collaborator adapters for upstream emotion and theme signals, a lexicon
//! linguistic analyzer, and the `pensieve` command-line front end.
//!
//! ## Architecture
//!
//! ```text
//! bundle.json ──▶ input ──▶ precomputed / linguistic ──▶ ReflectionEngine ──▶ stdout
//! concepts.json ─┘                                         ▲
//! pensieve.toml ──▶ config ────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! pensieve reflect demos/bundle.json --concepts demos/concepts.json
//! pensieve trends demos/bundle.json
//! pensieve validate "This may suggest a restless week."
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`input`] | Entry bundle and concept catalogue loading |
//! | [`precomputed`] | Replay of upstream emotion and theme signals |
//! | [`linguistic`] | Word-list linguistic analyzer |
//! | [`reflect`] | `reflect` and `eligibility` commands |
//! | [`trends`] | `trends` command |
//! | [`validate`] | `validate` command |
//! | [`concepts`] | `concepts` command |
//! | [`logging`] | Tracing subscriber setup |

pub mod concepts;
pub mod config;
pub mod input;
pub mod linguistic;
pub mod logging;
pub mod precomputed;
pub mod reflect;
pub mod trends;
pub mod validate;
