//! TOML configuration.
//!
//! Every section is optional. A missing file is not an error for the CLI,
//! which falls back to [`Config::minimal`].
//!
//! ```toml
//! [eligibility]
//! min_entries = 3
//! min_span_days = 7
//! max_recent_reflections = 2
//!
//! [retrieval]
//! top_k = 2
//! description_tokens = 50
//! max_description_chars = 200
//!
//! [safety]
//! hedging_phrases = ["may suggest", "resembles"]
//! forbidden_patterns = ['\byou should\b']
//!
//! [logging]
//! filter = "warn"
//! ```

use anyhow::{Context, Result};
use reflection_core::eligibility::EligibilityGate;
use reflection_core::policy::{SafetyPolicy, DEFAULT_FORBIDDEN_PATTERNS, DEFAULT_HEDGING_PHRASES};
use reflection_core::retrieve::RetrievalParams;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub eligibility: EligibilityConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub safety: SafetyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EligibilityConfig {
    #[serde(default = "default_min_entries")]
    pub min_entries: usize,
    #[serde(default = "default_min_span_days")]
    pub min_span_days: i64,
    #[serde(default = "default_max_recent")]
    pub max_recent_reflections: usize,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            min_entries: default_min_entries(),
            min_span_days: default_min_span_days(),
            max_recent_reflections: default_max_recent(),
        }
    }
}

fn default_min_entries() -> usize {
    3
}
fn default_min_span_days() -> i64 {
    7
}
fn default_max_recent() -> usize {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_description_tokens")]
    pub description_tokens: usize,
    #[serde(default = "default_max_description_chars")]
    pub max_description_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            description_tokens: default_description_tokens(),
            max_description_chars: default_max_description_chars(),
        }
    }
}

fn default_top_k() -> usize {
    2
}
fn default_description_tokens() -> usize {
    50
}
fn default_max_description_chars() -> usize {
    200
}

/// Overrides for the built-in safety rule table.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SafetyConfig {
    #[serde(default)]
    pub hedging_phrases: Option<Vec<String>>,
    #[serde(default)]
    pub forbidden_patterns: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Config {
    /// All defaults, used when no config file is present.
    pub fn minimal() -> Self {
        Self::default()
    }

    pub fn gate(&self) -> EligibilityGate {
        EligibilityGate {
            min_entries: self.eligibility.min_entries,
            min_span_days: self.eligibility.min_span_days,
            max_recent: self.eligibility.max_recent_reflections,
        }
    }

    pub fn retrieval_params(&self) -> RetrievalParams {
        RetrievalParams {
            top_k: self.retrieval.top_k,
            description_tokens: self.retrieval.description_tokens,
            max_description_chars: self.retrieval.max_description_chars,
        }
    }

    /// The configured rule table, falling back per list to the built-ins.
    pub fn safety_policy(&self) -> Result<SafetyPolicy> {
        let forbidden: Vec<String> = match &self.safety.forbidden_patterns {
            Some(patterns) => patterns.clone(),
            None => DEFAULT_FORBIDDEN_PATTERNS.iter().map(|p| p.to_string()).collect(),
        };
        let hedging: Vec<String> = match &self.safety.hedging_phrases {
            Some(phrases) => phrases.clone(),
            None => DEFAULT_HEDGING_PHRASES.iter().map(|p| p.to_string()).collect(),
        };
        SafetyPolicy::new(&forbidden, &hedging).context("invalid [safety] rules")
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    // Validate eligibility
    if config.eligibility.min_entries == 0 {
        anyhow::bail!("eligibility.min_entries must be >= 1");
    }
    if config.eligibility.min_span_days < 0 {
        anyhow::bail!("eligibility.min_span_days must be >= 0");
    }
    if config.eligibility.max_recent_reflections == 0 {
        anyhow::bail!("eligibility.max_recent_reflections must be >= 1");
    }

    // Validate retrieval
    if config.retrieval.top_k == 0 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }
    if config.retrieval.description_tokens == 0 {
        anyhow::bail!("retrieval.description_tokens must be >= 1");
    }
    if config.retrieval.max_description_chars == 0 {
        anyhow::bail!("retrieval.max_description_chars must be >= 1");
    }

    // Validate safety
    if let Some(phrases) = &config.safety.hedging_phrases {
        if phrases.iter().all(|p| p.trim().is_empty()) {
            anyhow::bail!("safety.hedging_phrases must contain at least one phrase");
        }
    }
    config.safety_policy()?;

    if config.logging.filter.trim().is_empty() {
        anyhow::bail!("logging.filter must not be empty");
    }

    Ok(())
}
