//! Core data models used throughout the reflection pipeline.
//!
//! Caller-supplied inputs ([`EntrySample`], [`ConceptRecord`]) are validated
//! on construction. Derived values ([`Trend`], [`TemporalWindow`],
//! [`ConceptReference`], [`ReflectionOutput`]) are produced fresh per
//! invocation and never mutated afterwards.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzers::SkippedAnalysis;
use crate::error::{InputError, Result};

/// Hard ceiling on every confidence and relevance value the pipeline reports.
pub const CONFIDENCE_CAP: f64 = 0.80;

/// A decrypted journal entry as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySample {
    id: String,
    text: String,
    date: NaiveDate,
}

impl EntrySample {
    /// Build a validated entry. Both `id` and `text` must be non-blank.
    pub fn new(id: impl Into<String>, text: impl Into<String>, date: NaiveDate) -> Result<Self> {
        let id = id.into();
        let text = text.into();
        if id.trim().is_empty() {
            return Err(InputError::EmptyEntryId);
        }
        if text.trim().is_empty() {
            return Err(InputError::EmptyEntryText { id });
        }
        Ok(Self { id, text, date })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// A psychological or philosophical concept available for citation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptRecord {
    id: String,
    name: String,
    category: String,
    subcategory: Option<String>,
    description: String,
    source_citation: String,
    source_year: Option<i32>,
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    embedding: Option<Vec<f32>>,
}

impl ConceptRecord {
    /// Build a validated concept. `name` must be non-blank.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        source_citation: impl Into<String>,
    ) -> Result<Self> {
        let id = id.into();
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InputError::EmptyConceptName { id });
        }
        Ok(Self {
            id,
            name,
            category: String::new(),
            subcategory: None,
            description: description.into(),
            source_citation: source_citation.into(),
            source_year: None,
            tags: Vec::new(),
            embedding: None,
        })
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.source_year = Some(year);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn source_citation(&self) -> &str {
        &self.source_citation
    }

    pub fn source_year(&self) -> Option<i32> {
        self.source_year
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }
}

/// Which family of signal a metric series was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Emotion,
    Linguistic,
    Theme,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Emotion => "emotion",
            MetricType::Linguistic => "linguistic",
            MetricType::Theme => "theme",
        }
    }
}

/// Direction of a detected trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    Cyclical,
    InsufficientData,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
            TrendDirection::Cyclical => "cyclical",
            TrendDirection::InsufficientData => "insufficient_data",
        }
    }

    /// True for directions that carry a reportable pattern.
    pub fn is_significant(&self) -> bool {
        !matches!(
            self,
            TrendDirection::Stable | TrendDirection::InsufficientData
        )
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected trend in one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trend {
    pub metric_name: String,
    pub metric_type: MetricType,
    pub direction: TrendDirection,
    /// Change per day (0 for cyclical and insufficient data).
    pub slope: f64,
    /// Statistical confidence in `[0, 0.8]`.
    pub confidence: f64,
    pub r_squared: f64,
    /// Cycle length, only set for [`TrendDirection::Cyclical`].
    pub period_days: Option<u32>,
}

/// Result of analysing every metric over one window of entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalWindow {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub data_points: usize,
    pub trends: Vec<Trend>,
    pub model_version: String,
}

/// A concept cited by a reflection, ranked against the derived query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptReference {
    pub id: String,
    pub name: String,
    /// At most 200 characters.
    pub description: String,
    pub source: String,
    /// Keyword overlap in `[0, 0.8]`.
    pub relevance_score: f64,
}

/// Patterns that informed a reflection, persisted alongside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternsDetected {
    pub dominant_emotion: String,
    pub dominant_theme: String,
    pub linguistic_trend: String,
    pub primary_trend: Option<String>,
    pub temporal_trends: Vec<String>,
    pub skipped_entries: Vec<SkippedAnalysis>,
}

/// Presentation bucket for a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Moderate,
    High,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            ConfidenceLevel::High
        } else if score > 0.5 {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Moderate => "moderate",
            ConfidenceLevel::High => "high",
        }
    }
}

/// A generated reflection with full metadata.
///
/// Only the engine constructs these, and never with an empty concept list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct ReflectionOutput {
    pub content: String,
    pub entry_ids: Vec<String>,
    pub date_range_start: NaiveDate,
    pub date_range_end: NaiveDate,
    pub concepts: Vec<ConceptReference>,
    pub confidence_score: f64,
    pub patterns_detected: PatternsDetected,
    /// Rendered verbatim to end users.
    pub disclaimer: String,
    pub model_version: String,
    pub generated_at: DateTime<Utc>,
}

impl ReflectionOutput {
    /// Returns `None` when `concepts` is empty: an ungrounded reflection
    /// cannot exist.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        content: String,
        entry_ids: Vec<String>,
        date_range: (NaiveDate, NaiveDate),
        concepts: Vec<ConceptReference>,
        confidence_score: f64,
        patterns_detected: PatternsDetected,
        disclaimer: &str,
        model_version: &str,
    ) -> Option<Self> {
        if concepts.is_empty() {
            return None;
        }
        Some(Self {
            content,
            entry_ids,
            date_range_start: date_range.0,
            date_range_end: date_range.1,
            concepts,
            confidence_score: confidence_score.clamp(0.0, CONFIDENCE_CAP),
            patterns_detected,
            disclaimer: disclaimer.to_string(),
            model_version: model_version.to_string(),
            generated_at: Utc::now(),
        })
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence_score)
    }
}
