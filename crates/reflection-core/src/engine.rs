//! The reflection pipeline state machine.
//!
//! ```text
//! Gathering → EligibilityCheck → {Reject | Analyzing} → TrendDetecting
//!   → Aggregating → Retrieving → {Reject | Scoring} → Composing
//!   → Validating → {Reject | Emit}
//! ```
//!
//! Every rejection is an `Ok` value. The only `Err` is [`InputError`], which
//! signals malformed input (for example a non-finite metric series built
//! outside [`analyze_window`]) rather than a negative outcome. Nothing is persisted on any path; storing an
//! emitted reflection and counting recent ones is the caller's job.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::PatternAggregator;
use crate::analyzers::{analyze_window, Analyzers, WindowAnalysis};
use crate::compose::ReflectionComposer;
use crate::confidence::ConfidenceScorer;
use crate::eligibility::{EligibilityGate, Ineligible};
use crate::error::Result;
use crate::models::{
    ConceptRecord, EntrySample, MetricType, PatternsDetected, ReflectionOutput, TemporalWindow,
};
use crate::policy::{ConstraintValidator, SafetyPolicy, Verdict};
use crate::retrieve::{ConceptRetriever, RetrievalParams};
use crate::trend::{MetricSeries, TrendDetector};

pub const MODEL_VERSION: &str = "reflection-v1.0.0";

/// Shown verbatim beneath every reflection.
pub const DISCLAIMER: &str = "This reflection is not medical advice. Pensieve does not diagnose \
or treat mental health conditions. If you're experiencing distress, please reach out to a \
mental health professional.";

/// Emotion probabilities tracked over time. Absent emotions count as 0.
pub const TRACKED_EMOTIONS: &[&str] = &["joy", "sadness", "anger", "fear", "love"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Gathering,
    EligibilityCheck,
    Analyzing,
    TrendDetecting,
    Aggregating,
    Retrieving,
    Scoring,
    Composing,
    Validating,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PipelineStage::Gathering => "gathering",
            PipelineStage::EligibilityCheck => "eligibility_check",
            PipelineStage::Analyzing => "analyzing",
            PipelineStage::TrendDetecting => "trend_detecting",
            PipelineStage::Aggregating => "aggregating",
            PipelineStage::Retrieving => "retrieving",
            PipelineStage::Scoring => "scoring",
            PipelineStage::Composing => "composing",
            PipelineStage::Validating => "validating",
        })
    }
}

/// Why no reflection was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    Ineligible(Ineligible),
    NoGroundingConcept,
    FailedValidation(Verdict),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Ineligible(Ineligible::InsufficientEntries { count, required }) => {
                write!(f, "only {} entries, at least {} required", count, required)
            }
            RejectReason::Ineligible(Ineligible::InsufficientSpan { days, required }) => {
                write!(f, "entries span {} days, at least {} required", days, required)
            }
            RejectReason::Ineligible(Ineligible::RateLimited { recent, limit }) => {
                write!(f, "{} recent reflections, limit is {}", recent, limit)
            }
            RejectReason::NoGroundingConcept => f.write_str("no concept matches the detected patterns"),
            RejectReason::FailedValidation(verdict) => {
                write!(f, "composed text failed validation: {}", verdict)
            }
        }
    }
}

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation {
    Emitted(Box<ReflectionOutput>),
    Rejected(RejectReason),
}

impl Generation {
    pub fn is_emitted(&self) -> bool {
        matches!(self, Generation::Emitted(_))
    }

    pub fn output(&self) -> Option<&ReflectionOutput> {
        match self {
            Generation::Emitted(out) => Some(out),
            Generation::Rejected(_) => None,
        }
    }

    pub fn into_output(self) -> Option<ReflectionOutput> {
        match self {
            Generation::Emitted(out) => Some(*out),
            Generation::Rejected(_) => None,
        }
    }

    pub fn reject_reason(&self) -> Option<&RejectReason> {
        match self {
            Generation::Emitted(_) => None,
            Generation::Rejected(reason) => Some(reason),
        }
    }
}

/// Orchestrates one reflection per call. Holds no mutable state.
pub struct ReflectionEngine {
    analyzers: Analyzers,
    gate: EligibilityGate,
    detector: TrendDetector,
    aggregator: PatternAggregator,
    retriever: ConceptRetriever,
    scorer: ConfidenceScorer,
    composer: ReflectionComposer,
    validator: ConstraintValidator,
}

impl ReflectionEngine {
    /// Engine with the built-in thresholds and safety policy.
    pub fn new(analyzers: Analyzers) -> Self {
        Self {
            analyzers,
            gate: EligibilityGate::default(),
            detector: TrendDetector::new(),
            aggregator: PatternAggregator::new(),
            retriever: ConceptRetriever::default(),
            scorer: ConfidenceScorer::new(),
            composer: ReflectionComposer::new(),
            validator: ConstraintValidator::default(),
        }
    }

    pub fn with_gate(mut self, gate: EligibilityGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_retrieval(mut self, params: RetrievalParams) -> Self {
        self.retriever = ConceptRetriever::new(params);
        self
    }

    pub fn with_policy(mut self, policy: SafetyPolicy) -> Self {
        self.validator = ConstraintValidator::new(policy);
        self
    }

    pub fn gate(&self) -> &EligibilityGate {
        &self.gate
    }

    pub fn should_generate(&self, entry_count: usize, span_days: i64, recent: usize) -> bool {
        self.gate.should_generate(entry_count, span_days, recent)
    }

    /// Run the full pipeline over `entries` (in caller order).
    pub async fn generate(
        &self,
        entries: &[EntrySample],
        concepts: &[ConceptRecord],
        recent_reflection_count: usize,
    ) -> Result<Generation> {
        stage(PipelineStage::Gathering);
        let dates: Vec<NaiveDate> = entries.iter().map(EntrySample::date).collect();
        let (start, end) = match (dates.iter().min(), dates.iter().max()) {
            (Some(s), Some(e)) => (*s, *e),
            _ => {
                let reason = Ineligible::InsufficientEntries {
                    count: 0,
                    required: self.gate.min_entries.max(1),
                };
                return Ok(reject(RejectReason::Ineligible(reason)));
            }
        };
        let span_days = (end - start).num_days();

        stage(PipelineStage::EligibilityCheck);
        if let Some(reason) = self.gate.check(entries.len(), span_days, recent_reflection_count) {
            return Ok(reject(RejectReason::Ineligible(reason)));
        }

        stage(PipelineStage::Analyzing);
        let analysis = analyze_window(&self.analyzers, entries).await;

        stage(PipelineStage::TrendDetecting);
        let series = metric_series(entries, &analysis)?;
        let window = self.detector.analyze(&dates, &series)?;

        stage(PipelineStage::Aggregating);
        let themes = analysis.theme_summary();
        let patterns = self.aggregator.summarize(
            analysis.emotions(),
            &themes,
            analysis.linguistics(),
            &window,
        );

        stage(PipelineStage::Retrieving);
        let references = self.retriever.retrieve(&patterns.query_text(), concepts);
        if references.is_empty() {
            return Ok(reject(RejectReason::NoGroundingConcept));
        }

        stage(PipelineStage::Scoring);
        let confidence = self.scorer.score(analysis.emotions(), &themes, Some(&window));

        stage(PipelineStage::Composing);
        let content = self
            .composer
            .compose(entries.len(), span_days, &patterns, &references);

        stage(PipelineStage::Validating);
        let verdict = self.validator.check(&content);
        if !verdict.is_accepted() {
            return Ok(reject(RejectReason::FailedValidation(verdict)));
        }

        let patterns_detected = PatternsDetected {
            temporal_trends: trend_names(&window),
            skipped_entries: analysis.skipped(),
            dominant_emotion: patterns.dominant_emotion,
            dominant_theme: patterns.dominant_theme,
            linguistic_trend: patterns.linguistic_trend,
            primary_trend: patterns.primary_trend,
        };

        let entry_ids = entries.iter().map(|e| e.id().to_string()).collect();
        let Some(output) = ReflectionOutput::new(
            content,
            entry_ids,
            (start, end),
            references,
            confidence,
            patterns_detected,
            DISCLAIMER,
            MODEL_VERSION,
        ) else {
            return Ok(reject(RejectReason::NoGroundingConcept));
        };

        tracing::info!(
            entries = entries.len(),
            concepts = output.concepts.len(),
            confidence = output.confidence_score,
            "reflection emitted"
        );
        Ok(Generation::Emitted(Box::new(output)))
    }
}

fn stage(stage: PipelineStage) {
    tracing::debug!(%stage, "pipeline stage");
}

fn reject(reason: RejectReason) -> Generation {
    tracing::info!(%reason, "reflection rejected");
    Generation::Rejected(reason)
}

fn trend_names(window: &TemporalWindow) -> Vec<String> {
    window.trends.iter().map(|t| t.metric_name.clone()).collect()
}

/// Build the tracked emotion and linguistic series.
///
/// Each series holds only entries whose collaborator call succeeded.
/// `analysis` must come from [`analyze_window`] over the same `entries`.
pub fn metric_series(entries: &[EntrySample], analysis: &WindowAnalysis) -> Result<Vec<MetricSeries>> {
    let mut series = Vec::with_capacity(TRACKED_EMOTIONS.len() + 2);

    let emotion_samples: Vec<_> = entries
        .iter()
        .zip(&analysis.entries)
        .filter_map(|(entry, a)| a.emotion.analyzed().map(|s| (entry.date(), s)))
        .collect();
    if !emotion_samples.is_empty() {
        let dates: Vec<NaiveDate> = emotion_samples.iter().map(|(d, _)| *d).collect();
        for &emotion in TRACKED_EMOTIONS {
            let values = emotion_samples
                .iter()
                .map(|(_, s)| s.probability(emotion).unwrap_or(0.0))
                .collect();
            series.push(MetricSeries::new(
                emotion,
                MetricType::Emotion,
                dates.clone(),
                values,
            )?);
        }
    }

    let linguistic_samples: Vec<_> = entries
        .iter()
        .zip(&analysis.entries)
        .filter_map(|(entry, a)| a.linguistic.analyzed().map(|s| (entry.date(), s)))
        .collect();
    if !linguistic_samples.is_empty() {
        let dates: Vec<NaiveDate> = linguistic_samples.iter().map(|(d, _)| *d).collect();
        series.push(MetricSeries::new(
            "first_person",
            MetricType::Linguistic,
            dates.clone(),
            linguistic_samples
                .iter()
                .map(|(_, s)| s.pronoun_usage.first_person)
                .collect(),
        )?);
        series.push(MetricSeries::new(
            "certainty",
            MetricType::Linguistic,
            dates,
            linguistic_samples
                .iter()
                .map(|(_, s)| s.certainty_score)
                .collect(),
        )?);
    }

    Ok(series)
}
