//! External analyzer contracts and per-entry analysis.
//!
//! The emotion classifier, theme clusterer, and linguistic parser are
//! collaborators with fixed I/O contracts. Implementations are constructed
//! by the application at startup and handed to the engine as an
//! [`Analyzers`] bundle; the core never creates or caches them.
//!
//! Every per-entry call produces an explicit [`Outcome`], so a failed call
//! is recorded as a [`SkippedAnalysis`] instead of silently disappearing.
//!
//! # Example
//!
//! ```rust
//! use anyhow::{anyhow, Result};
//! use async_trait::async_trait;
//! use reflection_core::analyzers::{EmotionAnalyzer, EmotionSignal};
//!
//! pub struct AlwaysCalm;
//!
//! #[async_trait]
//! impl EmotionAnalyzer for AlwaysCalm {
//!     async fn predict(&self, _text: &str) -> Result<EmotionSignal> {
//!         Ok(EmotionSignal::from_probabilities([("relief", 0.6)], 0.6))
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::models::{EntrySample, CONFIDENCE_CAP};

/// Minimum probability for an emotion to count as present.
pub const EMOTION_THRESHOLD: f64 = 0.25;

/// Maximum number of emotions reported in [`EmotionSignal::top_emotions`].
pub const MAX_TOP_EMOTIONS: usize = 5;

/// Emotion classifier output for a single text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionSignal {
    /// Emotion name to probability in `[0, 1]`.
    pub emotions: BTreeMap<String, f64>,
    /// At most five names, each at or above [`EMOTION_THRESHOLD`], descending.
    pub top_emotions: Vec<String>,
    /// Classifier confidence, at most 0.8.
    pub confidence: f64,
}

impl EmotionSignal {
    /// Build a signal from raw probabilities, deriving `top_emotions` the way
    /// the classifier contract requires. Ties keep the given order.
    pub fn from_probabilities<I, S>(probabilities: I, confidence: f64) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let ordered: Vec<(String, f64)> = probabilities
            .into_iter()
            .map(|(name, p)| (name.into(), p))
            .collect();

        let mut ranked: Vec<&(String, f64)> = ordered
            .iter()
            .filter(|(_, p)| *p >= EMOTION_THRESHOLD)
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let top_emotions = ranked
            .iter()
            .take(MAX_TOP_EMOTIONS)
            .map(|(name, _)| name.clone())
            .collect();

        Self {
            emotions: ordered.iter().cloned().collect(),
            top_emotions,
            confidence: confidence.clamp(0.0, CONFIDENCE_CAP),
        }
    }

    pub fn probability(&self, emotion: &str) -> Option<f64> {
        self.emotions.get(emotion).copied()
    }

    /// The single highest-probability emotion, if it clears the threshold.
    pub fn top_emotion(&self) -> Option<&str> {
        let name = self.top_emotions.first()?;
        match self.probability(name) {
            Some(p) if p < EMOTION_THRESHOLD => None,
            _ => Some(name.as_str()),
        }
    }

    /// First emotion whose probability is NaN or infinite.
    pub fn non_finite_field(&self) -> Option<&str> {
        self.emotions
            .iter()
            .find(|(_, p)| !p.is_finite())
            .map(|(name, _)| name.as_str())
    }
}

/// One cluster of thematically similar entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeCluster {
    /// Top TF-IDF keywords, at most three.
    pub keywords: Vec<String>,
    pub entry_indices: Vec<usize>,
    pub entry_count: usize,
    pub percentage: f64,
}

/// Theme clusterer output over a batch of texts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeSummary {
    pub themes: Vec<ThemeCluster>,
    pub unclustered_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PronounUsage {
    pub first_person: f64,
    pub second_person: f64,
    pub third_person: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TenseDistribution {
    pub past: f64,
    pub present: f64,
    pub future: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Complexity {
    pub word_count: f64,
    pub sentence_count: f64,
    pub avg_sentence_length: f64,
    pub avg_word_length: f64,
}

/// Linguistic parser output for a single text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinguisticSignal {
    pub pronoun_usage: PronounUsage,
    /// `0..=1`, higher means more certain language.
    pub certainty_score: f64,
    /// `0..=1`, higher means more hedging.
    pub hedging_score: f64,
    #[serde(default)]
    pub emotional_intensity: f64,
    /// Absent when the parser has no part-of-speech tagging.
    #[serde(default)]
    pub tense_distribution: Option<TenseDistribution>,
    #[serde(default)]
    pub complexity: Complexity,
}

impl LinguisticSignal {
    /// First score that is NaN or infinite.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("first_person", self.pronoun_usage.first_person),
            ("second_person", self.pronoun_usage.second_person),
            ("third_person", self.pronoun_usage.third_person),
            ("certainty_score", self.certainty_score),
            ("hedging_score", self.hedging_score),
            ("emotional_intensity", self.emotional_intensity),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }
}

/// Multi-label emotion classifier.
#[async_trait]
pub trait EmotionAnalyzer: Send + Sync {
    async fn predict(&self, text: &str) -> Result<EmotionSignal>;
}

/// Embedding-based theme clustering over a batch of texts.
///
/// Implementations need at least five texts to produce non-empty themes.
#[async_trait]
pub trait ThemeClusterer: Send + Sync {
    async fn detect_themes(&self, texts: &[&str]) -> Result<ThemeSummary>;
}

/// Writing-style metrics for a single text.
#[async_trait]
pub trait LinguisticAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<LinguisticSignal>;
}

/// The three collaborators, injected together into the engine.
#[derive(Clone)]
pub struct Analyzers {
    pub emotion: Arc<dyn EmotionAnalyzer>,
    pub themes: Arc<dyn ThemeClusterer>,
    pub linguistic: Arc<dyn LinguisticAnalyzer>,
}

/// Which collaborator a skipped call belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    Emotion,
    Theme,
    Linguistic,
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnalyzerKind::Emotion => "emotion",
            AnalyzerKind::Theme => "theme",
            AnalyzerKind::Linguistic => "linguistic",
        })
    }
}

/// Result of one collaborator call for one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Analyzed(T),
    Skipped { reason: String },
}

impl<T> Outcome<T> {
    pub fn analyzed(&self) -> Option<&T> {
        match self {
            Outcome::Analyzed(v) => Some(v),
            Outcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped { .. })
    }

    fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(v) => Outcome::Analyzed(v),
            Err(e) => Outcome::Skipped {
                reason: format!("{:#}", e),
            },
        }
    }
}

/// An entry whose collaborator call failed and was left out of aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAnalysis {
    pub entry_id: String,
    pub analyzer: AnalyzerKind,
}

/// Per-entry collaborator results, kept in input order.
#[derive(Debug, Clone)]
pub struct EntryAnalysis {
    pub entry_id: String,
    pub emotion: Outcome<EmotionSignal>,
    pub linguistic: Outcome<LinguisticSignal>,
}

/// Everything the collaborators produced for one window.
#[derive(Debug, Clone)]
pub struct WindowAnalysis {
    pub entries: Vec<EntryAnalysis>,
    pub themes: Outcome<ThemeSummary>,
}

impl WindowAnalysis {
    pub fn emotions(&self) -> impl Iterator<Item = &EmotionSignal> {
        self.entries.iter().filter_map(|e| e.emotion.analyzed())
    }

    pub fn linguistics(&self) -> impl Iterator<Item = &LinguisticSignal> {
        self.entries.iter().filter_map(|e| e.linguistic.analyzed())
    }

    /// Theme clusters, or an empty summary when clustering failed.
    pub fn theme_summary(&self) -> ThemeSummary {
        self.themes.analyzed().cloned().unwrap_or_default()
    }

    /// Every failed per-entry call, in input order (emotion before linguistic).
    pub fn skipped(&self) -> Vec<SkippedAnalysis> {
        let mut out = Vec::new();
        for e in &self.entries {
            if e.emotion.is_skipped() {
                out.push(SkippedAnalysis {
                    entry_id: e.entry_id.clone(),
                    analyzer: AnalyzerKind::Emotion,
                });
            }
            if e.linguistic.is_skipped() {
                out.push(SkippedAnalysis {
                    entry_id: e.entry_id.clone(),
                    analyzer: AnalyzerKind::Linguistic,
                });
            }
        }
        out
    }
}

/// Run every collaborator over the window.
///
/// Per-entry emotion and linguistic calls run concurrently; results are
/// reassembled in input order regardless of completion order. Failures are
/// recorded, never retried. A signal carrying a NaN or infinite score counts
/// as a failed call for that entry.
pub async fn analyze_window(analyzers: &Analyzers, entries: &[EntrySample]) -> WindowAnalysis {
    let texts: Vec<&str> = entries.iter().map(|e| e.text()).collect();

    let emotion_calls = join_all(texts.iter().map(|t| analyzers.emotion.predict(t)));
    let linguistic_calls = join_all(texts.iter().map(|t| analyzers.linguistic.analyze(t)));
    let theme_call = analyzers.themes.detect_themes(&texts);

    let (emotions, linguistics, themes) =
        futures::join!(emotion_calls, linguistic_calls, theme_call);

    let entries = entries
        .iter()
        .zip(emotions)
        .zip(linguistics)
        .map(|((entry, emotion), linguistic)| {
            let emotion = Outcome::from_result(emotion.and_then(|s| {
                match s.non_finite_field() {
                    Some(field) => Err(anyhow!("non-finite value for '{}'", field)),
                    None => Ok(s),
                }
            }));
            let linguistic = Outcome::from_result(linguistic.and_then(|s| {
                match s.non_finite_field() {
                    Some(field) => Err(anyhow!("non-finite value for '{}'", field)),
                    None => Ok(s),
                }
            }));
            for (kind, outcome) in [
                (AnalyzerKind::Emotion, skipped_reason(&emotion)),
                (AnalyzerKind::Linguistic, skipped_reason(&linguistic)),
            ] {
                if let Some(reason) = outcome {
                    tracing::warn!(entry_id = entry.id(), analyzer = %kind, %reason, "analysis skipped");
                }
            }
            EntryAnalysis {
                entry_id: entry.id().to_string(),
                emotion,
                linguistic,
            }
        })
        .collect();

    let themes = Outcome::from_result(themes);
    if let Some(reason) = skipped_reason(&themes) {
        tracing::warn!(analyzer = %AnalyzerKind::Theme, %reason, "theme clustering skipped");
    }

    WindowAnalysis { entries, themes }
}

fn skipped_reason<T>(outcome: &Outcome<T>) -> Option<&str> {
    match outcome {
        Outcome::Skipped { reason } => Some(reason.as_str()),
        Outcome::Analyzed(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use chrono::NaiveDate;

    struct FailOn(&'static str);

    #[async_trait]
    impl EmotionAnalyzer for FailOn {
        async fn predict(&self, text: &str) -> Result<EmotionSignal> {
            if text.contains(self.0) {
                bail!("classifier unavailable");
            }
            Ok(EmotionSignal::from_probabilities([("joy", 0.6)], 0.6))
        }
    }

    #[async_trait]
    impl LinguisticAnalyzer for FailOn {
        async fn analyze(&self, _text: &str) -> Result<LinguisticSignal> {
            Ok(LinguisticSignal::default())
        }
    }

    #[async_trait]
    impl ThemeClusterer for FailOn {
        async fn detect_themes(&self, _texts: &[&str]) -> Result<ThemeSummary> {
            bail!("clusterer offline")
        }
    }

    fn entry(id: &str, text: &str) -> EntrySample {
        EntrySample::new(id, text, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()).unwrap()
    }

    #[test]
    fn test_from_probabilities_filters_and_sorts() {
        let s = EmotionSignal::from_probabilities(
            [("fear", 0.3), ("joy", 0.9), ("anger", 0.1), ("love", 0.3)],
            0.95,
        );
        assert_eq!(s.top_emotions, vec!["joy", "fear", "love"]);
        assert_eq!(s.confidence, CONFIDENCE_CAP);
        assert_eq!(s.top_emotion(), Some("joy"));
    }

    #[tokio::test]
    async fn test_non_finite_signals_are_skipped() {
        struct NanScores;

        #[async_trait]
        impl EmotionAnalyzer for NanScores {
            async fn predict(&self, text: &str) -> Result<EmotionSignal> {
                let joy = if text.contains("odd") { f64::NAN } else { 0.6 };
                Ok(EmotionSignal::from_probabilities([("joy", joy)], 0.6))
            }
        }

        #[async_trait]
        impl LinguisticAnalyzer for NanScores {
            async fn analyze(&self, text: &str) -> Result<LinguisticSignal> {
                let mut signal = LinguisticSignal::default();
                if text.contains("odd") {
                    signal.certainty_score = f64::INFINITY;
                }
                Ok(signal)
            }
        }

        let analyzer = Arc::new(NanScores);
        let analyzers = Analyzers {
            emotion: analyzer.clone(),
            themes: Arc::new(FailOn("never")),
            linguistic: analyzer,
        };
        let entries = vec![entry("a", "fine day"), entry("b", "odd day")];

        let window = analyze_window(&analyzers, &entries).await;

        assert!(!window.entries[0].emotion.is_skipped());
        match &window.entries[1].emotion {
            Outcome::Skipped { reason } => assert!(reason.contains("'joy'"), "{}", reason),
            other => panic!("expected skip, got {:?}", other),
        }
        assert!(window.entries[1].linguistic.is_skipped());
        assert_eq!(window.skipped().len(), 2);
    }

    #[test]
    fn test_top_emotion_below_threshold_is_none() {
        let s = EmotionSignal {
            emotions: [("joy".to_string(), 0.1)].into_iter().collect(),
            top_emotions: vec!["joy".to_string()],
            confidence: 0.1,
        };
        assert_eq!(s.top_emotion(), None);
    }

    #[tokio::test]
    async fn test_analyze_window_records_failures_in_order() {
        let analyzer = Arc::new(FailOn("broken"));
        let analyzers = Analyzers {
            emotion: analyzer.clone(),
            themes: analyzer.clone(),
            linguistic: analyzer,
        };
        let entries = vec![entry("a", "fine day"), entry("b", "broken day"), entry("c", "ok")];

        let window = analyze_window(&analyzers, &entries).await;

        assert_eq!(window.entries.len(), 3);
        assert_eq!(window.entries[1].entry_id, "b");
        assert!(window.entries[1].emotion.is_skipped());
        assert_eq!(window.emotions().count(), 2);
        assert_eq!(window.linguistics().count(), 3);
        assert!(window.themes.is_skipped());
        assert_eq!(window.theme_summary(), ThemeSummary::default());
        assert_eq!(
            window.skipped(),
            vec![SkippedAnalysis {
                entry_id: "b".to_string(),
                analyzer: AnalyzerKind::Emotion
            }]
        );
    }
}
