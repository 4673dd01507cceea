//! Collaborators that replay signals computed upstream.
//!
//! The emotion classifier and theme clusterer run outside this tool; their
//! results arrive in the entry bundle. These adapters serve them through the
//! analyzer traits so the engine cannot tell them from live models.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reflection_core::analyzers::{EmotionAnalyzer, EmotionSignal, ThemeClusterer, ThemeSummary};
use reflection_core::models::CONFIDENCE_CAP;

use crate::input::EntryBundle;

/// Emotion predictions keyed by entry text.
///
/// Text with no stored prediction is a failed call, which the engine records
/// as a skipped entry. Bundles are loaded only when entries sharing a text
/// also share a prediction, so each entry replays its own record.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedEmotionAnalyzer {
    predictions: HashMap<String, EmotionSignal>,
}

impl PrecomputedEmotionAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bundle(bundle: &EntryBundle) -> Self {
        let mut analyzer = Self::new();
        for (entry, emotion) in bundle.entries.iter().zip(&bundle.emotions) {
            if let Some(signal) = emotion {
                analyzer.insert(entry.text(), signal.clone());
            }
        }
        analyzer
    }

    pub fn insert(&mut self, text: impl Into<String>, mut signal: EmotionSignal) {
        signal.confidence = signal.confidence.clamp(0.0, CONFIDENCE_CAP);
        self.predictions.insert(text.into(), signal);
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

#[async_trait]
impl EmotionAnalyzer for PrecomputedEmotionAnalyzer {
    async fn predict(&self, text: &str) -> Result<EmotionSignal> {
        self.predictions
            .get(text)
            .cloned()
            .ok_or_else(|| anyhow!("no emotion prediction supplied for this entry"))
    }
}

/// Returns a fixed theme summary regardless of the texts passed in.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedThemeClusterer {
    summary: ThemeSummary,
}

impl PrecomputedThemeClusterer {
    pub fn new(summary: ThemeSummary) -> Self {
        Self { summary }
    }

    /// Missing themes mean no clusters.
    pub fn from_bundle(bundle: &EntryBundle) -> Self {
        Self::new(bundle.themes.clone().unwrap_or_default())
    }
}

#[async_trait]
impl ThemeClusterer for PrecomputedThemeClusterer {
    async fn detect_themes(&self, _texts: &[&str]) -> Result<ThemeSummary> {
        Ok(self.summary.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parse_bundle;

    const BUNDLE: &str = r#"{
        "entries": [
            {"id": "e1", "date": "2026-01-01", "text": "First.",
             "emotion": {"emotions": {"joy": 0.9}, "top_emotions": ["joy"], "confidence": 0.95}},
            {"id": "e2", "date": "2026-01-02", "text": "Second."}
        ]
    }"#;

    #[tokio::test]
    async fn test_emotion_replay_and_missing_prediction() {
        let bundle = parse_bundle(BUNDLE).unwrap();
        let analyzer = PrecomputedEmotionAnalyzer::from_bundle(&bundle);
        assert_eq!(analyzer.len(), 1);

        let signal = analyzer.predict("First.").await.unwrap();
        assert_eq!(signal.top_emotion(), Some("joy"));
        assert_eq!(signal.confidence, CONFIDENCE_CAP);

        assert!(analyzer.predict("Second.").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_themes_are_empty() {
        let bundle = parse_bundle(BUNDLE).unwrap();
        let clusterer = PrecomputedThemeClusterer::from_bundle(&bundle);
        let summary = clusterer.detect_themes(&["First.", "Second."]).await.unwrap();
        assert!(summary.themes.is_empty());
    }
}
