//! Capped confidence scoring.
//!
//! Up to three components contribute, and the score is the plain mean of
//! whichever are present:
//!
//! | Component | Value |
//! |-----------|-------|
//! | emotion   | mean analyzer confidence across analyzed entries |
//! | theme     | `(1 - unclustered / total) × 0.8` when clusters exist |
//! | temporal  | mean trend confidence, excluding `insufficient_data` and NaN |
//!
//! With no component available the score is [`DEFAULT_CONFIDENCE`]. The
//! result never exceeds [`CONFIDENCE_CAP`] and is rounded to 3 decimals.

use crate::analyzers::{EmotionSignal, ThemeSummary};
use crate::models::{TemporalWindow, TrendDirection, CONFIDENCE_CAP};
use crate::stats;

/// Reported when no component could be computed.
pub const DEFAULT_CONFIDENCE: f64 = 0.3;

/// Scale applied to cluster coverage.
const THEME_WEIGHT: f64 = 0.8;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score<'a>(
        &self,
        emotions: impl IntoIterator<Item = &'a EmotionSignal>,
        themes: &ThemeSummary,
        window: Option<&TemporalWindow>,
    ) -> f64 {
        let components: Vec<f64> = [
            emotion_component(emotions),
            theme_component(themes),
            window.and_then(temporal_component),
        ]
        .into_iter()
        .flatten()
        .collect();

        if components.is_empty() {
            return DEFAULT_CONFIDENCE;
        }
        stats::round_to(stats::mean(&components).clamp(0.0, CONFIDENCE_CAP), 3)
    }
}

pub fn emotion_component<'a>(emotions: impl IntoIterator<Item = &'a EmotionSignal>) -> Option<f64> {
    let values: Vec<f64> = emotions
        .into_iter()
        .map(|e| e.confidence)
        .filter(|c| c.is_finite())
        .collect();
    (!values.is_empty()).then(|| stats::mean(&values))
}

pub fn theme_component(themes: &ThemeSummary) -> Option<f64> {
    if themes.themes.is_empty() {
        return None;
    }
    let clustered: usize = themes.themes.iter().map(|t| t.entry_count).sum();
    let total = clustered + themes.unclustered_count;
    if total == 0 {
        return None;
    }
    let coverage = 1.0 - themes.unclustered_count as f64 / total as f64;
    Some(coverage * THEME_WEIGHT)
}

pub fn temporal_component(window: &TemporalWindow) -> Option<f64> {
    let values: Vec<f64> = window
        .trends
        .iter()
        .filter(|t| t.direction != TrendDirection::InsufficientData)
        .map(|t| t.confidence)
        .filter(|c| !c.is_nan())
        .collect();
    (!values.is_empty()).then(|| stats::mean(&values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::ThemeCluster;
    use crate::models::{MetricType, Trend};
    use chrono::NaiveDate;

    fn emotion(confidence: f64) -> EmotionSignal {
        EmotionSignal::from_probabilities([("joy", 0.6)], confidence)
    }

    fn themes(counts: &[usize], unclustered: usize) -> ThemeSummary {
        ThemeSummary {
            themes: counts
                .iter()
                .map(|&c| ThemeCluster {
                    keywords: vec!["work".into()],
                    entry_indices: (0..c).collect(),
                    entry_count: c,
                    percentage: 0.0,
                })
                .collect(),
            unclustered_count: unclustered,
        }
    }

    fn window(confidences: &[(TrendDirection, f64)]) -> TemporalWindow {
        let d = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        TemporalWindow {
            window_start: d,
            window_end: d,
            data_points: 6,
            trends: confidences
                .iter()
                .map(|&(direction, confidence)| Trend {
                    metric_name: "joy".into(),
                    metric_type: MetricType::Emotion,
                    direction,
                    slope: 0.0,
                    confidence,
                    r_squared: 0.0,
                    period_days: None,
                })
                .collect(),
            model_version: "test".into(),
        }
    }

    #[test]
    fn test_default_when_nothing_available() {
        let s = ConfidenceScorer::new();
        let score = s.score(&Vec::<EmotionSignal>::new(), &ThemeSummary::default(), None);
        assert_eq!(score, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_mean_of_present_components() {
        let s = ConfidenceScorer::new();
        // emotion 0.6, theme (1 - 2/10) * 0.8 = 0.64
        let score = s.score(&[emotion(0.5), emotion(0.7)], &themes(&[5, 3], 2), None);
        assert!((score - 0.62).abs() < 1e-12);
    }

    #[test]
    fn test_temporal_excludes_insufficient_data() {
        let w = window(&[
            (TrendDirection::Increasing, 0.6),
            (TrendDirection::InsufficientData, 0.0),
            (TrendDirection::Stable, 0.2),
        ]);
        assert!((temporal_component(&w).unwrap() - 0.4).abs() < 1e-12);

        let only_missing = window(&[(TrendDirection::InsufficientData, 0.0)]);
        assert_eq!(temporal_component(&only_missing), None);
    }

    #[test]
    fn test_score_is_capped_and_rounded() {
        let s = ConfidenceScorer::new();
        let w = window(&[(TrendDirection::Cyclical, 0.95)]);
        let score = s.score(&[emotion(0.99)], &ThemeSummary::default(), Some(&w));
        assert_eq!(score, CONFIDENCE_CAP);

        let score = s.score(&[emotion(0.12345)], &ThemeSummary::default(), None);
        assert_eq!(score, 0.123);
    }

    #[test]
    fn test_theme_component_needs_clusters() {
        assert_eq!(theme_component(&themes(&[], 4)), None);
        assert_eq!(theme_component(&themes(&[0], 0)), None);
        assert!((theme_component(&themes(&[4], 0)).unwrap() - 0.8).abs() < 1e-12);
    }
}
