//! Categorical pattern labels derived from per-entry signals.
//!
//! Each label has a fixed fallback so downstream retrieval and composition
//! always receive a phrase. Ties are broken by first occurrence in input
//! order, never by hash or completion order.

use serde::Serialize;

use crate::analyzers::{EmotionSignal, LinguisticSignal, ThemeCluster, ThemeSummary};
use crate::models::{TemporalWindow, Trend};
use crate::stats;

pub const FALLBACK_EMOTION: &str = "mixed feelings";
pub const FALLBACK_THEME_KEYWORDS: &str = "general themes";
pub const FALLBACK_NO_THEMES: &str = "various topics";
pub const FALLBACK_LINGUISTIC: &str = "consistent writing style";

/// Mean first-person pronoun ratio above which writing is self-focused.
pub const FIRST_PERSON_THRESHOLD: f64 = 0.08;
/// Mean certainty score above which writing is assertive.
pub const CERTAINTY_THRESHOLD: f64 = 0.5;

const SELF_ASSERTIVE: &str = "self-focused and assertive writing";
const SELF_TENTATIVE: &str = "self-reflective and tentative writing";
const OUTWARD: &str = "outward-focused writing";

/// The four labels consumed by retrieval and composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternSummary {
    pub dominant_emotion: String,
    pub dominant_theme: String,
    pub linguistic_trend: String,
    /// `"<metric> is <direction>"` for the strongest non-stable trend.
    pub primary_trend: Option<String>,
}

impl PatternSummary {
    /// Text the concept query is built from.
    pub fn query_text(&self) -> String {
        format!(
            "{} {} {}",
            self.dominant_emotion, self.dominant_theme, self.linguistic_trend
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PatternAggregator;

impl PatternAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize<'a>(
        &self,
        emotions: impl IntoIterator<Item = &'a EmotionSignal>,
        themes: &ThemeSummary,
        linguistics: impl IntoIterator<Item = &'a LinguisticSignal>,
        window: &TemporalWindow,
    ) -> PatternSummary {
        PatternSummary {
            dominant_emotion: dominant_emotion(emotions),
            dominant_theme: dominant_theme(themes),
            linguistic_trend: linguistic_trend(linguistics),
            primary_trend: primary_trend(window),
        }
    }
}

/// Most frequent per-entry top emotion; first seen wins a tie.
pub fn dominant_emotion<'a>(signals: impl IntoIterator<Item = &'a EmotionSignal>) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for name in signals.into_iter().filter_map(EmotionSignal::top_emotion) {
        match counts.iter_mut().find(|(n, _)| *n == name) {
            Some((_, c)) => *c += 1,
            None => counts.push((name, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (name, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name.to_string())
        .unwrap_or_else(|| FALLBACK_EMOTION.to_string())
}

/// Top two keywords of the largest cluster, joined with "and".
pub fn dominant_theme(summary: &ThemeSummary) -> String {
    let mut largest: Option<&ThemeCluster> = None;
    for theme in &summary.themes {
        if largest.map_or(true, |l| theme.entry_count > l.entry_count) {
            largest = Some(theme);
        }
    }
    match largest {
        None => FALLBACK_NO_THEMES.to_string(),
        Some(theme) if theme.keywords.is_empty() => FALLBACK_THEME_KEYWORDS.to_string(),
        Some(theme) => theme
            .keywords
            .iter()
            .take(2)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" and "),
    }
}

/// Classify writing style by mean first-person ratio and certainty.
pub fn linguistic_trend<'a>(signals: impl IntoIterator<Item = &'a LinguisticSignal>) -> String {
    let (first_person, certainty): (Vec<f64>, Vec<f64>) = signals
        .into_iter()
        .map(|s| (s.pronoun_usage.first_person, s.certainty_score))
        .unzip();

    if first_person.is_empty() {
        return FALLBACK_LINGUISTIC.to_string();
    }

    let label = if stats::mean(&first_person) > FIRST_PERSON_THRESHOLD {
        if stats::mean(&certainty) > CERTAINTY_THRESHOLD {
            SELF_ASSERTIVE
        } else {
            SELF_TENTATIVE
        }
    } else {
        OUTWARD
    };
    label.to_string()
}

/// Strongest trend that is neither stable nor short on data.
pub fn primary_trend(window: &TemporalWindow) -> Option<String> {
    let mut best: Option<&Trend> = None;
    for trend in window.trends.iter().filter(|t| t.direction.is_significant()) {
        if best.map_or(true, |b| trend.confidence > b.confidence) {
            best = Some(trend);
        }
    }
    best.map(|t| format!("{} is {}", t.metric_name, t.direction))
}
