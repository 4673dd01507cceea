//! Deterministic, hedged template composition.
//!
//! Output is plain prose with `**bold**` markers around concept names. The
//! same inputs always yield byte-identical text.

use crate::aggregate::PatternSummary;
use crate::models::ConceptReference;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReflectionComposer;

impl ReflectionComposer {
    pub fn new() -> Self {
        Self
    }

    /// Expand the reflection template.
    ///
    /// The citation clause is emitted only when `concepts` is non-empty; the
    /// engine never calls this without at least one grounding concept.
    pub fn compose(
        &self,
        entry_count: usize,
        span_days: i64,
        patterns: &PatternSummary,
        concepts: &[ConceptReference],
    ) -> String {
        let mut text = format!(
            "Over the past {} days across {} entries, your writing shows patterns that may suggest ",
            span_days, entry_count
        );

        match &patterns.primary_trend {
            Some(trend) => text.push_str(&format!("a period where {}. ", trend)),
            None => text.push_str(&format!(
                "themes of {} paired with {}. ",
                patterns.dominant_theme, patterns.dominant_emotion
            )),
        }

        if let Some(primary) = concepts.first() {
            text.push_str(&format!(
                "\n\nThis pattern resembles what researchers describe as **{}** ({}).",
                primary.name, primary.source
            ));
            let description = primary.description.trim();
            if !description.is_empty() {
                text.push(' ');
                text.push_str(description);
                if !description.ends_with('.') {
                    text.push('.');
                }
            }
        }

        if let Some(secondary) = concepts.get(1) {
            text.push_str(&format!(
                "\n\nYou might also find the concept of **{}** relevant, as it offers \
                 another lens for understanding these patterns.",
                secondary.name
            ));
        }

        text
    }
}
