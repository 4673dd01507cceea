//! Lexicon-based linguistic analysis.
//!
//! A dependency-free implementation of the [`LinguisticAnalyzer`] contract.
//! Words are maximal runs of alphabetic characters, lowercased; sentences
//! end at `.`, `!` or `?`. Tense needs a part-of-speech tagger, so
//! [`LinguisticSignal::tense_distribution`] is always `None` here.

use anyhow::Result;
use async_trait::async_trait;
use reflection_core::analyzers::{Complexity, LinguisticAnalyzer, LinguisticSignal, PronounUsage};
use reflection_core::stats::round_to;

const FIRST_PERSON: &[&str] = &[
    "i", "me", "my", "mine", "myself", "we", "us", "our", "ours", "ourselves",
];
const SECOND_PERSON: &[&str] = &["you", "your", "yours", "yourself", "yourselves"];
const THIRD_PERSON: &[&str] = &[
    "he", "she", "it", "they", "him", "her", "them", "his", "hers", "its", "their", "theirs",
];

const HEDGING_WORDS: &[&str] = &[
    "might", "maybe", "perhaps", "possibly", "probably", "could", "would", "should", "seem",
    "seems", "appear", "appears", "guess", "think", "believe", "feel", "suppose", "somewhat",
    "slightly", "rather",
];
const CERTAINTY_WORDS: &[&str] = &[
    "definitely", "certainly", "absolutely", "always", "never", "must", "will", "know", "sure",
    "certain", "clearly", "obviously", "undoubtedly", "truly", "really", "completely", "totally",
    "exactly",
];
const EMOTION_WORDS: &[&str] = &[
    "happy", "sad", "angry", "afraid", "anxious", "excited", "frustrated", "grateful", "hopeful",
    "hopeless", "love", "hate", "fear", "joy", "worry", "stress", "stressed", "overwhelmed",
    "peaceful", "calm", "nervous", "confident", "insecure", "proud", "ashamed", "guilty",
];

/// Ratio multipliers that spread typical low frequencies over `0..=1`.
const CERTAINTY_SCALE: f64 = 10.0;
const INTENSITY_SCALE: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconLinguisticAnalyzer;

impl LexiconLinguisticAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous analysis; the trait method delegates here.
    pub fn analyze_text(&self, text: &str) -> LinguisticSignal {
        let words = words(text);
        if words.is_empty() {
            return LinguisticSignal::default();
        }
        let total = words.len() as f64;
        let ratio = |lexicon| share(&words, lexicon);

        let sentences = sentence_count(text);
        let letters: usize = words.iter().map(|w| w.chars().count()).sum();

        LinguisticSignal {
            pronoun_usage: PronounUsage {
                first_person: round_to(ratio(FIRST_PERSON), 4),
                second_person: round_to(ratio(SECOND_PERSON), 4),
                third_person: round_to(ratio(THIRD_PERSON), 4),
            },
            certainty_score: round_to((ratio(CERTAINTY_WORDS) * CERTAINTY_SCALE).min(1.0), 3),
            hedging_score: round_to((ratio(HEDGING_WORDS) * CERTAINTY_SCALE).min(1.0), 3),
            emotional_intensity: round_to((ratio(EMOTION_WORDS) * INTENSITY_SCALE).min(1.0), 3),
            tense_distribution: None,
            complexity: Complexity {
                word_count: total,
                sentence_count: sentences as f64,
                avg_sentence_length: if sentences > 0 {
                    total / sentences as f64
                } else {
                    0.0
                },
                avg_word_length: letters as f64 / total,
            },
        }
    }
}

#[async_trait]
impl LinguisticAnalyzer for LexiconLinguisticAnalyzer {
    async fn analyze(&self, text: &str) -> Result<LinguisticSignal> {
        Ok(self.analyze_text(text))
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn share(words: &[String], lexicon: &[&str]) -> f64 {
    let hits = words.iter().filter(|w| lexicon.contains(&w.as_str())).count();
    hits as f64 / words.len() as f64
}

/// Sentences that contain at least one letter.
fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| s.chars().any(char::is_alphabetic))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_all_zero() {
        let s = LexiconLinguisticAnalyzer::new().analyze_text("  123 ... ");
        assert_eq!(s, LinguisticSignal::default());
    }

    #[test]
    fn test_pronoun_ratios() {
        // 12 words: I, my, we (first), you (second), they (third)
        let s = LexiconLinguisticAnalyzer::new()
            .analyze_text("I think my team and we told you they were late today");
        assert_eq!(s.complexity.word_count, 12.0);
        assert_eq!(s.pronoun_usage.first_person, 0.25);
        assert_eq!(s.pronoun_usage.second_person, 0.0833);
        assert_eq!(s.pronoun_usage.third_person, 0.0833);
    }

    #[test]
    fn test_certainty_and_hedging_are_scaled_and_capped() {
        let a = LexiconLinguisticAnalyzer::new();
        let s = a.analyze_text("I definitely know this. Maybe not.");
        // 6 words, 2 certainty → min(0.333 * 10, 1)
        assert_eq!(s.certainty_score, 1.0);
        // 1 hedge → min(0.1667 * 10, 1)
        assert_eq!(s.hedging_score, 1.0);

        let long = format!("{} maybe", "word ".repeat(39));
        let s = a.analyze_text(&long);
        // 1 hedge in 40 words → 0.25
        assert_eq!(s.hedging_score, 0.25);
        assert_eq!(s.certainty_score, 0.0);
    }

    #[test]
    fn test_emotional_intensity() {
        let text = format!("{} happy", "word ".repeat(39));
        let s = LexiconLinguisticAnalyzer::new().analyze_text(&text);
        // 1 in 40 → 0.025 * 20
        assert_eq!(s.emotional_intensity, 0.5);
    }

    #[test]
    fn test_complexity() {
        let s = LexiconLinguisticAnalyzer::new().analyze_text("It rained. We stayed in! Why?");
        assert_eq!(s.complexity.sentence_count, 3.0);
        assert_eq!(s.complexity.word_count, 6.0);
        assert_eq!(s.complexity.avg_sentence_length, 2.0);
        assert_eq!(s.complexity.avg_word_length, 21.0 / 6.0);
        assert!(s.tense_distribution.is_none());
    }

    #[tokio::test]
    async fn test_trait_delegates() {
        let a = LexiconLinguisticAnalyzer::new();
        let s = a.analyze("I am sure.").await.unwrap();
        assert_eq!(s, a.analyze_text("I am sure."));
    }
}
