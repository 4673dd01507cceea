//! Keyword-overlap concept retrieval.
//!
//! # Scoring Algorithm
//!
//! 1. Query tokens: the lowercase, whitespace-split set of the pattern
//!    labels (emotion, theme, linguistic trend).
//! 2. Candidate tokens per concept: lowercase name tokens, the first
//!    `description_tokens` lowercase description tokens, and tag tokens.
//! 3. `score = |query ∩ candidate| / |query|`; zero-score concepts drop out.
//! 4. Sort by score (desc), stable on catalogue order.
//! 5. Truncate to `top_k`; cap relevance at 0.8 and descriptions at
//!    `max_description_chars` characters.
//!
//! An empty result means no concept grounds the reflection.

use std::collections::BTreeSet;

use crate::models::{ConceptRecord, ConceptReference, CONFIDENCE_CAP};

/// Retrieval tuning parameters, decoupled from application config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalParams {
    /// Maximum concepts to return.
    pub top_k: usize,
    /// Leading description tokens considered per concept.
    pub description_tokens: usize,
    /// Character limit for returned descriptions.
    pub max_description_chars: usize,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            top_k: 2,
            description_tokens: 50,
            max_description_chars: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConceptRetriever {
    params: RetrievalParams,
}

impl ConceptRetriever {
    pub fn new(params: RetrievalParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RetrievalParams {
        &self.params
    }

    /// Rank `concepts` against `query` and return the top matches.
    pub fn retrieve(&self, query: &str, concepts: &[ConceptRecord]) -> Vec<ConceptReference> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() || self.params.top_k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(&ConceptRecord, f64)> = concepts
            .iter()
            .filter_map(|c| {
                let score = self.score(&query_tokens, c);
                (score > 0.0).then_some((c, score))
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        scored
            .into_iter()
            .take(self.params.top_k)
            .map(|(c, score)| ConceptReference {
                id: c.id().to_string(),
                name: c.name().to_string(),
                description: truncate_chars(c.description(), self.params.max_description_chars),
                source: c.source_citation().to_string(),
                relevance_score: score.min(CONFIDENCE_CAP),
            })
            .collect()
    }

    /// Fraction of query tokens present in the concept's candidate tokens.
    pub fn score(&self, query_tokens: &BTreeSet<String>, concept: &ConceptRecord) -> f64 {
        if query_tokens.is_empty() {
            return 0.0;
        }
        let candidate = self.candidate_tokens(concept);
        let overlap = query_tokens.intersection(&candidate).count();
        overlap as f64 / query_tokens.len() as f64
    }

    fn candidate_tokens(&self, concept: &ConceptRecord) -> BTreeSet<String> {
        let mut tokens = tokenize(concept.name());
        tokens.extend(
            concept
                .description()
                .split_whitespace()
                .take(self.params.description_tokens)
                .map(str::to_lowercase),
        );
        // Tags match whole, never word by word.
        tokens.extend(concept.tags().iter().map(|t| t.to_lowercase()));
        tokens
    }
}

/// Lowercase whitespace tokenization into a set.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
