//! JSON input loading.
//!
//! Raw records are deserialized loosely and then converted into the
//! validated core types. Any invalid record aborts the load with an error
//! naming the record.
//!
//! Emotion predictions are replayed by entry text, so entries sharing a text
//! must also share the same prediction (or all have none).
//!
//! Entry bundle:
//!
//! ```json
//! {
//!   "entries": [
//!     {"id": "e1", "date": "2026-01-01", "text": "...",
//!      "emotion": {"emotions": {"joy": 0.7}, "top_emotions": ["joy"], "confidence": 0.7}}
//!   ],
//!   "themes": {"themes": [{"keywords": ["work"], "entry_indices": [0], "entry_count": 1, "percentage": 0.5}],
//!              "unclustered_count": 1}
//! }
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reflection_core::analyzers::{EmotionSignal, ThemeSummary};
use reflection_core::{ConceptRecord, EntrySample};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawBundle {
    entries: Vec<RawEntry>,
    #[serde(default)]
    themes: Option<ThemeSummary>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    id: String,
    date: NaiveDate,
    text: String,
    #[serde(default)]
    emotion: Option<EmotionSignal>,
}

#[derive(Debug, Deserialize)]
struct RawConcept {
    id: String,
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    subcategory: Option<String>,
    description: String,
    source_citation: String,
    #[serde(default)]
    source_year: Option<i32>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

/// A validated entry bundle with its upstream signals.
#[derive(Debug, Clone)]
pub struct EntryBundle {
    /// Entries in file order.
    pub entries: Vec<EntrySample>,
    /// Upstream emotion predictions, parallel to `entries`.
    pub emotions: Vec<Option<EmotionSignal>>,
    pub themes: Option<ThemeSummary>,
}

impl EntryBundle {
    /// Days between the earliest and latest entry (0 when empty).
    pub fn span_days(&self) -> i64 {
        let dates = self.entries.iter().map(EntrySample::date);
        match (dates.clone().min(), dates.max()) {
            (Some(start), Some(end)) => (end - start).num_days(),
            _ => 0,
        }
    }
}

pub fn load_bundle(path: &Path) -> Result<EntryBundle> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read entry bundle: {}", path.display()))?;
    parse_bundle(&content).with_context(|| format!("Invalid entry bundle: {}", path.display()))
}

pub fn parse_bundle(json: &str) -> Result<EntryBundle> {
    let raw: RawBundle = serde_json::from_str(json).context("Failed to parse entry bundle JSON")?;

    let mut entries: Vec<EntrySample> = Vec::with_capacity(raw.entries.len());
    let mut emotions: Vec<Option<EmotionSignal>> = Vec::with_capacity(raw.entries.len());
    let mut first_with_text: HashMap<String, usize> = HashMap::new();
    for (index, entry) in raw.entries.into_iter().enumerate() {
        let id = entry.id.clone();
        let sample = EntrySample::new(entry.id, entry.text, entry.date)
            .with_context(|| format!("entry {} ('{}')", index, id))?;

        if let Some(&earlier) = first_with_text.get(sample.text()) {
            if emotions[earlier] != entry.emotion {
                anyhow::bail!(
                    "entry {} ('{}') repeats the text of entry {} ('{}') with a different emotion prediction",
                    index,
                    id,
                    earlier,
                    entries[earlier].id()
                );
            }
        } else {
            first_with_text.insert(sample.text().to_string(), index);
        }

        entries.push(sample);
        emotions.push(entry.emotion);
    }

    if let Some(themes) = &raw.themes {
        for (i, cluster) in themes.themes.iter().enumerate() {
            if let Some(bad) = cluster.entry_indices.iter().find(|&&idx| idx >= entries.len()) {
                anyhow::bail!(
                    "theme {} references entry index {} but the bundle has {} entries",
                    i,
                    bad,
                    entries.len()
                );
            }
        }
    }

    Ok(EntryBundle {
        entries,
        emotions,
        themes: raw.themes,
    })
}

pub fn load_concepts(path: &Path) -> Result<Vec<ConceptRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read concepts file: {}", path.display()))?;
    parse_concepts(&content).with_context(|| format!("Invalid concepts file: {}", path.display()))
}

pub fn parse_concepts(json: &str) -> Result<Vec<ConceptRecord>> {
    let raw: Vec<RawConcept> = serde_json::from_str(json).context("Failed to parse concepts JSON")?;

    raw.into_iter()
        .enumerate()
        .map(|(index, c)| {
            let id = c.id.clone();
            let mut record = ConceptRecord::new(c.id, c.name, c.description, c.source_citation)
                .with_context(|| format!("concept {} ('{}')", index, id))?
                .with_category(c.category)
                .with_tags(c.tags);
            if let Some(sub) = c.subcategory {
                record = record.with_subcategory(sub);
            }
            if let Some(year) = c.source_year {
                record = record.with_year(year);
            }
            if let Some(embedding) = c.embedding {
                record = record.with_embedding(embedding);
            }
            Ok(record)
        })
        .collect()
}
