//! Reflection generation from an entry bundle.
//!
//! Backs the `pensieve reflect` and `pensieve eligibility` commands. The
//! engine is assembled here from the config and the bundle's upstream
//! signals; the core never constructs its own collaborators.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use reflection_core::analyzers::Analyzers;
use reflection_core::{ConceptRecord, Generation, ReflectionEngine, ReflectionOutput};

use crate::config::Config;
use crate::input::{self, EntryBundle};
use crate::linguistic::LexiconLinguisticAnalyzer;
use crate::precomputed::{PrecomputedEmotionAnalyzer, PrecomputedThemeClusterer};

/// Collaborators for a bundle: replayed emotions and themes, lexicon linguistics.
pub fn analyzers_for(bundle: &EntryBundle) -> Analyzers {
    Analyzers {
        emotion: Arc::new(PrecomputedEmotionAnalyzer::from_bundle(bundle)),
        themes: Arc::new(PrecomputedThemeClusterer::from_bundle(bundle)),
        linguistic: Arc::new(LexiconLinguisticAnalyzer::new()),
    }
}

pub fn build_engine(config: &Config, bundle: &EntryBundle) -> Result<ReflectionEngine> {
    Ok(ReflectionEngine::new(analyzers_for(bundle))
        .with_gate(config.gate())
        .with_retrieval(config.retrieval_params())
        .with_policy(config.safety_policy()?))
}

/// Core generate function returning the terminal state (used by CLI and tests).
pub async fn generate_reflection(
    config: &Config,
    bundle: &EntryBundle,
    concepts: &[ConceptRecord],
    recent: usize,
) -> Result<Generation> {
    let engine = build_engine(config, bundle)?;
    let generation = engine.generate(&bundle.entries, concepts, recent).await?;
    Ok(generation)
}

pub async fn run_reflect(
    config: &Config,
    bundle_path: &Path,
    concepts_path: &Path,
    recent: usize,
    json: bool,
) -> Result<()> {
    let bundle = input::load_bundle(bundle_path)?;
    let concepts = input::load_concepts(concepts_path)?;
    tracing::debug!(
        entries = bundle.entries.len(),
        concepts = concepts.len(),
        "inputs loaded"
    );

    let generation = generate_reflection(config, &bundle, &concepts, recent).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&generation.output())?);
        return Ok(());
    }

    match generation {
        Generation::Emitted(output) => print_reflection(&output),
        Generation::Rejected(reason) => println!("No reflection available: {}", reason),
    }
    Ok(())
}

fn print_reflection(output: &ReflectionOutput) {
    println!("{}", output.content);
    println!();
    println!("Concepts:");
    for c in &output.concepts {
        println!("  - {} ({}) relevance {:.2}", c.name, c.source, c.relevance_score);
    }
    println!(
        "Confidence: {:.3} ({})",
        output.confidence_score,
        output.confidence_level().as_str()
    );
    println!(
        "Entries: {} ({} to {})",
        output.entry_ids.len(),
        output.date_range_start,
        output.date_range_end
    );
    if !output.patterns_detected.skipped_entries.is_empty() {
        println!(
            "Skipped analyses: {}",
            output.patterns_detected.skipped_entries.len()
        );
    }
    println!();
    println!("{}", output.disclaimer);
}

pub fn run_eligibility(config: &Config, entries: usize, span_days: i64, recent: usize) {
    match config.gate().check(entries, span_days, recent) {
        None => println!("eligible"),
        Some(reason) => println!(
            "not eligible: {}",
            reflection_core::RejectReason::Ineligible(reason)
        ),
    }
}
