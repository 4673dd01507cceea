//! Concept catalogue listing (`pensieve concepts`).

use std::path::Path;

use anyhow::Result;
use reflection_core::ConceptRecord;

use crate::input;

/// Concepts matching an optional category and tag, compared case-insensitively.
pub fn filter_concepts<'a>(
    concepts: &'a [ConceptRecord],
    category: Option<&str>,
    tag: Option<&str>,
) -> Vec<&'a ConceptRecord> {
    concepts
        .iter()
        .filter(|c| category.map_or(true, |cat| c.category().eq_ignore_ascii_case(cat)))
        .filter(|c| tag.map_or(true, |t| c.tags().iter().any(|ct| ct.eq_ignore_ascii_case(t))))
        .collect()
}

pub fn run_concepts(path: &Path, category: Option<&str>, tag: Option<&str>) -> Result<()> {
    let concepts = input::load_concepts(path)?;
    let matches = filter_concepts(&concepts, category, tag);

    println!("{:<16} {:<28} {:<16} SOURCE", "ID", "NAME", "CATEGORY");
    for c in &matches {
        let category = match c.subcategory() {
            Some(sub) => format!("{}/{}", c.category(), sub),
            None => c.category().to_string(),
        };
        let source = match c.source_year() {
            Some(year) if !c.source_citation().contains(&year.to_string()) => {
                format!("{} ({})", c.source_citation(), year)
            }
            _ => c.source_citation().to_string(),
        };
        println!("{:<16} {:<28} {:<16} {}", c.id(), c.name(), category, source);
    }
    println!("{} of {} concepts", matches.len(), concepts.len());
    Ok(())
}
