//! Ad-hoc safety check of arbitrary text (`pensieve validate`).

use anyhow::Result;
use reflection_core::policy::{ConstraintValidator, Verdict};

use crate::config::Config;

pub fn check_text(config: &Config, text: &str) -> Result<Verdict> {
    let validator = ConstraintValidator::new(config.safety_policy()?);
    Ok(validator.check(text))
}

pub fn run_validate(config: &Config, text: &str) -> Result<()> {
    let verdict = check_text(config, text)?;
    if verdict.is_accepted() {
        println!("accepted");
    } else {
        println!("rejected");
        for v in &verdict.violations {
            println!("  - {}", v);
        }
    }
    Ok(())
}
