//! # Pensieve CLI (`pensieve`)
//!
//! Generates a hedged, concept-grounded reflection from a bundle of journal
//! entries, and exposes the individual pipeline checks for inspection.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pensieve reflect <bundle>` | Run the full pipeline and print the reflection |
//! | `pensieve eligibility` | Ask the eligibility gate about a hypothetical window |
//! | `pensieve trends <bundle>` | Print per-metric trends and rolling averages |
//! | `pensieve validate "<text>"` | Check text against the safety policy |
//! | `pensieve concepts` | List the concept catalogue |
//!
//! ## Examples
//!
//! ```bash
//! pensieve reflect demos/bundle.json --concepts demos/concepts.json --recent 1
//! pensieve reflect demos/bundle.json --concepts demos/concepts.json --json
//! pensieve eligibility --entries 3 --span-days 7 --recent 0
//! pensieve concepts --concepts demos/concepts.json --category psychology
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pensieve_reflect::{concepts, config, logging, reflect, trends, validate};

/// Pensieve reflection generator.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/pensieve.example.toml` for every option.
#[derive(Parser)]
#[command(
    name = "pensieve",
    about = "Grounded, hedge-language reflections over journal entries",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Built-in defaults are used when the file does not exist.
    #[arg(long, global = true, default_value = "./config/pensieve.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a reflection from an entry bundle.
    ///
    /// A rejected window prints the reason and still exits successfully.
    Reflect {
        /// Entry bundle JSON file.
        bundle: PathBuf,

        /// Concept catalogue JSON file.
        #[arg(long)]
        concepts: PathBuf,

        /// Reflections already generated in the rate-limit period.
        #[arg(long, default_value_t = 0)]
        recent: usize,

        /// Print the reflection as JSON (`null` when rejected).
        #[arg(long)]
        json: bool,
    },

    /// Check whether a window would pass the eligibility gate.
    Eligibility {
        /// Number of entries in the window.
        #[arg(long)]
        entries: usize,

        /// Days between the earliest and latest entry.
        #[arg(long)]
        span_days: i64,

        /// Reflections already generated in the rate-limit period.
        #[arg(long, default_value_t = 0)]
        recent: usize,
    },

    /// Print trends and rolling averages for an entry bundle.
    Trends {
        /// Entry bundle JSON file.
        bundle: PathBuf,

        /// Rolling average window in days.
        #[arg(long, default_value_t = 7)]
        window_days: i64,
    },

    /// Check text against the configured safety policy.
    Validate {
        /// Text to check.
        text: String,
    },

    /// List concepts from a catalogue.
    Concepts {
        /// Concept catalogue JSON file.
        #[arg(long)]
        concepts: PathBuf,

        /// Only concepts in this category.
        #[arg(long)]
        category: Option<String>,

        /// Only concepts carrying this tag.
        #[arg(long)]
        tag: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_or_default(&cli.config)?;
    logging::init(&cfg.logging);

    match cli.command {
        Commands::Reflect {
            bundle,
            concepts,
            recent,
            json,
        } => {
            reflect::run_reflect(&cfg, &bundle, &concepts, recent, json).await?;
        }
        Commands::Eligibility {
            entries,
            span_days,
            recent,
        } => {
            reflect::run_eligibility(&cfg, entries, span_days, recent);
        }
        Commands::Trends {
            bundle,
            window_days,
        } => {
            trends::run_trends(&bundle, window_days).await?;
        }
        Commands::Validate { text } => {
            validate::run_validate(&cfg, &text)?;
        }
        Commands::Concepts {
            concepts: path,
            category,
            tag,
        } => {
            concepts::run_concepts(&path, category.as_deref(), tag.as_deref())?;
        }
    }

    Ok(())
}
