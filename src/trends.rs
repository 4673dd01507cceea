//! Trend report for an entry bundle (`pensieve trends`).
//!
//! Runs the same collaborators and metric extraction as reflection
//! generation, without the eligibility gate, and prints every metric's
//! trend alongside its trailing rolling average.

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use reflection_core::analyzers::analyze_window;
use reflection_core::engine::metric_series;
use reflection_core::models::TemporalWindow;
use reflection_core::trend::{rolling_average, TrendDetector};
use reflection_core::EntrySample;
use serde::Serialize;

use crate::input::{self, EntryBundle};
use crate::reflect::analyzers_for;

/// One metric's smoothed series.
#[derive(Debug, Clone, Serialize)]
pub struct SmoothedMetric {
    pub metric: String,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub window: TemporalWindow,
    pub rolling: Vec<SmoothedMetric>,
}

/// Core trend function returning structured data (used by CLI and tests).
pub async fn analyze_bundle(bundle: &EntryBundle, window_days: i64) -> Result<TrendReport> {
    if bundle.entries.is_empty() {
        anyhow::bail!("entry bundle has no entries");
    }
    let analyzers = analyzers_for(bundle);
    let analysis = analyze_window(&analyzers, &bundle.entries).await;
    let series = metric_series(&bundle.entries, &analysis)?;

    let dates: Vec<NaiveDate> = bundle.entries.iter().map(EntrySample::date).collect();
    let window = TrendDetector::new().analyze(&dates, &series)?;

    let rolling = series
        .iter()
        .map(|s| {
            Ok(SmoothedMetric {
                metric: s.name().to_string(),
                points: rolling_average(s.dates(), s.values(), window_days)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TrendReport { window, rolling })
}

pub async fn run_trends(bundle_path: &Path, window_days: i64) -> Result<()> {
    let bundle = input::load_bundle(bundle_path)?;
    let report = analyze_bundle(&bundle, window_days).await?;
    let window = &report.window;

    println!(
        "Window: {} to {} ({} entries, {})",
        window.window_start, window.window_end, window.data_points, window.model_version
    );
    println!();
    println!(
        "{:<14} {:<11} {:<18} {:>10} {:>6} {:>6} {:>7}",
        "METRIC", "TYPE", "DIRECTION", "SLOPE", "CONF", "R2", "PERIOD"
    );
    for t in &window.trends {
        let period = t
            .period_days
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<14} {:<11} {:<18} {:>10.6} {:>6.3} {:>6.3} {:>7}",
            t.metric_name,
            t.metric_type.as_str(),
            t.direction.as_str(),
            t.slope,
            t.confidence,
            t.r_squared,
            period
        );
    }

    println!();
    println!("Rolling average ({}-day):", window_days);
    for metric in &report.rolling {
        let points: Vec<String> = metric
            .points
            .iter()
            .map(|(d, v)| format!("{} {:.4}", d, v))
            .collect();
        println!("  {}: {}", metric.metric, points.join(", "));
    }

    Ok(())
}
