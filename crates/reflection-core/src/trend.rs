//! Temporal trend detection over per-metric time series.
//!
//! Each metric is analysed independently:
//!
//! 1. Fewer than five samples → `insufficient_data`.
//! 2. **Cycle check** (series of at least 28 samples): z-score the values,
//!    compute normalized autocorrelation, and scan lags 5..=14 for a local
//!    maximum above 0.4. A hit is reported as `cyclical` with that period.
//! 3. Otherwise, **least-squares regression** of value against day offset
//!    from the first date. `p > 0.1` is `stable`; a significant slope beyond
//!    ±0.005 per day is `increasing`/`decreasing`; anything else is `stable`.
//!
//! Confidence is `1 - p` for regression trends and a fixed 0.7 for cycles,
//! always capped at 0.8. The detector never predicts future values.

use chrono::{Duration, NaiveDate};

use crate::error::{InputError, Result};
use crate::models::{MetricType, TemporalWindow, Trend, TrendDirection, CONFIDENCE_CAP};
use crate::stats;

pub const TEMPORAL_MODEL_VERSION: &str = "temporal-v1.0.0";

/// Minimum samples for any trend call.
pub const MIN_DATA_POINTS: usize = 5;
/// p-value above which a slope is treated as noise.
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.1;
/// Minimum absolute slope (per day) for a directional trend.
pub const SLOPE_THRESHOLD: f64 = 0.005;
/// Autocorrelation a lag must exceed to count as a cycle.
pub const CYCLE_CORRELATION_THRESHOLD: f64 = 0.4;
pub const MIN_PERIOD_DAYS: usize = 5;
pub const MAX_PERIOD_DAYS: usize = 14;
/// Confidence reported for every detected cycle.
pub const CYCLE_CONFIDENCE: f64 = 0.7;

/// One named metric sampled on a set of dates.
///
/// Samples are held in chronological order (stable for equal dates), so
/// callers may supply them in any order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    name: String,
    metric_type: MetricType,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl MetricSeries {
    /// Build a series, failing fast on mismatched lengths or non-finite values.
    pub fn new(
        name: impl Into<String>,
        metric_type: MetricType,
        dates: Vec<NaiveDate>,
        values: Vec<f64>,
    ) -> Result<Self> {
        let name = name.into();
        let (dates, values): (Vec<NaiveDate>, Vec<f64>) =
            sorted_samples(&name, dates, values)?.into_iter().unzip();
        Ok(Self {
            name,
            metric_type,
            dates,
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Stateless trend detector. All thresholds are the module constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendDetector;

impl TrendDetector {
    pub fn new() -> Self {
        Self
    }

    /// Analyse every series over the window spanned by `dates`.
    ///
    /// `dates` are the dates of every entry in the window; each series may
    /// cover a subset of them (entries whose analyzer call was skipped).
    pub fn analyze(&self, dates: &[NaiveDate], series: &[MetricSeries]) -> Result<TemporalWindow> {
        let window_start = dates.iter().min().copied().ok_or(InputError::EmptyWindow)?;
        let window_end = dates.iter().max().copied().ok_or(InputError::EmptyWindow)?;

        let trends = series.iter().map(|s| self.detect_trend(s)).collect();

        Ok(TemporalWindow {
            window_start,
            window_end,
            data_points: dates.len(),
            trends,
            model_version: TEMPORAL_MODEL_VERSION.to_string(),
        })
    }

    /// Classify a single series.
    pub fn detect_trend(&self, series: &MetricSeries) -> Trend {
        let mut trend = Trend {
            metric_name: series.name().to_string(),
            metric_type: series.metric_type(),
            direction: TrendDirection::InsufficientData,
            slope: 0.0,
            confidence: 0.0,
            r_squared: 0.0,
            period_days: None,
        };

        if series.len() < MIN_DATA_POINTS {
            return trend;
        }

        if let Some(period) = self.detect_cycle(series.values()) {
            trend.direction = TrendDirection::Cyclical;
            trend.confidence = CYCLE_CONFIDENCE.min(CONFIDENCE_CAP);
            trend.period_days = Some(period as u32);
            return trend;
        }

        let start = series.dates()[0];
        let x: Vec<f64> = series
            .dates()
            .iter()
            .map(|d| (*d - start).num_days() as f64)
            .collect();

        let Some(reg) = stats::linear_regression(&x, series.values()) else {
            // Every sample on the same day: no slope to speak of.
            trend.direction = TrendDirection::Stable;
            trend.confidence = 0.0;
            return trend;
        };

        trend.direction = if reg.p_value > SIGNIFICANCE_THRESHOLD {
            TrendDirection::Stable
        } else if reg.slope > SLOPE_THRESHOLD {
            TrendDirection::Increasing
        } else if reg.slope < -SLOPE_THRESHOLD {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        };
        trend.slope = stats::round_to(reg.slope, 6);
        trend.confidence = stats::round_to((1.0 - reg.p_value).min(CONFIDENCE_CAP), 3);
        trend.r_squared = stats::round_to(reg.r_squared(), 3);
        trend
    }

    /// Return the cycle length in samples, if the series has one.
    ///
    /// Only series with at least `2 × MAX_PERIOD_DAYS` samples are checked.
    pub fn detect_cycle(&self, values: &[f64]) -> Option<usize> {
        if values.len() < MAX_PERIOD_DAYS * 2 {
            return None;
        }
        let ac = stats::autocorrelation(values)?;

        (MIN_PERIOD_DAYS..=MAX_PERIOD_DAYS)
            .filter(|&lag| lag + 1 < ac.len())
            .find(|&lag| {
                ac[lag] > CYCLE_CORRELATION_THRESHOLD
                    && ac[lag] > ac[lag - 1]
                    && ac[lag] > ac[lag + 1]
            })
    }
}

/// Trailing rolling average for smoothing.
///
/// For each sample (in date order), averages every value whose date lies in
/// `[date - window_days, date]`. Results are rounded to four decimals.
pub fn rolling_average(
    dates: &[NaiveDate],
    values: &[f64],
    window_days: i64,
) -> Result<Vec<(NaiveDate, f64)>> {
    if window_days < 1 {
        return Err(InputError::InvalidWindow(window_days));
    }
    let pairs = sorted_samples("rolling_average", dates.to_vec(), values.to_vec())?;

    let window = Duration::days(window_days);
    Ok(pairs
        .iter()
        .map(|(current, _)| {
            let from = *current - window;
            let in_window: Vec<f64> = pairs
                .iter()
                .filter(|(d, _)| *d >= from && d <= current)
                .map(|(_, v)| *v)
                .collect();
            (*current, stats::round_to(stats::mean(&in_window), 4))
        })
        .collect())
}

/// Validate and pair samples, ordered by date (stable for equal dates).
fn sorted_samples(
    metric: &str,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
) -> Result<Vec<(NaiveDate, f64)>> {
    if dates.len() != values.len() {
        return Err(InputError::LengthMismatch {
            metric: metric.to_string(),
            dates: dates.len(),
            values: values.len(),
        });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(InputError::NonFiniteValue {
            metric: metric.to_string(),
            index,
        });
    }
    let mut pairs: Vec<(NaiveDate, f64)> = dates.into_iter().zip(values).collect();
    pairs.sort_by_key(|(d, _)| *d);
    Ok(pairs)
}
