//! Indicators over daily records.
//!
//! Indicators are pure functions: record history in, numeric series out.
//! They are computed once per run, before the signal loop, and never
//! recomputed per day.

pub mod rolling;

pub use rolling::{window_mean, TrailingMean};

use crate::domain::DailyRecord;

/// Trait for indicators.
///
/// Output has the same length as the input; the first `lookback()` values
/// are `f64::NAN` (warmup).
///
/// # Look-ahead contamination guard
/// The value at day `t` may only depend on records before `t`. Every
/// indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "revenue_mean_7_lag_0").
    fn name(&self) -> &str;

    /// Index of the first valid output value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire series.
    fn compute(&self, records: &[DailyRecord]) -> Vec<f64>;
}

/// Create consecutive daily records from price and revenue columns for testing.
#[cfg(test)]
pub fn make_records(prices: &[f64], revenues: &[f64]) -> Vec<DailyRecord> {
    assert_eq!(prices.len(), revenues.len());
    let base_date = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    prices
        .iter()
        .zip(revenues)
        .enumerate()
        .map(|(i, (&price, &revenue))| DailyRecord {
            date: base_date + chrono::Duration::days(i as i64),
            price,
            revenue,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
