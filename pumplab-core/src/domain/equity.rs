//! EquityPoint — one row of the simulated equity history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::signal::Signal;

/// Strategy and benchmark equity at the close of one day.
///
/// Equity values are rounded to cents when the simulator emits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub revenue: f64,
    pub strategy_equity: f64,
    pub benchmark_equity: f64,
    pub signal: Signal,
}

/// Round to 2 decimal places.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Strategy equity column of a history.
pub fn strategy_curve(points: &[EquityPoint]) -> Vec<f64> {
    points.iter().map(|p| p.strategy_equity).collect()
}

/// Benchmark equity column of a history.
pub fn benchmark_curve(points: &[EquityPoint]) -> Vec<f64> {
    points.iter().map(|p| p.benchmark_equity).collect()
}
