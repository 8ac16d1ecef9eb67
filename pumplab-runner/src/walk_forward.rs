//! Walk-forward validation — one chronological train/test split.
//!
//! The strategy parameters are fixed; nothing is fitted on the training
//! segment. Both segments are simulated independently from fresh capital and
//! with their own warmup, so the test segment never sees training-period data.
//! The verdict asks whether the out-of-sample Sharpe ratio clears a threshold.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use pumplab_core::domain::{validate_series, DailyRecord};
use pumplab_core::engine::CostModel;
use pumplab_core::signals::StrategyConfig;

use crate::metrics::MetricsReport;
use crate::runner::{simulate_strategy, RunError};

// ─── Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkForwardConfig {
    /// Share of days in the training segment (default 0.6).
    pub train_fraction: f64,
    /// Out-of-sample Sharpe a strategy must exceed to pass (default 1.5).
    pub oos_sharpe_threshold: f64,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            train_fraction: 0.6,
            oos_sharpe_threshold: 1.5,
        }
    }
}

// ─── Result types ────────────────────────────────────────────────────

/// Metrics for one side of the split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentReport {
    pub start_date: String,
    pub end_date: String,
    pub days: usize,
    pub metrics: MetricsReport,
    pub benchmark_metrics: MetricsReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkForwardResult {
    /// Index of the first test day.
    pub split_index: usize,
    pub train: SegmentReport,
    pub test: SegmentReport,
    pub oos_sharpe_threshold: f64,
    pub passed: bool,
}

impl WalkForwardResult {
    /// Out-of-sample Sharpe minus in-sample Sharpe.
    pub fn sharpe_decay(&self) -> f64 {
        self.test.metrics.sharpe_ratio - self.train.metrics.sharpe_ratio
    }
}

#[derive(Debug, Error)]
pub enum WalkForwardError {
    #[error("train fraction must be in (0, 1), got {0}")]
    InvalidFraction(f64),
    #[error("insufficient data: {days} days leave a segment shorter than 2 days")]
    InsufficientData { days: usize },
    #[error(transparent)]
    Run(#[from] RunError),
}

// ─── Split ───────────────────────────────────────────────────────────

/// Index of the first test day: `floor(days × train_fraction)`.
pub fn split_index(days: usize, train_fraction: f64) -> usize {
    (days as f64 * train_fraction).floor() as usize
}

/// Run the split and evaluate both segments.
pub fn run_walk_forward(
    records: &[DailyRecord],
    strategy: &StrategyConfig,
    initial_capital: f64,
    costs: &CostModel,
    config: &WalkForwardConfig,
) -> Result<WalkForwardResult, WalkForwardError> {
    let fraction = config.train_fraction;
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(WalkForwardError::InvalidFraction(fraction));
    }
    validate_series(records).map_err(RunError::from)?;
    let split = split_index(records.len(), fraction);
    let (train_records, test_records) = records.split_at(split.min(records.len()));

    let train = evaluate_segment(train_records, strategy, initial_capital, costs)?;
    let test = evaluate_segment(test_records, strategy, initial_capital, costs)?;
    let (Some(train), Some(test)) = (train, test) else {
        return Err(WalkForwardError::InsufficientData {
            days: records.len(),
        });
    };

    let passed = test.metrics.sharpe_ratio > config.oos_sharpe_threshold;
    info!(
        split,
        is_sharpe = train.metrics.sharpe_ratio,
        oos_sharpe = test.metrics.sharpe_ratio,
        passed,
        "walk-forward complete"
    );

    Ok(WalkForwardResult {
        split_index: split,
        train,
        test,
        oos_sharpe_threshold: config.oos_sharpe_threshold,
        passed,
    })
}

fn evaluate_segment(
    records: &[DailyRecord],
    strategy: &StrategyConfig,
    initial_capital: f64,
    costs: &CostModel,
) -> Result<Option<SegmentReport>, RunError> {
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Ok(None);
    };
    let history = simulate_strategy(records, strategy, initial_capital, costs)?;
    let (Some(metrics), Some(benchmark_metrics)) = (
        MetricsReport::compute(&history),
        MetricsReport::compute_benchmark(&history),
    ) else {
        return Ok(None);
    };
    Ok(Some(SegmentReport {
        start_date: first.date.to_string(),
        end_date: last.date.to_string(),
        days: records.len(),
        metrics,
        benchmark_metrics,
    }))
}
