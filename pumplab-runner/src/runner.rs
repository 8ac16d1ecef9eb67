//! Backtest runner — wires together signal generation, simulation, and metrics.
//!
//! Two entry points:
//! - `run_backtest()`: takes a record slice and a config. Used by tests and
//!   the validation passes.
//! - `run_dataset()`: unwraps a loaded `Dataset` first. Used by the CLI.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use pumplab_core::data::{dataset_hash, is_synthetic, Dataset};
use pumplab_core::domain::{
    count_switches, strategy_curve, validate_series, DailyRecord, EquityPoint, SeriesError,
    TradeRecord,
};
use pumplab_core::engine::{extract_trades, simulate_with_costs, CostModel, SimulationError};
use pumplab_core::signals::{build_generator, FactoryError, StrategyConfig};

use crate::config::{BacktestConfig, ConfigError};
use crate::metrics::MetricsReport;
use crate::tail_metrics::{TailMetrics, DEFAULT_TRIALS};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("strategy error: {0}")]
    Factory(#[from] FactoryError),
    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),
    #[error("simulation error: {0}")]
    Simulation(#[from] SimulationError),
    #[error("dataset carries a precomputed report, not raw records")]
    Precomputed,
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: String,
    pub strategy: StrategyConfig,
    pub metrics: MetricsReport,
    pub benchmark_metrics: MetricsReport,
    /// Distribution statistics; `None` below 3 days.
    pub tail: Option<TailMetrics>,
    pub history: Vec<EquityPoint>,
    pub trades: Vec<TradeRecord>,
    pub start_date: String,
    pub end_date: String,
    pub initial_capital: f64,
    pub cost_bps: f64,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub day_count: usize,
    pub warmup_days: usize,
    pub signal_switches: usize,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    /// Signal of the most recent day, the one that decides tomorrow's position.
    pub fn latest_signal(&self) -> Option<pumplab_core::domain::Signal> {
        self.history.last().map(|p| p.signal)
    }
}

/// Simulate one strategy over `records`, returning the daily history.
///
/// Shared by the single run, walk-forward, and cost-impact passes.
pub fn simulate_strategy(
    records: &[DailyRecord],
    strategy: &StrategyConfig,
    initial_capital: f64,
    costs: &CostModel,
) -> Result<Vec<EquityPoint>, RunError> {
    let generator = build_generator(strategy)?;
    let signals = generator.generate(records);
    Ok(simulate_with_costs(records, &signals, initial_capital, costs)?)
}

/// Run a full backtest over pre-loaded records — no I/O.
///
/// Returns `Ok(None)` when the series has fewer than 2 days: there is nothing
/// to trade and no return to measure.
pub fn run_backtest(
    records: &[DailyRecord],
    config: &BacktestConfig,
) -> Result<Option<BacktestResult>, RunError> {
    config.validate()?;
    if records.len() < 2 {
        warn!(days = records.len(), "not enough data to backtest");
        return Ok(None);
    }
    validate_series(records)?;

    let generator = build_generator(&config.strategy)?;
    let signals = generator.generate(records);
    let history = simulate_with_costs(
        records,
        &signals,
        config.backtest.initial_capital,
        &config.cost_model(),
    )?;
    let trades = extract_trades(&history);

    let (Some(metrics), Some(benchmark_metrics)) = (
        MetricsReport::from_curve(&strategy_curve(&history), &trades),
        MetricsReport::compute_benchmark(&history),
    ) else {
        return Ok(None);
    };
    let tail = TailMetrics::compute(&strategy_curve(&history), &metrics, DEFAULT_TRIALS);

    debug!(
        strategy = generator.name(),
        days = records.len(),
        trades = trades.len(),
        total_return = metrics.total_return,
        "backtest complete"
    );

    Ok(Some(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        strategy: config.strategy.clone(),
        metrics,
        benchmark_metrics,
        tail,
        start_date: records[0].date.to_string(),
        end_date: records[records.len() - 1].date.to_string(),
        initial_capital: config.backtest.initial_capital,
        cost_bps: config.backtest.cost_bps,
        dataset_hash: dataset_hash(records),
        has_synthetic: false,
        day_count: records.len(),
        warmup_days: generator.min_lookback().min(records.len()),
        signal_switches: count_switches(&signals),
        history,
        trades,
    }))
}

/// Run a backtest over a loaded dataset.
///
/// Precomputed datasets carry no raw records and cannot be re-run.
pub fn run_dataset(
    dataset: &Dataset,
    config: &BacktestConfig,
) -> Result<Option<BacktestResult>, RunError> {
    let records = dataset.records().ok_or(RunError::Precomputed)?;
    let mut result = run_backtest(records, config)?;
    if let Some(result) = result.as_mut() {
        result.has_synthetic = is_synthetic(dataset);
    }
    Ok(result)
}
