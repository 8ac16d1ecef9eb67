//! PumpLab Runner — backtest orchestration, metrics, validation, export.
//!
//! This crate builds on `pumplab-core` to provide:
//! - TOML backtest configuration with content-addressed run ids
//! - Single-backtest runner with trade extraction and metrics
//! - Tail-risk statistics and the probabilistic Sharpe ratio
//! - Walk-forward (train/test) and transaction-cost validation passes
//! - JSON, CSV, Markdown and precomputed-dataset export

pub mod config;
pub mod cost_impact;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod tail_metrics;
pub mod walk_forward;

pub use config::{BacktestConfig, BacktestSection, ConfigError, RunId};
pub use cost_impact::{run_cost_impact, CostImpactReport, CostScenario, COST_SCENARIOS_BPS};
pub use export::{
    chart_payload, display_metrics, export_json, generate_report, history_table, import_json,
    load_artifacts, save_artifacts,
};
pub use metrics::MetricsReport;
pub use runner::{run_backtest, run_dataset, simulate_strategy, BacktestResult, RunError};
pub use tail_metrics::{PsrVerdict, TailMetrics};
pub use walk_forward::{
    run_walk_forward, SegmentReport, WalkForwardConfig, WalkForwardError, WalkForwardResult,
};
