//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! Besides the run manifest, a run can be exported as a precomputed dataset:
//! the display payload (formatted metrics, chart rows, reverse-chronological
//! table) that a viewer shows without recomputing anything.
//!
//! All persisted manifests include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use pumplab_core::data::{ChartRow, Dataset, DatasetPayload, DisplayMetrics, PrecomputedReport};
use pumplab_core::domain::{EquityPoint, TradeRecord};
use pumplab_core::signals::StrategyConfig;

use crate::metrics::MetricsReport;
use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── Display payload ────────────────────────────────────────────────

/// Format a fraction as a percentage with two decimals (`0.1234` → `"12.34%"`).
pub fn format_pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn display_metrics(m: &MetricsReport) -> DisplayMetrics {
    DisplayMetrics {
        total_return: format_pct(m.total_return),
        annual_return: format_pct(m.annualized_return),
        volatility: format_pct(m.volatility),
        sharpe: format!("{:.2}", m.sharpe_ratio),
        max_drawdown: format_pct(m.max_drawdown),
        win_rate: format_pct(m.win_rate),
        trades: m.trade_count,
    }
}

/// Table rows, newest day first.
pub fn history_table(history: &[EquityPoint]) -> Vec<EquityPoint> {
    history.iter().rev().cloned().collect()
}

/// Package a run as a precomputed dataset.
pub fn chart_payload(result: &BacktestResult, last_updated: &str) -> Dataset {
    Dataset {
        last_updated: last_updated.to_string(),
        synthetic: result.has_synthetic,
        payload: DatasetPayload::Precomputed(PrecomputedReport {
            metrics: display_metrics(&result.metrics),
            chart_data: result.history.iter().map(ChartRow::from).collect(),
            daily_history: history_table(&result.history),
        }),
    }
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the daily history as CSV, oldest day first.
///
/// Columns: date, price, revenue, strategy_equity, benchmark_equity, signal
pub fn export_history_csv(history: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "price",
        "revenue",
        "strategy_equity",
        "benchmark_equity",
        "signal",
    ])?;
    for p in history {
        wtr.write_record([
            &p.date.to_string(),
            &p.price.to_string(),
            &format!("{:.2}", p.revenue),
            &format!("{:.2}", p.strategy_equity),
            &format!("{:.2}", p.benchmark_equity),
            &p.signal.as_u8().to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export closed trades as CSV.
///
/// Columns: entry_index, entry_date, entry_equity, exit_index, exit_date,
/// exit_equity, return_pct, days_held
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "entry_index",
        "entry_date",
        "entry_equity",
        "exit_index",
        "exit_date",
        "exit_equity",
        "return_pct",
        "days_held",
    ])?;
    for t in trades {
        wtr.write_record([
            &t.entry_index.to_string(),
            &t.entry_date.to_string(),
            &format!("{:.2}", t.entry_equity),
            &t.exit_index.to_string(),
            &t.exit_date.to_string(),
            &format!("{:.2}", t.exit_equity),
            &format!("{:.6}", t.return_pct),
            &t.days_held().to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single backtest run.
///
/// Creates a directory named `{strategy}_{timestamp}/` under `output_dir`
/// containing:
/// - `manifest.json` — the full `BacktestResult`
/// - `history.csv` — day-by-day equity and signals
/// - `trades.csv` — closed trades
/// - `data.json` — the precomputed display dataset
/// - `report.md` — Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let now = chrono::Utc::now();
    let dirname = format!(
        "{}_{}",
        result.strategy.name(),
        now.format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write_file(&run_dir.join("manifest.json"), &export_json(result)?)?;
    write_file(&run_dir.join("history.csv"), &export_history_csv(&result.history)?)?;
    write_file(&run_dir.join("trades.csv"), &export_trades_csv(&result.trades)?)?;

    let last_updated = now.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let payload = chart_payload(result, &last_updated).to_json_pretty()?;
    write_file(&run_dir.join("data.json"), &payload)?;

    write_file(&run_dir.join("report.md"), &generate_report(result))?;

    Ok(run_dir)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Load a `BacktestResult` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report for a single backtest run.
pub fn generate_report(result: &BacktestResult) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Backtest Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Strategy | {} |\n", describe_strategy(result)));
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        result.start_date, result.end_date
    ));
    md.push_str(&format!(
        "| Initial Capital | ${:.0} |\n",
        result.initial_capital
    ));
    md.push_str(&format!("| Cost | {} bps |\n", result.cost_bps));
    md.push_str(&format!(
        "| Days | {} ({} warmup) |\n",
        result.day_count, result.warmup_days
    ));
    md.push_str(&format!("| Signal Switches | {} |\n", result.signal_switches));
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    if result.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    md.push_str("## Performance Summary\n\n");
    md.push_str("| Metric | Strategy | Buy & Hold |\n");
    md.push_str("| --- | --- | --- |\n");
    let s = display_metrics(&result.metrics);
    let b = display_metrics(&result.benchmark_metrics);
    for (label, strategy, benchmark) in [
        ("Total Return", &s.total_return, &b.total_return),
        ("Annual Return", &s.annual_return, &b.annual_return),
        ("Volatility", &s.volatility, &b.volatility),
        ("Sharpe", &s.sharpe, &b.sharpe),
        ("Max Drawdown", &s.max_drawdown, &b.max_drawdown),
    ] {
        md.push_str(&format!("| {label} | {strategy} | {benchmark} |\n"));
    }
    md.push_str(&format!("| Win Rate | {} | - |\n", s.win_rate));
    md.push_str(&format!("| Trades | {} | - |\n", s.trades));
    md.push('\n');

    if let Some(ref t) = result.tail {
        md.push_str("## Tail Risk\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("| --- | --- |\n");
        md.push_str(&format!("| Skewness | {:.3} |\n", t.skewness));
        md.push_str(&format!("| Excess Kurtosis | {:.3} |\n", t.excess_kurtosis));
        md.push_str(&format!("| VaR 5% (daily) | {} |\n", format_pct(t.var_5)));
        md.push_str(&format!("| CVaR 5% (daily) | {} |\n", format_pct(t.cvar_5)));
        md.push_str(&format!("| Calmar | {:.2} |\n", t.calmar));
        md.push_str(&format!(
            "| PSR ({} trials) | {:.3} ({:?}) |\n",
            t.n_trials,
            t.psr,
            t.psr_verdict()
        ));
        md.push('\n');
    }

    md
}

fn describe_strategy(result: &BacktestResult) -> String {
    match result.strategy {
        StrategyConfig::RevenueTrend {
            window_days,
            sma_days,
        } => format!("revenue_trend (window {window_days}d, SMA {sma_days}d)"),
        StrategyConfig::EnsembleVote { trailing_stop_pct } => {
            format!("ensemble_vote (stop {})", format_pct(trailing_stop_pct))
        }
    }
}
