//! PumpLab CLI — backtest, validation, and dataset commands.
//!
//! Commands:
//! - `run` — backtest one strategy against the dataset and print metrics
//! - `validate` — run plus tail metrics, walk-forward split, and cost impact
//! - `update` — rebuild the dataset from the upstream revenue and price APIs
//! - `synth` — write a seeded synthetic dataset

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pumplab_core::data::{
    fetch_dataset, fetch_upstream, load_dataset, synthetic_dataset, write_dataset, Dataset,
};
use pumplab_core::domain::EquityPoint;
use pumplab_core::engine::CostModel;
use pumplab_core::signals::StrategyConfig;
use pumplab_runner::export::format_pct;
use pumplab_runner::metrics::MetricsReport;
use pumplab_runner::tail_metrics::{TailMetrics, DEFAULT_TRIALS};
use pumplab_runner::{
    history_table, run_cost_impact, run_dataset, run_walk_forward, save_artifacts,
    BacktestConfig, BacktestResult, WalkForwardConfig, WalkForwardError, WalkForwardResult,
    COST_SCENARIOS_BPS,
};

const DEFAULT_DATA_PATH: &str = "data/pump_data.json";

#[derive(Parser)]
#[command(
    name = "pumplab",
    about = "PumpLab CLI — revenue-driven strategy backtester"
)]
struct Cli {
    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest one strategy and print metrics against buy-and-hold.
    Run {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        strategy: StrategyArgs,

        /// Number of most recent days to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,

        /// Write the artifact set (manifest, CSVs, report) under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Run plus tail risk, walk-forward split, and transaction cost impact.
    Validate {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        strategy: StrategyArgs,

        /// Parameter combinations assumed tried when deflating the Sharpe ratio.
        #[arg(long, default_value_t = DEFAULT_TRIALS)]
        trials: usize,

        /// Share of days used as the training segment.
        #[arg(long, default_value_t = 0.6)]
        train_fraction: f64,

        /// Out-of-sample Sharpe ratio required to pass.
        #[arg(long, default_value_t = 1.5)]
        oos_threshold: f64,

        /// Print the report as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Rebuild the dataset from the upstream revenue and price APIs.
    Update {
        /// Where to write the dataset.
        #[arg(long, default_value = DEFAULT_DATA_PATH)]
        output: PathBuf,
    },
    /// Write a synthetic dataset for demos and benchmarks.
    Synth {
        #[arg(long, default_value = DEFAULT_DATA_PATH)]
        output: PathBuf,

        /// Number of days.
        #[arg(long, default_value_t = 365)]
        days: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// First date (YYYY-MM-DD).
        #[arg(long, default_value = "2024-07-14")]
        start: String,
    },
}

#[derive(Args)]
struct DataArgs {
    /// Dataset file.
    #[arg(long, default_value = DEFAULT_DATA_PATH, conflicts_with = "url")]
    data: PathBuf,

    /// Fetch the dataset over HTTP instead of reading a file.
    #[arg(long)]
    url: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyKind {
    RevenueTrend,
    EnsembleVote,
}

#[derive(Args)]
struct StrategyArgs {
    /// TOML config file; strategy flags are ignored when given.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "revenue-trend")]
    strategy: StrategyKind,

    /// Revenue momentum window (revenue-trend).
    #[arg(long, default_value_t = 21)]
    window_days: usize,

    /// Price SMA length (revenue-trend).
    #[arg(long, default_value_t = 3)]
    sma_days: usize,

    /// Trailing stop as a fraction, e.g. 0.15 (ensemble-vote).
    #[arg(long, default_value_t = 0.15)]
    trailing_stop: f64,

    #[arg(long, default_value_t = 100_000.0)]
    capital: f64,

    /// Cost per conversion in basis points.
    #[arg(long, default_value_t = 0.0)]
    cost_bps: f64,
}

impl StrategyArgs {
    fn to_config(&self) -> Result<BacktestConfig> {
        if let Some(path) = &self.config {
            return BacktestConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()));
        }
        let strategy = match self.strategy {
            StrategyKind::RevenueTrend => StrategyConfig::RevenueTrend {
                window_days: self.window_days,
                sma_days: self.sma_days,
            },
            StrategyKind::EnsembleVote => StrategyConfig::EnsembleVote {
                trailing_stop_pct: self.trailing_stop,
            },
        };
        let mut config = BacktestConfig::new(strategy);
        config.backtest.initial_capital = self.capital;
        config.backtest.cost_bps = self.cost_bps;
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Run {
            data,
            strategy,
            rows,
            output_dir,
        } => run_cmd(&data, &strategy, rows, output_dir.as_deref()),
        Commands::Validate {
            data,
            strategy,
            trials,
            train_fraction,
            oos_threshold,
            json,
        } => {
            let wf = WalkForwardConfig {
                train_fraction,
                oos_sharpe_threshold: oos_threshold,
            };
            validate_cmd(&data, &strategy, trials, &wf, json)
        }
        Commands::Update { output } => update_cmd(&output),
        Commands::Synth {
            output,
            days,
            seed,
            start,
        } => synth_cmd(&output, days, seed, &start),
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to init logging: {e}"))
}

fn load(args: &DataArgs) -> Result<Dataset> {
    match &args.url {
        Some(url) => fetch_dataset(url).with_context(|| format!("failed to fetch {url}")),
        None => load_dataset(&args.data)
            .with_context(|| format!("failed to load {}", args.data.display())),
    }
}

/// Load, configure, and run. A series shorter than 2 days is an error here.
fn backtest(data: &DataArgs, strategy: &StrategyArgs) -> Result<(Dataset, BacktestResult)> {
    let dataset = load(data)?;
    let config = strategy.to_config()?;
    let Some(result) = run_dataset(&dataset, &config)? else {
        bail!("dataset needs at least 2 days to backtest");
    };
    Ok((dataset, result))
}

// ─── run ────────────────────────────────────────────────────────────

fn run_cmd(
    data: &DataArgs,
    strategy: &StrategyArgs,
    rows: usize,
    output_dir: Option<&Path>,
) -> Result<()> {
    let (dataset, result) = backtest(data, strategy)?;

    println!("Data last updated: {}", dataset.last_updated);
    print_summary(&result);
    println!();
    print_history(&history_table(&result.history), rows);

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&result, dir)?;
        println!();
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    println!();
    println!("=== Backtest Summary ===");
    println!("Strategy:     {}", result.strategy.name());
    println!("Period:       {} to {}", result.start_date, result.end_date);
    println!(
        "Days:         {} ({} warmup)",
        result.day_count, result.warmup_days
    );
    println!("Capital:      ${:.0}", result.initial_capital);
    if result.cost_bps > 0.0 {
        println!("Cost:         {} bps per conversion", result.cost_bps);
    }
    if result.has_synthetic {
        println!("Data:         SYNTHETIC");
    }
    println!();
    println!("{:<16} {:>12} {:>12}", "Metric", "Strategy", "Buy & Hold");
    println!("{}", "-".repeat(42));
    print_metric_rows(&result.metrics, &result.benchmark_metrics);
    println!("{:<16} {:>12.1}%", "Win Rate", result.metrics.win_rate * 100.0);
    println!("{:<16} {:>12}", "Trades", result.metrics.trade_count);
    if let Some(signal) = result.latest_signal() {
        let position = if signal.is_long() { "LONG" } else { "CASH" };
        println!("{:<16} {:>12}", "Next Position", position);
    }
}

fn print_metric_rows(s: &MetricsReport, b: &MetricsReport) {
    let pct = format_pct;
    for (label, sv, bv) in [
        ("Total Return", pct(s.total_return), pct(b.total_return)),
        ("Annual Return", pct(s.annualized_return), pct(b.annualized_return)),
        ("Volatility", pct(s.volatility), pct(b.volatility)),
        ("Sharpe", format!("{:.2}", s.sharpe_ratio), format!("{:.2}", b.sharpe_ratio)),
        ("Max Drawdown", pct(s.max_drawdown), pct(b.max_drawdown)),
    ] {
        println!("{label:<16} {sv:>12} {bv:>12}");
    }
}

fn print_history(rows: &[EquityPoint], limit: usize) {
    println!(
        "{:<12} {:>12} {:>16} {:>14} {:>14} {:>6}",
        "Date", "Price", "Revenue", "Strategy", "Buy & Hold", "Pos"
    );
    println!("{}", "-".repeat(80));
    for p in rows.iter().take(limit) {
        let position = if p.signal.is_long() { "LONG" } else { "CASH" };
        println!(
            "{:<12} {:>12.6} {:>16.0} {:>14.2} {:>14.2} {:>6}",
            p.date.to_string(),
            p.price,
            p.revenue,
            p.strategy_equity,
            p.benchmark_equity,
            position
        );
    }
}

// ─── validate ───────────────────────────────────────────────────────

fn validate_cmd(
    data: &DataArgs,
    strategy: &StrategyArgs,
    trials: usize,
    wf_config: &WalkForwardConfig,
    json: bool,
) -> Result<()> {
    let (dataset, result) = backtest(data, strategy)?;
    let records = dataset
        .records()
        .context("dataset has no raw records")?;

    let curve: Vec<f64> = result.history.iter().map(|p| p.strategy_equity).collect();
    let tail = TailMetrics::compute(&curve, &result.metrics, trials);
    let costs = run_cost_impact(
        records,
        &result.strategy,
        result.initial_capital,
        &COST_SCENARIOS_BPS,
    )?;
    let walk_forward = run_walk_forward(
        records,
        &result.strategy,
        result.initial_capital,
        &CostModel::new(result.cost_bps),
        wf_config,
    );
    if let Err(e) = &walk_forward {
        warn!(error = %e, "walk-forward split skipped");
    }

    if json {
        let report = serde_json::json!({
            "run_id": result.run_id,
            "metrics": result.metrics,
            "benchmark_metrics": result.benchmark_metrics,
            "tail": tail,
            "walk_forward": walk_forward_json(&walk_forward),
            "cost_impact": costs,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_summary(&result);

    println!();
    println!("=== Tail Risk ===");
    match &tail {
        Some(t) => {
            println!("Skewness:        {:.3}", t.skewness);
            println!("Excess kurtosis: {:.3}", t.excess_kurtosis);
            println!("VaR 5% (daily):  {:.2}%", t.var_5 * 100.0);
            println!("CVaR 5% (daily): {:.2}%", t.cvar_5 * 100.0);
            println!("Calmar:          {:.2}", t.calmar);
            println!(
                "Days up/down/flat: {}/{}/{}",
                t.positive_days, t.negative_days, t.flat_days
            );
            println!(
                "PSR vs {} trials: {:.3} (E[max SR] {:.2}), {:?}",
                t.n_trials,
                t.psr,
                t.expected_max_sharpe,
                t.psr_verdict()
            );
        }
        None => println!("Not enough returns for tail statistics."),
    }

    println!();
    println!("=== Walk-Forward Split ===");
    match &walk_forward {
        Ok(wf) => {
            println!(
                "Train {} to {} ({} days): Sharpe {:.2}, return {:.2}%",
                wf.train.start_date,
                wf.train.end_date,
                wf.train.days,
                wf.train.metrics.sharpe_ratio,
                wf.train.metrics.total_return * 100.0
            );
            println!(
                "Test  {} to {} ({} days): Sharpe {:.2}, return {:.2}%",
                wf.test.start_date,
                wf.test.end_date,
                wf.test.days,
                wf.test.metrics.sharpe_ratio,
                wf.test.metrics.total_return * 100.0
            );
            let verdict = if wf.passed { "PASS" } else { "FAIL" };
            println!(
                "Verdict: {verdict} (OOS Sharpe must exceed {:.2})",
                wf.oos_sharpe_threshold
            );
        }
        Err(e) => println!("Skipped: {e}"),
    }

    println!();
    println!("=== Transaction Cost Impact ===");
    if let Some(report) = &costs {
        println!("Signal switches: {}", report.signal_switches);
        if let Some(gap) = report.days_per_switch() {
            println!("Days per switch: {gap:.1}");
        }
        println!(
            "{:>8} {:>14} {:>10} {:>12}",
            "Cost", "Total Return", "Sharpe", "Max DD"
        );
        for s in &report.scenarios {
            println!(
                "{:>5} bps {:>13.2}% {:>10.2} {:>11.2}%",
                s.cost_bps,
                s.metrics.total_return * 100.0,
                s.metrics.sharpe_ratio,
                s.metrics.max_drawdown * 100.0
            );
        }
    }

    Ok(())
}

// ─── update / synth ─────────────────────────────────────────────────

/// The split report, or `{"error": ...}` when the split could not run.
fn walk_forward_json(
    walk_forward: &Result<WalkForwardResult, WalkForwardError>,
) -> serde_json::Value {
    match walk_forward {
        Ok(wf) => serde_json::to_value(wf)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() })),
        Err(e) => serde_json::json!({ "error": e.to_string() }),
    }
}

fn update_cmd(output: &Path) -> Result<()> {
    let dataset = fetch_upstream().context("failed to refresh from upstream sources")?;
    ensure_parent(output)?;
    write_dataset(output, &dataset)?;
    let days = dataset.records().map_or(0, |r| r.len());
    info!(days, path = %output.display(), "dataset updated");
    println!(
        "Wrote {days} days to {} (last updated {})",
        output.display(),
        dataset.last_updated
    );
    Ok(())
}

fn synth_cmd(output: &Path, days: usize, seed: u64, start: &str) -> Result<()> {
    if days == 0 {
        bail!("--days must be at least 1");
    }
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .with_context(|| format!("invalid --start date '{start}'"))?;
    let dataset = synthetic_dataset(start, days, seed);
    ensure_parent(output)?;
    write_dataset(output, &dataset)?;
    println!("Wrote {days} synthetic days (seed {seed}) to {}", output.display());
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}
