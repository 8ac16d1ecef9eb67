//! Property tests for the metrics report.
//!
//! 1. Trade accounting — win rate stays in [0, 1] and the trade count equals
//!    the number of Long -> Flat transitions
//! 2. Finite ratios — any accepted cost keeps every metric finite and equity
//!    non-negative

use chrono::NaiveDate;
use proptest::prelude::*;
use pumplab_core::domain::{DailyRecord, EquityPoint, Signal};
use pumplab_core::engine::{simulate_with_costs, CostModel, MAX_COST_BPS};
use pumplab_runner::MetricsReport;

fn arb_history() -> impl Strategy<Value = Vec<EquityPoint>> {
    prop::collection::vec((1.0..500_000.0_f64, any::<bool>()), 2..120).prop_map(|rows| {
        let base = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        rows.into_iter()
            .enumerate()
            .map(|(i, (equity, long))| EquityPoint {
                date: base + chrono::Duration::days(i as i64),
                price: 1.0,
                revenue: 0.0,
                strategy_equity: equity,
                benchmark_equity: 100_000.0,
                signal: Signal::from(long),
            })
            .collect()
    })
}

fn arb_series_with_signals() -> impl Strategy<Value = (Vec<DailyRecord>, Vec<Signal>)> {
    prop::collection::vec((0.5..2.0_f64, any::<bool>()), 2..80).prop_map(|rows| {
        let base = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        rows.into_iter()
            .enumerate()
            .map(|(i, (price, long))| {
                (
                    DailyRecord::new(base + chrono::Duration::days(i as i64), price, 1_000.0),
                    Signal::from(long),
                )
            })
            .unzip()
    })
}

fn long_to_flat(history: &[EquityPoint]) -> usize {
    let mut prev = Signal::Flat;
    let mut exits = 0;
    for point in history {
        if prev == Signal::Long && point.signal == Signal::Flat {
            exits += 1;
        }
        prev = point.signal;
    }
    exits
}

// ── 1. Trade accounting ──────────────────────────────────────────────

proptest! {
    #[test]
    fn trade_count_matches_exits(history in arb_history()) {
        let report = MetricsReport::compute(&history).unwrap();
        prop_assert!((0.0..=1.0).contains(&report.win_rate));
        prop_assert_eq!(report.trade_count, long_to_flat(&history));
        if report.trade_count == 0 {
            prop_assert_eq!(report.win_rate, 0.0);
        }
    }
}

// ── 2. Finite ratios ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn accepted_costs_keep_metrics_finite(
        (records, signals) in arb_series_with_signals(),
        cost_bps in 0.0..MAX_COST_BPS,
    ) {
        let history =
            simulate_with_costs(&records, &signals, 100_000.0, &CostModel::new(cost_bps)).unwrap();
        prop_assert!(history.iter().all(|p| p.strategy_equity >= 0.0));

        let report = MetricsReport::compute(&history).unwrap();
        prop_assert!(report.total_return.is_finite() && report.total_return >= -1.0);
        prop_assert!(report.annualized_return.is_finite());
        prop_assert!(report.volatility.is_finite());
        prop_assert!(report.sharpe_ratio.is_finite());
        prop_assert!((0.0..=1.0).contains(&report.max_drawdown));
    }
}
