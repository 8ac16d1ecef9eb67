//! Portfolio simulator — signals + prices in, daily equity history out.
//!
//! Execution model: the signal emitted for day `i - 1` is executed at day
//! `i`'s price. A `Long` signal while flat converts all cash into units; a
//! `Flat` signal while holding converts all units back into cash. The signal
//! for day `i` itself never moves day `i`'s equity.
//!
//! The benchmark buys `initial_capital / price[0]` units on day 0 and holds.

use thiserror::Error;
use tracing::debug;

use crate::domain::{round_cents, DailyRecord, EquityPoint, PortfolioState, Signal};

use super::cost_model::CostModel;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("signal count {signals} does not match record count {records}")]
    LengthMismatch { records: usize, signals: usize },

    #[error("initial capital must be positive and finite, got {0}")]
    InvalidCapital(f64),
}

/// Simulate without transaction costs.
pub fn simulate(
    records: &[DailyRecord],
    signals: &[Signal],
    initial_capital: f64,
) -> Result<Vec<EquityPoint>, SimulationError> {
    simulate_with_costs(records, signals, initial_capital, &CostModel::frictionless())
}

/// Simulate with a per-side cost applied to every conversion.
///
/// Returns an empty history for an empty series.
pub fn simulate_with_costs(
    records: &[DailyRecord],
    signals: &[Signal],
    initial_capital: f64,
    costs: &CostModel,
) -> Result<Vec<EquityPoint>, SimulationError> {
    if records.len() != signals.len() {
        return Err(SimulationError::LengthMismatch {
            records: records.len(),
            signals: signals.len(),
        });
    }
    if !(initial_capital.is_finite() && initial_capital > 0.0) {
        return Err(SimulationError::InvalidCapital(initial_capital));
    }
    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };

    let benchmark_units = if first.price > 0.0 {
        initial_capital / first.price
    } else {
        0.0
    };

    let mut portfolio = PortfolioState::new(initial_capital);
    let mut conversions = 0usize;
    let mut history = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            match signals[i - 1] {
                Signal::Long if !portfolio.is_long() => {
                    portfolio.enter(costs.buy_price(record.price));
                    conversions += 1;
                }
                Signal::Flat if portfolio.is_long() => {
                    portfolio.exit(costs.sell_price(record.price));
                    conversions += 1;
                }
                _ => {}
            }
        }

        history.push(EquityPoint {
            date: record.date,
            price: record.price,
            revenue: record.revenue,
            strategy_equity: round_cents(portfolio.equity(record.price)),
            benchmark_equity: round_cents(benchmark_units * record.price),
            signal: signals[i],
        });
    }

    debug!(
        days = records.len(),
        conversions,
        cost_bps = costs.cost_bps,
        "simulation complete"
    );
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use Signal::{Flat, Long};

    fn records(prices: &[f64]) -> Vec<DailyRecord> {
        let base = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| DailyRecord::new(base + chrono::Duration::days(i as i64), p, 100.0))
            .collect()
    }

    fn strategy(h: &[EquityPoint]) -> Vec<f64> {
        h.iter().map(|p| p.strategy_equity).collect()
    }

    #[test]
    fn first_day_equals_initial_capital() {
        let h = simulate(&records(&[2.0, 3.0]), &[Long, Long], 1_000.0).unwrap();
        assert_eq!(h[0].strategy_equity, 1_000.0);
        assert_eq!(h[0].benchmark_equity, 1_000.0);
    }

    #[test]
    fn signal_executes_next_day() {
        // Long on day 0 → buy at day 1 price (10), ride to 12 and 15.
        let h = simulate(&records(&[8.0, 10.0, 12.0, 15.0]), &[Long, Long, Long, Long], 1_000.0)
            .unwrap();
        assert_eq!(strategy(&h), vec![1_000.0, 1_000.0, 1_200.0, 1_500.0]);
    }

    #[test]
    fn same_day_signal_is_ignored() {
        // Long appears only on the last day: nothing to execute it on.
        let h = simulate(&records(&[10.0, 20.0, 40.0]), &[Flat, Flat, Long], 500.0).unwrap();
        assert_eq!(strategy(&h), vec![500.0, 500.0, 500.0]);
    }

    #[test]
    fn exit_locks_in_cash() {
        let h = simulate(
            &records(&[10.0, 10.0, 20.0, 5.0, 1.0]),
            &[Long, Long, Flat, Flat, Flat],
            100.0,
        )
        .unwrap();
        // buy day1 @10 → 10 units; day2 @20 → 200; sell day3 @5 → 50
        assert_eq!(strategy(&h), vec![100.0, 100.0, 200.0, 50.0, 50.0]);
    }

    #[test]
    fn benchmark_is_buy_and_hold() {
        let h = simulate(&records(&[4.0, 2.0, 8.0]), &[Flat, Flat, Flat], 1_000.0).unwrap();
        let bench: Vec<f64> = h.iter().map(|p| p.benchmark_equity).collect();
        assert_eq!(bench, vec![1_000.0, 500.0, 2_000.0]);
    }

    #[test]
    fn equity_rounded_to_cents() {
        let h = simulate(&records(&[3.0, 3.0, 3.3333]), &[Long, Long, Long], 1_000.0).unwrap();
        // 333.333.. units * 3.3333 = 1111.09999..
        assert_eq!(h[2].strategy_equity, 1_111.10);
        assert_eq!(h[2].benchmark_equity, 1_111.10);
    }

    #[test]
    fn costs_reduce_round_trip() {
        let recs = records(&[10.0, 10.0, 10.0, 10.0]);
        let sigs = [Long, Flat, Flat, Flat];
        let free = simulate(&recs, &sigs, 1_000.0).unwrap();
        let costly = simulate_with_costs(&recs, &sigs, 1_000.0, &CostModel::new(50.0)).unwrap();
        assert_eq!(free[3].strategy_equity, 1_000.0);
        // buy @10.05, sell @9.95 → 1000 * 9.95 / 10.05
        assert_eq!(costly[3].strategy_equity, round_cents(1_000.0 * 9.95 / 10.05));
    }

    #[test]
    fn prohibitive_costs_never_drive_equity_negative() {
        let recs = records(&[10.0, 10.0, 12.0, 8.0, 9.0, 11.0]);
        let sigs = [Long, Flat, Long, Flat, Long, Flat];
        for bps in [9_999.0, 10_000.0, 20_000.0] {
            let h = simulate_with_costs(&recs, &sigs, 1_000.0, &CostModel::new(bps)).unwrap();
            assert!(
                h.iter().all(|p| p.strategy_equity >= 0.0),
                "negative equity at {bps} bps"
            );
        }
        let wiped = simulate_with_costs(&recs, &sigs, 1_000.0, &CostModel::new(20_000.0)).unwrap();
        assert_eq!(wiped[2].strategy_equity, 0.0);
    }

    #[test]
    fn history_carries_signal_and_inputs() {
        let recs = records(&[1.0, 2.0]);
        let h = simulate(&recs, &[Flat, Long], 10.0).unwrap();
        assert_eq!(h[1].signal, Long);
        assert_eq!(h[1].price, 2.0);
        assert_eq!(h[1].revenue, 100.0);
        assert_eq!(h[1].date, recs[1].date);
    }

    #[test]
    fn empty_series_is_empty_history() {
        assert!(simulate(&[], &[], 1_000.0).unwrap().is_empty());
    }

    #[test]
    fn rejects_mismatch_and_bad_capital() {
        assert_eq!(
            simulate(&records(&[1.0, 2.0]), &[Flat], 1.0),
            Err(SimulationError::LengthMismatch {
                records: 2,
                signals: 1
            })
        );
        assert_eq!(
            simulate(&records(&[1.0]), &[Flat], 0.0),
            Err(SimulationError::InvalidCapital(0.0))
        );
    }
}
