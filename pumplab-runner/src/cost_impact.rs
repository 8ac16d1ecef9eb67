//! Transaction cost sensitivity.
//!
//! Re-simulates one strategy under a ladder of per-conversion costs. The
//! signals do not depend on costs, so only the equity path changes between
//! scenarios.

use serde::{Deserialize, Serialize};
use tracing::debug;

use pumplab_core::domain::{count_switches, validate_series, DailyRecord};
use pumplab_core::engine::{simulate_with_costs, CostModel};
use pumplab_core::signals::{build_generator, StrategyConfig};

use crate::metrics::MetricsReport;
use crate::runner::RunError;

/// Default cost ladder in basis points.
pub const COST_SCENARIOS_BPS: [f64; 5] = [0.0, 10.0, 20.0, 30.0, 50.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostScenario {
    pub cost_bps: f64,
    pub metrics: MetricsReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostImpactReport {
    /// Position changes in the signal series.
    pub signal_switches: usize,
    pub days: usize,
    pub scenarios: Vec<CostScenario>,
}

impl CostImpactReport {
    /// Average days between switches; `None` without any.
    pub fn days_per_switch(&self) -> Option<f64> {
        (self.signal_switches > 0).then(|| self.days as f64 / self.signal_switches as f64)
    }

    /// Total-return difference between the cheapest and the costliest scenario.
    pub fn return_drag(&self) -> f64 {
        match (self.scenarios.first(), self.scenarios.last()) {
            (Some(first), Some(last)) => first.metrics.total_return - last.metrics.total_return,
            _ => 0.0,
        }
    }
}

/// Simulate `strategy` once per cost level.
///
/// Returns `Ok(None)` for fewer than 2 days.
pub fn run_cost_impact(
    records: &[DailyRecord],
    strategy: &StrategyConfig,
    initial_capital: f64,
    costs_bps: &[f64],
) -> Result<Option<CostImpactReport>, RunError> {
    if records.len() < 2 {
        return Ok(None);
    }
    validate_series(records)?;
    let generator = build_generator(strategy)?;
    let signals = generator.generate(records);

    let mut scenarios = Vec::with_capacity(costs_bps.len());
    for &cost_bps in costs_bps {
        let history =
            simulate_with_costs(records, &signals, initial_capital, &CostModel::new(cost_bps))?;
        if let Some(metrics) = MetricsReport::compute(&history) {
            scenarios.push(CostScenario { cost_bps, metrics });
        }
    }

    let signal_switches = count_switches(&signals);
    debug!(
        strategy = generator.name(),
        switches = signal_switches,
        scenarios = scenarios.len(),
        "cost impact complete"
    );

    Ok(Some(CostImpactReport {
        signal_switches,
        days: records.len(),
        scenarios,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Revenue that pulses up and down so the trend strategy flips often.
    fn choppy(n: usize) -> Vec<DailyRecord> {
        let base = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        (0..n)
            .map(|i| {
                let revenue = if (i / 4) % 2 == 0 { 1_000.0 + i as f64 * 40.0 } else { 500.0 };
                DailyRecord::new(base + chrono::Duration::days(i as i64), 1.0 + i as f64 * 0.01, revenue)
            })
            .collect()
    }

    fn strategy() -> StrategyConfig {
        StrategyConfig::RevenueTrend {
            window_days: 2,
            sma_days: 2,
        }
    }

    #[test]
    fn one_scenario_per_cost_level() {
        let report = run_cost_impact(&choppy(80), &strategy(), 10_000.0, &COST_SCENARIOS_BPS)
            .unwrap()
            .unwrap();
        assert_eq!(report.scenarios.len(), 5);
        assert_eq!(report.days, 80);
        let bps: Vec<f64> = report.scenarios.iter().map(|s| s.cost_bps).collect();
        assert_eq!(bps, COST_SCENARIOS_BPS.to_vec());
    }

    #[test]
    fn higher_costs_never_raise_returns() {
        let report = run_cost_impact(&choppy(80), &strategy(), 10_000.0, &COST_SCENARIOS_BPS)
            .unwrap()
            .unwrap();
        assert!(report.signal_switches > 2);
        for w in report.scenarios.windows(2) {
            assert!(
                w[1].metrics.total_return <= w[0].metrics.total_return + 1e-6,
                "{} bps beat {} bps",
                w[1].cost_bps,
                w[0].cost_bps
            );
        }
        assert!(report.return_drag() > 0.0);
        assert!(report.days_per_switch().unwrap() > 0.0);
    }

    #[test]
    fn no_switches_means_no_drag() {
        let base = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let flat: Vec<DailyRecord> = (0..30)
            .map(|i| DailyRecord::new(base + chrono::Duration::days(i), 3.0, 800.0))
            .collect();
        let report = run_cost_impact(&flat, &strategy(), 10_000.0, &COST_SCENARIOS_BPS)
            .unwrap()
            .unwrap();
        assert_eq!(report.signal_switches, 0);
        assert_eq!(report.days_per_switch(), None);
        assert_eq!(report.return_drag(), 0.0);
    }

    #[test]
    fn short_series_yields_none() {
        assert!(run_cost_impact(&choppy(1), &strategy(), 10_000.0, &COST_SCENARIOS_BPS)
            .unwrap()
            .is_none());
    }

    #[test]
    fn rejects_non_positive_prices() {
        let mut records = choppy(40);
        records[20].price = 0.0;
        let err = run_cost_impact(&records, &strategy(), 10_000.0, &COST_SCENARIOS_BPS).unwrap_err();
        assert!(matches!(err, RunError::Series(_)), "{err}");
    }
}
