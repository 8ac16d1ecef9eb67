//! Performance metrics — pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: equity curve and/or trade list in, scalar out.
//! All values are fractions (0.25 = 25%) except the Sharpe ratio and the trade
//! count. Calendar-day data: annualization uses 365 days.

use serde::{Deserialize, Serialize};

use pumplab_core::domain::{benchmark_curve, strategy_curve, EquityPoint, TradeRecord};
use pumplab_core::engine::extract_trades;

/// Days per year for annualization (crypto trades every day).
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Summary statistics for one equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub total_return: f64,
    pub annualized_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough decline, as a positive fraction.
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub trade_count: usize,
}

impl MetricsReport {
    /// Strategy metrics for a simulated history.
    ///
    /// `None` for fewer than 2 points.
    pub fn compute(history: &[EquityPoint]) -> Option<Self> {
        let trades = extract_trades(history);
        Self::from_curve(&strategy_curve(history), &trades)
    }

    /// Buy-and-hold metrics for the same history (no trades).
    pub fn compute_benchmark(history: &[EquityPoint]) -> Option<Self> {
        Self::from_curve(&benchmark_curve(history), &[])
    }

    /// Compute all metrics from an equity curve and trade list.
    pub fn from_curve(equity_curve: &[f64], trades: &[TradeRecord]) -> Option<Self> {
        if equity_curve.len() < 2 {
            return None;
        }
        let total = total_return(equity_curve);
        let annualized = annualized_return(total, equity_curve.len());
        let vol = volatility(&daily_returns(equity_curve));
        Some(Self {
            total_return: total,
            annualized_return: annualized,
            volatility: vol,
            sharpe_ratio: sharpe_ratio(annualized, vol),
            max_drawdown: max_drawdown(equity_curve),
            win_rate: win_rate(trades),
            trade_count: trades.len(),
        })
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: last / first - 1.
pub fn total_return(equity_curve: &[f64]) -> f64 {
    match (equity_curve.first(), equity_curve.last()) {
        (Some(&first), Some(&last)) if first != 0.0 => last / first - 1.0,
        _ => 0.0,
    }
}

/// `(1 + total)^(365 / days) - 1`, where `days` is the number of points.
///
/// A curve that lost everything annualizes to -1.0.
pub fn annualized_return(total_return: f64, days: usize) -> f64 {
    if days == 0 {
        return 0.0;
    }
    if total_return <= -1.0 {
        return -1.0;
    }
    (1.0 + total_return).powf(DAYS_PER_YEAR / days as f64) - 1.0
}

/// Annualized volatility: population std of daily returns × √365.
pub fn volatility(returns: &[f64]) -> f64 {
    population_std(returns) * DAYS_PER_YEAR.sqrt()
}

/// Annualized return per unit of volatility. 0.0 when volatility is zero.
pub fn sharpe_ratio(annualized_return: f64, volatility: f64) -> f64 {
    if volatility == 0.0 {
        return 0.0;
    }
    annualized_return / volatility
}

/// Maximum drawdown as a positive fraction (e.g., 0.15 = 15% drawdown).
///
/// Returns 0.0 if equity is constant or monotonically increasing.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (peak - eq) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Win rate: fraction of closed trades that were winners.
pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Day-over-day returns. A zero previous equity yields a 0.0 return.
pub fn daily_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| if w[0] != 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divide by N).
pub(crate) fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
