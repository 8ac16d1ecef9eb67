//! Tail risk metrics — VaR, CVaR, skewness, kurtosis, probabilistic Sharpe.
//!
//! These complement `MetricsReport` with distribution shape statistics used by
//! the validation report. All moments use the population formula, consistent
//! with the volatility calculation.

use serde::{Deserialize, Serialize};

use crate::metrics::{daily_returns, mean_f64, population_std, MetricsReport};

/// Euler–Mascheroni constant, as used in the expected-max-Sharpe formula.
pub const EULER_GAMMA: f64 = 0.5772;

/// Parameter combinations assumed to have been tried when deflating Sharpe.
pub const DEFAULT_TRIALS: usize = 16 * 27;

/// Tail share for VaR / CVaR.
pub const TAIL_FRACTION: f64 = 0.05;

/// Tail risk statistics computed from an equity curve's daily returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailMetrics {
    pub mean_return: f64,
    pub std_return: f64,
    /// Third standardized moment. Negative = heavier left tail.
    pub skewness: f64,
    /// Fourth standardized moment minus 3.
    pub excess_kurtosis: f64,
    /// 5% daily Value at Risk (a return, typically negative).
    pub var_5: f64,
    /// Mean of the returns at or below the VaR cutoff.
    pub cvar_5: f64,
    /// Annualized return / max drawdown; 0.0 without a drawdown.
    pub calmar: f64,
    pub positive_days: usize,
    pub negative_days: usize,
    pub flat_days: usize,
    pub sharpe: f64,
    pub expected_max_sharpe: f64,
    pub psr_z: f64,
    /// Probability that the true Sharpe beats the best of `n_trials` noise strategies.
    pub psr: f64,
    pub n_trials: usize,
    pub sample_size: usize,
}

/// How convincing the probabilistic Sharpe ratio is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PsrVerdict {
    /// PSR > 0.95
    Significant,
    /// 0.80 < PSR <= 0.95
    Marginal,
    Insignificant,
}

impl PsrVerdict {
    pub fn from_psr(psr: f64) -> Self {
        if psr > 0.95 {
            PsrVerdict::Significant
        } else if psr > 0.80 {
            PsrVerdict::Marginal
        } else {
            PsrVerdict::Insignificant
        }
    }
}

impl TailMetrics {
    /// Compute tail metrics for a strategy equity curve.
    ///
    /// `metrics` supplies the Sharpe ratio, annualized return and drawdown the
    /// deflation and Calmar ratio are computed against. Returns `None` with
    /// fewer than 2 daily returns.
    pub fn compute(equity_curve: &[f64], metrics: &MetricsReport, n_trials: usize) -> Option<Self> {
        let returns = daily_returns(equity_curve);
        let n = returns.len();
        if n < 2 {
            return None;
        }

        let mean = mean_f64(&returns);
        let std = population_std(&returns);
        let skew = skewness(&returns);
        let kurt = excess_kurtosis(&returns);
        let (var_5, cvar_5) = value_at_risk(&returns);

        let sharpe = metrics.sharpe_ratio;
        let expected_max = expected_max_sharpe(n_trials);
        let psr_z = psr_z_score(sharpe, expected_max, skew, kurt, n);

        Some(Self {
            mean_return: mean,
            std_return: std,
            skewness: skew,
            excess_kurtosis: kurt,
            var_5,
            cvar_5,
            calmar: calmar_ratio(metrics.annualized_return, metrics.max_drawdown),
            positive_days: returns.iter().filter(|r| **r > 0.0).count(),
            negative_days: returns.iter().filter(|r| **r < 0.0).count(),
            flat_days: returns.iter().filter(|r| **r == 0.0).count(),
            sharpe,
            expected_max_sharpe: expected_max,
            psr_z,
            psr: normal_cdf(psr_z),
            n_trials,
            sample_size: n,
        })
    }

    pub fn psr_verdict(&self) -> PsrVerdict {
        PsrVerdict::from_psr(self.psr)
    }
}

/// Skewness (third standardized moment), population formula.
pub fn skewness(returns: &[f64]) -> f64 {
    let std = population_std(returns);
    if returns.is_empty() || std < 1e-15 {
        return 0.0;
    }
    let mean = mean_f64(returns);
    returns.iter().map(|r| ((r - mean) / std).powi(3)).sum::<f64>() / returns.len() as f64
}

/// Excess kurtosis (fourth standardized moment minus 3), population formula.
pub fn excess_kurtosis(returns: &[f64]) -> f64 {
    let std = population_std(returns);
    if returns.is_empty() || std < 1e-15 {
        return 0.0;
    }
    let mean = mean_f64(returns);
    let m4 = returns.iter().map(|r| ((r - mean) / std).powi(4)).sum::<f64>() / returns.len() as f64;
    m4 - 3.0
}

/// Historical VaR and CVaR at 5%.
///
/// VaR is `sorted[floor(n × 0.05)]`. CVaR averages `sorted[..=idx]`, falling
/// back to VaR when the cutoff index is 0.
pub fn value_at_risk(returns: &[f64]) -> (f64, f64) {
    if returns.is_empty() {
        return (0.0, 0.0);
    }
    let mut sorted = returns.to_vec();
    sorted.sort_by(f64::total_cmp);

    let idx = ((sorted.len() as f64 * TAIL_FRACTION) as usize).min(sorted.len() - 1);
    let var = sorted[idx];
    let cvar = if idx > 0 {
        mean_f64(&sorted[..=idx])
    } else {
        var
    };
    (var, cvar)
}

/// Annualized return over max drawdown; 0.0 without a drawdown.
pub fn calmar_ratio(annualized_return: f64, max_drawdown: f64) -> f64 {
    if max_drawdown > 0.0 {
        annualized_return / max_drawdown
    } else {
        0.0
    }
}

/// Expected maximum Sharpe among `n_trials` independent noise strategies:
/// `√(2 ln N) × (1 − γ / (2 ln N))`. Zero for fewer than 2 trials.
pub fn expected_max_sharpe(n_trials: usize) -> f64 {
    if n_trials < 2 {
        return 0.0;
    }
    let two_ln_n = 2.0 * (n_trials as f64).ln();
    two_ln_n.sqrt() * (1.0 - EULER_GAMMA / two_ln_n)
}

/// z-score of the observed Sharpe against a benchmark Sharpe, using the
/// non-normal Sharpe estimator variance. 0.0 when that variance is not positive.
pub fn psr_z_score(sharpe: f64, benchmark: f64, skew: f64, kurt: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let sr2 = sharpe * sharpe;
    let variance = (1.0 + 0.5 * sr2 - skew * sharpe + (kurt / 4.0) * sr2) / n as f64;
    if variance > 0.0 {
        (sharpe - benchmark) / variance.sqrt()
    } else {
        0.0
    }
}

/// Standard normal CDF.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / std::f64::consts::SQRT_2))
}

// ─── Tests ───────────────────────────────────────────────────────────
