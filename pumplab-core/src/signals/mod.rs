//! Signal generation — one binary position signal per day.
//!
//! Two strategies share the `SignalGenerator` trait and the trailing-mean
//! primitive:
//! - `RevenueTrend`: single revenue window plus an SMA price filter
//! - `EnsembleVote`: majority vote over fixed 3/7/14-day windows plus a trailing stop
//!
//! # Look-ahead invariant
//! The signal at day `i` is computed from records `0..i` only. The first
//! `min_lookback()` days are forced `Flat`.

pub mod ensemble_vote;
pub mod revenue_trend;

pub use ensemble_vote::{EnsembleState, EnsembleVote, ENSEMBLE_WINDOWS};
pub use revenue_trend::{RevenueTrend, TREND_TOLERANCE};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DailyRecord, Signal};

/// Trait for signal generators.
///
/// # Architecture invariant
/// Generators see only the record history. They never see simulated
/// portfolio state; any position state they keep (e.g. a trailing-stop peak)
/// is their own, derived from the signals they emitted.
pub trait SignalGenerator: Send + Sync {
    /// Human-readable name (e.g., "revenue_trend").
    fn name(&self) -> &str;

    /// Number of leading days that always signal `Flat`.
    fn min_lookback(&self) -> usize;

    /// Produce one signal per record, index-aligned with `records`.
    fn generate(&self, records: &[DailyRecord]) -> Vec<Signal>;
}

/// Serializable strategy selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Single revenue-momentum window gated by an SMA uptrend filter.
    RevenueTrend { window_days: usize, sma_days: usize },

    /// Fixed multi-window majority vote with a trailing stop (fraction, e.g. 0.15).
    EnsembleVote { trailing_stop_pct: f64 },
}

impl StrategyConfig {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyConfig::RevenueTrend { .. } => "revenue_trend",
            StrategyConfig::EnsembleVote { .. } => "ensemble_vote",
        }
    }

    /// Check parameter ranges without building the generator.
    pub fn validate(&self) -> Result<(), FactoryError> {
        match *self {
            StrategyConfig::RevenueTrend {
                window_days,
                sma_days,
            } => {
                if window_days == 0 {
                    return Err(FactoryError::InvalidParam {
                        name: "window_days",
                        reason: "must be >= 1".into(),
                    });
                }
                if sma_days == 0 {
                    return Err(FactoryError::InvalidParam {
                        name: "sma_days",
                        reason: "must be >= 1".into(),
                    });
                }
            }
            StrategyConfig::EnsembleVote { trailing_stop_pct } => {
                if !(trailing_stop_pct.is_finite() && trailing_stop_pct > 0.0) {
                    return Err(FactoryError::InvalidParam {
                        name: "trailing_stop_pct",
                        reason: format!("must be a positive fraction, got {trailing_stop_pct}"),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::RevenueTrend {
            window_days: 21,
            sma_days: 3,
        }
    }
}

/// Errors that can occur during generator construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FactoryError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParam { name: &'static str, reason: String },
}

/// Create a signal generator from a `StrategyConfig`.
pub fn build_generator(config: &StrategyConfig) -> Result<Box<dyn SignalGenerator>, FactoryError> {
    config.validate()?;
    match *config {
        StrategyConfig::RevenueTrend {
            window_days,
            sma_days,
        } => Ok(Box::new(RevenueTrend::new(window_days, sma_days))),
        StrategyConfig::EnsembleVote { trailing_stop_pct } => {
            Ok(Box::new(EnsembleVote::new(trailing_stop_pct)))
        }
    }
}
