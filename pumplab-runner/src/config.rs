//! Serializable backtest configuration.
//!
//! A run is fully described by its capital, its trading cost and the strategy
//! parameters. The TOML form looks like:
//!
//! ```toml
//! [backtest]
//! initial_capital = 100000.0
//! cost_bps = 0.0
//!
//! [strategy]
//! type = "revenue_trend"
//! window_days = 21
//! sma_days = 3
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pumplab_core::engine::{CostModel, MAX_COST_BPS};
use pumplab_core::signals::{FactoryError, StrategyConfig};

/// Default starting capital.
pub const DEFAULT_CAPITAL: f64 = 100_000.0;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("initial capital must be positive and finite, got {0}")]
    InvalidCapital(f64),
    #[error("cost must be between 0 and 10000 basis points (exclusive), got {0}")]
    InvalidCost(f64),
    #[error(transparent)]
    Strategy(#[from] FactoryError),
}

/// Capital and cost settings shared by every strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    #[serde(default = "default_capital")]
    pub initial_capital: f64,
    /// Cost per conversion in basis points; 0 is frictionless.
    #[serde(default)]
    pub cost_bps: f64,
}

fn default_capital() -> f64 {
    DEFAULT_CAPITAL
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_CAPITAL,
            cost_bps: 0.0,
        }
    }
}

/// Everything needed to reproduce one backtest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BacktestConfig {
    #[serde(default)]
    pub backtest: BacktestSection,
    #[serde(default)]
    pub strategy: StrategyConfig,
}

impl BacktestConfig {
    pub fn new(strategy: StrategyConfig) -> Self {
        Self {
            backtest: BacktestSection::default(),
            strategy,
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let capital = self.backtest.initial_capital;
        if !capital.is_finite() || capital <= 0.0 {
            return Err(ConfigError::InvalidCapital(capital));
        }
        let cost = self.backtest.cost_bps;
        if !cost.is_finite() || !(0.0..MAX_COST_BPS).contains(&cost) {
            return Err(ConfigError::InvalidCost(cost));
        }
        self.strategy.validate()?;
        Ok(())
    }

    pub fn cost_model(&self) -> CostModel {
        CostModel::new(self.backtest.cost_bps)
    }

    /// Deterministic hash of the configuration.
    ///
    /// Two runs with identical configs share a `RunId`.
    pub fn run_id(&self) -> RunId {
        let canonical = serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"));
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let config = BacktestConfig::from_toml(
            r#"
            [backtest]
            initial_capital = 50000.0
            cost_bps = 10.0

            [strategy]
            type = "revenue_trend"
            window_days = 14
            sma_days = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.backtest.initial_capital, 50_000.0);
        assert_eq!(config.backtest.cost_bps, 10.0);
        assert_eq!(
            config.strategy,
            StrategyConfig::RevenueTrend {
                window_days: 14,
                sma_days: 5
            }
        );
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = BacktestConfig::from_toml("").unwrap();
        assert_eq!(config, BacktestConfig::default());
        assert_eq!(config.backtest.initial_capital, DEFAULT_CAPITAL);
        assert_eq!(config.strategy, StrategyConfig::default());
    }

    #[test]
    fn ensemble_strategy_parses() {
        let config = BacktestConfig::from_toml(
            r#"
            [strategy]
            type = "ensemble_vote"
            trailing_stop_pct = 0.2
            "#,
        )
        .unwrap();
        assert_eq!(
            config.strategy,
            StrategyConfig::EnsembleVote {
                trailing_stop_pct: 0.2
            }
        );
    }

    #[test]
    fn rejects_bad_values() {
        let zero_capital = "[backtest]\ninitial_capital = 0.0\n";
        assert!(matches!(
            BacktestConfig::from_toml(zero_capital),
            Err(ConfigError::InvalidCapital(_))
        ));

        let negative_cost = "[backtest]\ncost_bps = -5.0\n";
        assert!(matches!(
            BacktestConfig::from_toml(negative_cost),
            Err(ConfigError::InvalidCost(_))
        ));

        let prohibitive_cost = "[backtest]\ncost_bps = 10000.0\n";
        assert!(matches!(
            BacktestConfig::from_toml(prohibitive_cost),
            Err(ConfigError::InvalidCost(_))
        ));

        let zero_window = "[strategy]\ntype = \"revenue_trend\"\nwindow_days = 0\nsma_days = 3\n";
        assert!(matches!(
            BacktestConfig::from_toml(zero_window),
            Err(ConfigError::Strategy(_))
        ));

        assert!(matches!(
            BacktestConfig::from_toml("[strategy]\ntype = \"moon\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn cost_bound_is_exclusive() {
        let mut config = BacktestConfig::default();
        config.backtest.cost_bps = 9_999.0;
        assert!(config.validate().is_ok());
        config.backtest.cost_bps = 20_000.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCost(c)) if c == 20_000.0
        ));
    }

    #[test]
    fn toml_round_trip() {
        let config = BacktestConfig::new(StrategyConfig::EnsembleVote {
            trailing_stop_pct: 0.1,
        });
        let text = config.to_toml().unwrap();
        assert_eq!(BacktestConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn run_id_is_deterministic_and_sensitive() {
        let a = BacktestConfig::default();
        let mut b = BacktestConfig::default();
        assert_eq!(a.run_id(), b.run_id());
        assert_eq!(a.run_id().len(), 64);

        b.backtest.cost_bps = 20.0;
        assert_ne!(a.run_id(), b.run_id());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = BacktestConfig::from_file(Path::new("/nonexistent/pumplab.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
