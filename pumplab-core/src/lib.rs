//! PumpLab Core — daily series, rolling indicators, signal generators, simulator.
//!
//! This crate contains the heart of the backtesting engine:
//! - Domain types (daily records, signals, equity points, trades, portfolio state)
//! - Trailing-window indicators shared by every strategy
//! - Signal generators behind one trait, selected by configuration
//! - Single-pass portfolio simulator with a one-day execution lag
//! - Dataset loading, upstream refresh, and synthetic series

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod signals;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: all core types are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::DailyRecord>();
        require_sync::<domain::DailyRecord>();
        require_send::<domain::Signal>();
        require_sync::<domain::Signal>();
        require_send::<domain::EquityPoint>();
        require_sync::<domain::EquityPoint>();
        require_send::<domain::PortfolioState>();
        require_sync::<domain::PortfolioState>();
        require_send::<domain::TradeRecord>();
        require_sync::<domain::TradeRecord>();

        // Signals
        require_send::<signals::StrategyConfig>();
        require_sync::<signals::StrategyConfig>();
        require_send::<signals::RevenueTrend>();
        require_sync::<signals::RevenueTrend>();
        require_send::<signals::EnsembleVote>();
        require_sync::<signals::EnsembleVote>();
        require_send::<Box<dyn signals::SignalGenerator>>();
        require_sync::<Box<dyn signals::SignalGenerator>>();

        // Engine and data
        require_send::<engine::CostModel>();
        require_sync::<engine::CostModel>();
        require_send::<data::Dataset>();
        require_sync::<data::Dataset>();
    }

    /// Architecture contract: SignalGenerator never sees portfolio state.
    ///
    /// `generate()` takes only the record history. If a portfolio parameter is
    /// ever added, this stops compiling.
    #[test]
    fn signal_generator_trait_has_no_portfolio_parameter() {
        fn _check_trait_object_builds(
            sig: &dyn signals::SignalGenerator,
            records: &[domain::DailyRecord],
        ) -> Vec<domain::Signal> {
            sig.generate(records)
        }
    }
}
