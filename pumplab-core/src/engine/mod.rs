//! Backtesting engine — single-pass portfolio simulation and trade extraction.
//!
//! The engine consumes a validated daily series and an index-aligned signal
//! column, then:
//!
//! 1. Simulates the all-in/all-out portfolio with a one-day execution lag
//! 2. Marks strategy and buy-and-hold benchmark equity to market each day
//! 3. Extracts closed round trips from the signal transitions
//!
//! Each run starts from fresh state; nothing carries over between runs.

pub mod cost_model;
pub mod simulator;
pub mod trade_extraction;

pub use cost_model::{CostModel, MAX_COST_BPS};
pub use simulator::{simulate, simulate_with_costs, SimulationError};
pub use trade_extraction::extract_trades;
