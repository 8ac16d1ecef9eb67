//! Domain types for PumpLab

pub mod equity;
pub mod portfolio;
pub mod record;
pub mod signal;
pub mod trade;

pub use equity::{benchmark_curve, round_cents, strategy_curve, EquityPoint};
pub use portfolio::PortfolioState;
pub use record::{validate_series, DailyRecord, Field, SeriesError};
pub use signal::{count_switches, InvalidSignal, Signal};
pub use trade::TradeRecord;
