//! TradeRecord — a closed round trip delimited by signal transitions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A completed trade: `Flat -> Long` entry to `Long -> Flat` exit.
///
/// Entry and exit are measured in strategy equity on the days the signal
/// switched, so `return_pct` is the equity growth over the holding span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    // ── Entry ──
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_equity: f64,

    // ── Exit ──
    pub exit_index: usize,
    pub exit_date: NaiveDate,
    pub exit_equity: f64,

    /// `exit_equity / entry_equity - 1` (0.0 when entry equity is zero).
    pub return_pct: f64,
}

impl TradeRecord {
    pub fn is_winner(&self) -> bool {
        self.return_pct > 0.0
    }

    /// Days between the entry signal and the exit signal.
    pub fn days_held(&self) -> usize {
        self.exit_index.saturating_sub(self.entry_index)
    }
}
