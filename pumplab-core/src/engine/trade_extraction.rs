//! Trade extraction — converts the signal column of a history into round trips.
//!
//! Post-processes the equity history after simulation. Pure function:
//! equity points → trade records.
//!
//! A trade opens on a `Flat -> Long` transition (the state before day 0 is
//! `Flat`) and closes on the next `Long -> Flat` transition. Entry and exit
//! equity are the strategy equity on the transition days. A trade still open
//! at the end of the history is not reported.

use crate::domain::{EquityPoint, Signal, TradeRecord};

/// State for an open trade being tracked during extraction.
struct OpenTrade {
    index: usize,
    date: chrono::NaiveDate,
    equity: f64,
}

/// Extract closed round-trip trades from an equity history.
pub fn extract_trades(history: &[EquityPoint]) -> Vec<TradeRecord> {
    let mut trades = Vec::new();
    let mut open: Option<OpenTrade> = None;
    let mut prev = Signal::Flat;

    for (i, point) in history.iter().enumerate() {
        match (prev, point.signal) {
            (Signal::Flat, Signal::Long) => {
                open = Some(OpenTrade {
                    index: i,
                    date: point.date,
                    equity: point.strategy_equity,
                });
            }
            (Signal::Long, Signal::Flat) => {
                if let Some(entry) = open.take() {
                    trades.push(close_trade(entry, i, point));
                }
            }
            _ => {}
        }
        prev = point.signal;
    }

    trades
}

fn close_trade(entry: OpenTrade, exit_index: usize, exit: &EquityPoint) -> TradeRecord {
    let return_pct = if entry.equity != 0.0 {
        exit.strategy_equity / entry.equity - 1.0
    } else {
        0.0
    };
    TradeRecord {
        entry_index: entry.index,
        entry_date: entry.date,
        entry_equity: entry.equity,
        exit_index,
        exit_date: exit.date,
        exit_equity: exit.strategy_equity,
        return_pct,
    }
}
