//! Ensemble vote signal — majority of fixed revenue windows plus a trailing stop.
//!
//! The windows are fixed at 3, 7 and 14 days; the only free parameter is the
//! trailing-stop fraction. Each window votes when its recent mean revenue
//! exceeds the mean of the window before it. Two or more votes is momentum.
//!
//! Position state is an explicit two-state machine folded over the days:
//!
//! ```text
//!   Flat ──momentum──▶ Long{peak}
//!   Long ──drawdown > stop──▶ Flat   (checked first)
//!   Long ──no momentum──▶ Flat
//! ```
//!
//! The reference price for day `i` is `price[i - 1]`.

use crate::domain::{DailyRecord, Field, Signal};
use crate::indicators::{Indicator, TrailingMean};

use super::SignalGenerator;

/// Fixed vote windows, in days.
pub const ENSEMBLE_WINDOWS: [usize; 3] = [3, 7, 14];

/// Votes needed for momentum.
pub const MAJORITY: usize = 2;

/// Position state carried between days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnsembleState {
    Flat,
    Long { peak_price: f64 },
}

impl EnsembleState {
    /// Advance one day. Returns the next state and the signal to emit.
    pub fn step(self, momentum: bool, price: f64, trailing_stop_pct: f64) -> (Self, Signal) {
        match self {
            EnsembleState::Long { peak_price } => {
                let peak = if price > peak_price { price } else { peak_price };
                let drawdown = if peak > 0.0 {
                    (peak - price) / peak
                } else {
                    0.0
                };
                if drawdown > trailing_stop_pct || !momentum {
                    (EnsembleState::Flat, Signal::Flat)
                } else {
                    (EnsembleState::Long { peak_price: peak }, Signal::Long)
                }
            }
            EnsembleState::Flat => {
                if momentum {
                    (EnsembleState::Long { peak_price: price }, Signal::Long)
                } else {
                    (EnsembleState::Flat, Signal::Flat)
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnsembleVote {
    pub trailing_stop_pct: f64,
}

impl EnsembleVote {
    pub fn new(trailing_stop_pct: f64) -> Self {
        assert!(
            trailing_stop_pct.is_finite() && trailing_stop_pct > 0.0,
            "trailing_stop_pct must be a positive fraction"
        );
        Self { trailing_stop_pct }
    }

    pub fn default_params() -> Self {
        Self::new(0.15)
    }

    /// Votes cast per day (0..=3). Zero throughout the warmup.
    pub fn votes(&self, records: &[DailyRecord]) -> Vec<usize> {
        let n = records.len();
        let mut votes = vec![0usize; n];
        for w in ENSEMBLE_WINDOWS {
            let recent = TrailingMean::recent(Field::Revenue, w).compute(records);
            let prior = TrailingMean::prior(Field::Revenue, w).compute(records);
            for i in self.min_lookback()..n {
                if recent[i] > prior[i] {
                    votes[i] += 1;
                }
            }
        }
        votes
    }
}

impl SignalGenerator for EnsembleVote {
    fn name(&self) -> &str {
        "ensemble_vote"
    }

    fn min_lookback(&self) -> usize {
        ENSEMBLE_WINDOWS.iter().map(|w| 2 * w).max().unwrap_or(0)
    }

    fn generate(&self, records: &[DailyRecord]) -> Vec<Signal> {
        let n = records.len();
        let lookback = self.min_lookback();
        let votes = self.votes(records);

        let mut signals = vec![Signal::Flat; n.min(lookback)];
        signals.extend((lookback..n).scan(EnsembleState::Flat, |state, i| {
            let momentum = votes[i] >= MAJORITY;
            let (next, signal) = state.step(momentum, records[i - 1].price, self.trailing_stop_pct);
            *state = next;
            Some(signal)
        }));
        signals
    }
}
