//! Revenue trend signal — rising revenue gated by a price uptrend filter.
//!
//! For each day `i` past the warmup:
//! - `recent` = mean revenue over `[i - w, i)`
//! - `prior`  = mean revenue over `[i - 2w, i - w)`
//! - `uptrend` = `price[i - 1] >= 0.95 * SMA(price, sma_days)` over `[i - sma_days, i)`
//!
//! `recent > prior` with an uptrend goes Long; a revenue decline or a broken
//! uptrend goes Flat; an exact revenue tie under an uptrend keeps yesterday's
//! signal.

use crate::domain::{DailyRecord, Field, Signal};
use crate::indicators::{Indicator, TrailingMean};

use super::SignalGenerator;

/// Price may sit up to 5% under its SMA and still count as an uptrend.
pub const TREND_TOLERANCE: f64 = 0.95;

#[derive(Debug, Clone)]
pub struct RevenueTrend {
    pub window_days: usize,
    pub sma_days: usize,
}

impl RevenueTrend {
    pub fn new(window_days: usize, sma_days: usize) -> Self {
        assert!(window_days >= 1, "window_days must be >= 1");
        assert!(sma_days >= 1, "sma_days must be >= 1");
        Self {
            window_days,
            sma_days,
        }
    }

    pub fn default_params() -> Self {
        Self::new(21, 3)
    }
}

impl SignalGenerator for RevenueTrend {
    fn name(&self) -> &str {
        "revenue_trend"
    }

    fn min_lookback(&self) -> usize {
        (2 * self.window_days).max(self.sma_days)
    }

    fn generate(&self, records: &[DailyRecord]) -> Vec<Signal> {
        let n = records.len();
        let mut signals = vec![Signal::Flat; n];

        let recent = TrailingMean::recent(Field::Revenue, self.window_days).compute(records);
        let prior = TrailingMean::prior(Field::Revenue, self.window_days).compute(records);
        let sma = TrailingMean::recent(Field::Price, self.sma_days).compute(records);

        for i in self.min_lookback()..n {
            let uptrend = records[i - 1].price >= TREND_TOLERANCE * sma[i];
            signals[i] = if recent[i] > prior[i] && uptrend {
                Signal::Long
            } else if recent[i] < prior[i] || !uptrend {
                Signal::Flat
            } else {
                signals[i - 1]
            };
        }

        signals
    }
}
