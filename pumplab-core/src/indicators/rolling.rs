//! Trailing window mean — the rolling primitive shared by every signal.
//!
//! The value at day `i` is the mean of one field over `[i - lag - period, i - lag)`,
//! i.e. it ends strictly before `i`. With `lag = 0` this is "the most recent
//! `period` days"; with `lag = period` it is "the `period` days before that".
//! First valid index: `lag + period`.
//!
//! Each window is summed directly, left to right. A running add/subtract sum
//! drifts by a few ulps, which turns exact revenue ties into spurious
//! comparisons.

use crate::domain::{DailyRecord, Field};

use super::Indicator;

#[derive(Debug, Clone)]
pub struct TrailingMean {
    field: Field,
    period: usize,
    lag: usize,
    name: String,
}

impl TrailingMean {
    pub fn new(field: Field, period: usize, lag: usize) -> Self {
        assert!(period >= 1, "trailing mean period must be >= 1");
        Self {
            field,
            period,
            lag,
            name: format!("{}_mean_{period}_lag_{lag}", field.as_str()),
        }
    }

    /// Mean over the `period` days ending the day before.
    pub fn recent(field: Field, period: usize) -> Self {
        Self::new(field, period, 0)
    }

    /// Mean over the `period` days preceding the recent window.
    pub fn prior(field: Field, period: usize) -> Self {
        Self::new(field, period, period)
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Value at a single index, or `None` before the window is populated.
    pub fn value_at(&self, records: &[DailyRecord], index: usize) -> Option<f64> {
        let end = index.checked_sub(self.lag)?;
        let start = end.checked_sub(self.period)?;
        if end > records.len() {
            return None;
        }
        let values: Vec<f64> = records[start..end].iter().map(|r| self.field.of(r)).collect();
        Some(window_mean(&values))
    }
}

impl Indicator for TrailingMean {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.lag + self.period
    }

    fn compute(&self, records: &[DailyRecord]) -> Vec<f64> {
        let values: Vec<f64> = records.iter().map(|r| self.field.of(r)).collect();
        let first_valid = self.lookback();
        (0..records.len())
            .map(|i| {
                if i < first_valid {
                    f64::NAN
                } else {
                    let end = i - self.lag;
                    window_mean(&values[end - self.period..end])
                }
            })
            .collect()
    }
}

/// Arithmetic mean of a window; `0.0` for an empty window.
pub fn window_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0;
    for v in values {
        sum += v;
    }
    sum / values.len() as f64
}
