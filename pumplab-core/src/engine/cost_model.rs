//! Cost model — per-side transaction cost applied to the execution price.
//!
//! Costs are directional: buyers pay more, sellers receive less.

use serde::{Deserialize, Serialize};

/// A cost at or above this many basis points would make every sale free.
pub const MAX_COST_BPS: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    /// Cost per side in basis points (10 bps = 0.1%).
    pub cost_bps: f64,
}

impl CostModel {
    pub fn new(cost_bps: f64) -> Self {
        Self { cost_bps }
    }

    pub fn frictionless() -> Self {
        Self::new(0.0)
    }

    pub fn fraction(&self) -> f64 {
        self.cost_bps / 10_000.0
    }

    /// Effective price when converting cash into units.
    pub fn buy_price(&self, raw_price: f64) -> f64 {
        raw_price * (1.0 + self.fraction())
    }

    /// Effective price when converting units into cash. Never negative.
    pub fn sell_price(&self, raw_price: f64) -> f64 {
        (raw_price * (1.0 - self.fraction())).max(0.0)
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::frictionless()
    }
}
