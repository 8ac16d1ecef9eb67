//! PortfolioState — cash and units of a single all-in/all-out position.

/// Simulated account holding either cash or units, never both.
///
/// Starts fully in cash. Every transition converts the whole balance, so
/// after any `enter`/`exit` exactly one side is non-zero. Equity identity:
/// `equity(price) == cash + units * price`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub units: f64,
}

impl PortfolioState {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            units: 0.0,
        }
    }

    /// Holding units (long).
    pub fn is_long(&self) -> bool {
        self.units > 0.0
    }

    /// Convert all cash into units at `fill_price`.
    ///
    /// No-op when already long or when the fill price is not positive.
    pub fn enter(&mut self, fill_price: f64) {
        if self.is_long() || fill_price <= 0.0 {
            return;
        }
        self.units = self.cash / fill_price;
        self.cash = 0.0;
    }

    /// Convert all units into cash at `fill_price`. No-op when flat.
    ///
    /// A negative fill is treated as zero so cash never goes below 0.
    pub fn exit(&mut self, fill_price: f64) {
        if !self.is_long() {
            return;
        }
        self.cash = self.units * fill_price.max(0.0);
        self.units = 0.0;
    }

    /// Mark-to-market value at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.units * price
    }

    /// Fully in cash or fully invested.
    pub fn is_unlevered(&self) -> bool {
        self.cash == 0.0 || self.units == 0.0
    }
}
