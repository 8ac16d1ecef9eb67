//! DailyRecord — the fundamental input unit: one day of price and revenue.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One calendar day of token price and protocol revenue.
///
/// The ordering of a `&[DailyRecord]` slice is the time axis. Records are
/// never mutated once loaded; every engine run reads them immutably.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub price: f64,
    pub revenue: f64,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, price: f64, revenue: f64) -> Self {
        Self {
            date,
            price,
            revenue,
        }
    }

    /// Positive finite price and non-negative finite revenue.
    pub fn is_sane(&self) -> bool {
        self.price.is_finite() && self.price > 0.0 && self.revenue.is_finite() && self.revenue >= 0.0
    }
}

/// Which numeric column of a record an indicator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Price,
    Revenue,
}

impl Field {
    pub fn of(self, record: &DailyRecord) -> f64 {
        match self {
            Field::Price => record.price,
            Field::Revenue => record.revenue,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Price => "price",
            Field::Revenue => "revenue",
        }
    }
}

/// Structural problems with an input series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("record {index} ({date}): price must be positive and finite, got {price}")]
    InvalidPrice {
        index: usize,
        date: NaiveDate,
        price: f64,
    },

    #[error("record {index} ({date}): revenue must be non-negative and finite, got {revenue}")]
    InvalidRevenue {
        index: usize,
        date: NaiveDate,
        revenue: f64,
    },

    #[error("record {index}: date {date} does not come after {previous}")]
    NotAscending {
        index: usize,
        date: NaiveDate,
        previous: NaiveDate,
    },
}

/// Check the series invariants: strictly ascending unique dates, positive
/// prices, non-negative revenue. Reports the first violation.
pub fn validate_series(records: &[DailyRecord]) -> Result<(), SeriesError> {
    for (index, record) in records.iter().enumerate() {
        if !(record.price.is_finite() && record.price > 0.0) {
            return Err(SeriesError::InvalidPrice {
                index,
                date: record.date,
                price: record.price,
            });
        }
        if !(record.revenue.is_finite() && record.revenue >= 0.0) {
            return Err(SeriesError::InvalidRevenue {
                index,
                date: record.date,
                revenue: record.revenue,
            });
        }
        if index > 0 {
            let previous = records[index - 1].date;
            if record.date <= previous {
                return Err(SeriesError::NotAscending {
                    index,
                    date: record.date,
                    previous,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn record_is_sane() {
        assert!(DailyRecord::new(day(1), 0.005, 1_000_000.0).is_sane());
        assert!(DailyRecord::new(day(1), 0.005, 0.0).is_sane());
        assert!(!DailyRecord::new(day(1), 0.0, 10.0).is_sane());
        assert!(!DailyRecord::new(day(1), 1.0, -1.0).is_sane());
        assert!(!DailyRecord::new(day(1), f64::NAN, 1.0).is_sane());
    }

    #[test]
    fn field_selects_column() {
        let r = DailyRecord::new(day(1), 2.0, 300.0);
        assert_eq!(Field::Price.of(&r), 2.0);
        assert_eq!(Field::Revenue.of(&r), 300.0);
    }

    #[test]
    fn validate_accepts_ascending_series() {
        let records = vec![
            DailyRecord::new(day(1), 1.0, 10.0),
            DailyRecord::new(day(2), 1.1, 12.0),
            DailyRecord::new(day(5), 1.2, 0.0),
        ];
        assert_eq!(validate_series(&records), Ok(()));
        assert_eq!(validate_series(&[]), Ok(()));
    }

    #[test]
    fn validate_rejects_duplicate_dates() {
        let records = vec![
            DailyRecord::new(day(1), 1.0, 10.0),
            DailyRecord::new(day(1), 1.1, 12.0),
        ];
        assert!(matches!(
            validate_series(&records),
            Err(SeriesError::NotAscending { index: 1, .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_price_and_revenue() {
        let bad_price = vec![DailyRecord::new(day(1), -1.0, 10.0)];
        assert!(matches!(
            validate_series(&bad_price),
            Err(SeriesError::InvalidPrice { index: 0, .. })
        ));

        let bad_revenue = vec![
            DailyRecord::new(day(1), 1.0, 10.0),
            DailyRecord::new(day(2), 1.0, f64::INFINITY),
        ];
        assert!(matches!(
            validate_series(&bad_revenue),
            Err(SeriesError::InvalidRevenue { index: 1, .. })
        ));
    }

    #[test]
    fn record_serialization_roundtrip() {
        let r = DailyRecord::new(day(3), 0.0042, 1_234_567.5);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"date\":\"2025-01-03\""));
        let back: DailyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
