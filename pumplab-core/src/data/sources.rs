//! Upstream sources for refreshing the dataset.
//!
//! Revenue comes from the DefiLlama daily-fees summary, price from the
//! CoinGecko market chart. Both are bucketed by UTC calendar date (the last
//! sample of a date wins) and merged on the dates present in both.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{validate_series, DailyRecord, SeriesError};

use super::dataset::Dataset;

pub const DEFILLAMA_FEES_URL: &str = "https://api.llama.fi/summary/fees/pump?dataType=dailyFees";
pub const COINGECKO_CHART_URL: &str =
    "https://api.coingecko.com/api/v3/coins/pump-fun/market_chart?vs_currency=usd&days=365";

/// Structured error types for upstream refresh.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("response format changed ({source_name}): {error}")]
    Format {
        source_name: &'static str,
        #[source]
        error: serde_json::Error,
    },

    #[error("timestamp {0} out of range")]
    BadTimestamp(f64),

    #[error("no dates in common between revenue and price data")]
    EmptyMerge,

    #[error("merged series invalid: {0}")]
    InvalidSeries(#[from] SeriesError),
}

#[derive(Debug, Deserialize)]
struct FeesSummary {
    #[serde(default, rename = "totalDataChart")]
    total_data_chart: Vec<(f64, f64)>,
}

#[derive(Debug, Deserialize)]
struct MarketChart {
    #[serde(default)]
    prices: Vec<(f64, f64)>,
}

fn utc_date(secs: f64) -> Result<NaiveDate, SourceError> {
    if !secs.is_finite() {
        return Err(SourceError::BadTimestamp(secs));
    }
    DateTime::<Utc>::from_timestamp(secs.floor() as i64, 0)
        .map(|dt| dt.date_naive())
        .ok_or(SourceError::BadTimestamp(secs))
}

/// Daily revenue by date from a `totalDataChart` of `[unix_secs, revenue]`.
pub fn parse_revenue_chart(json: &str) -> Result<BTreeMap<NaiveDate, f64>, SourceError> {
    let summary: FeesSummary = serde_json::from_str(json).map_err(|error| SourceError::Format {
        source_name: "defillama",
        error,
    })?;
    let mut by_date = BTreeMap::new();
    for (ts, revenue) in summary.total_data_chart {
        by_date.insert(utc_date(ts)?, revenue);
    }
    Ok(by_date)
}

/// Daily price by date from a `prices` array of `[unix_millis, price]`.
pub fn parse_price_chart(json: &str) -> Result<BTreeMap<NaiveDate, f64>, SourceError> {
    let chart: MarketChart = serde_json::from_str(json).map_err(|error| SourceError::Format {
        source_name: "coingecko",
        error,
    })?;
    let mut by_date = BTreeMap::new();
    for (ts_ms, price) in chart.prices {
        by_date.insert(utc_date(ts_ms / 1000.0)?, price);
    }
    Ok(by_date)
}

/// Join on dates present in both maps, ascending.
pub fn merge_sources(
    revenue: &BTreeMap<NaiveDate, f64>,
    price: &BTreeMap<NaiveDate, f64>,
) -> Vec<DailyRecord> {
    price
        .iter()
        .filter_map(|(date, &p)| revenue.get(date).map(|&r| DailyRecord::new(*date, p, r)))
        .collect()
}

/// Display timestamp written into refreshed datasets.
pub fn format_last_updated(now: DateTime<Utc>) -> String {
    format!("{} UTC", now.format("%Y-%m-%d %H:%M:%S"))
}

/// Merge both sources into a validated raw dataset stamped with `now`.
pub fn build_dataset(
    revenue: &BTreeMap<NaiveDate, f64>,
    price: &BTreeMap<NaiveDate, f64>,
    now: DateTime<Utc>,
) -> Result<Dataset, SourceError> {
    let records = merge_sources(revenue, price);
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Err(SourceError::EmptyMerge);
    };
    validate_series(&records)?;
    info!(
        rows = records.len(),
        from = %first.date,
        to = %last.date,
        "merged upstream data"
    );
    Ok(Dataset::raw(format_last_updated(now), records))
}

fn get_text(client: &reqwest::blocking::Client, url: &str) -> Result<String, SourceError> {
    let network = |e: reqwest::Error| SourceError::Network {
        url: url.to_string(),
        reason: e.to_string(),
    };
    let resp = client.get(url).send().map_err(network)?;
    let status = resp.status();
    if !status.is_success() {
        warn!(url, %status, "upstream fetch failed");
        return Err(SourceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    resp.text().map_err(network)
}

/// Fetch both upstream sources and build a fresh dataset. No retries.
pub fn fetch_upstream() -> Result<Dataset, SourceError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| SourceError::Network {
            url: String::new(),
            reason: e.to_string(),
        })?;

    let revenue = parse_revenue_chart(&get_text(&client, DEFILLAMA_FEES_URL)?)?;
    info!(days = revenue.len(), "fetched revenue");
    let price = parse_price_chart(&get_text(&client, COINGECKO_CHART_URL)?)?;
    info!(days = price.len(), "fetched prices");

    build_dataset(&revenue, &price, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // 2025-07-14 00:00:00 UTC
    const DAY0: f64 = 1_752_451_200.0;

    #[test]
    fn revenue_chart_buckets_by_utc_date() {
        let json = format!(
            r#"{{"totalDataChart": [[{}, 100.0], [{}, 250.5], [{}, 300.0]], "other": 1}}"#,
            DAY0,
            DAY0 + 86_400.0,
            DAY0 + 86_400.0 + 3_600.0
        );
        let rev = parse_revenue_chart(&json).unwrap();
        assert_eq!(rev.len(), 2);
        assert_eq!(rev[&d(2025, 7, 14)], 100.0);
        // later sample on the same date wins
        assert_eq!(rev[&d(2025, 7, 15)], 300.0);
    }

    #[test]
    fn price_chart_uses_milliseconds() {
        let json = format!(
            r#"{{"prices": [[{}, 0.004], [{}, 0.005]], "market_caps": []}}"#,
            DAY0 * 1000.0,
            (DAY0 + 86_399.0) * 1000.0
        );
        let price = parse_price_chart(&json).unwrap();
        assert_eq!(price.len(), 1);
        assert_eq!(price[&d(2025, 7, 14)], 0.005);
    }

    #[test]
    fn missing_arrays_are_empty() {
        assert!(parse_revenue_chart("{}").unwrap().is_empty());
        assert!(parse_price_chart("{}").unwrap().is_empty());
        assert!(matches!(
            parse_price_chart("[1, 2]"),
            Err(SourceError::Format {
                source_name: "coingecko",
                ..
            })
        ));
    }

    #[test]
    fn merge_keeps_intersection_in_order() {
        let revenue = BTreeMap::from([
            (d(2025, 1, 1), 10.0),
            (d(2025, 1, 2), 20.0),
            (d(2025, 1, 4), 40.0),
        ]);
        let price = BTreeMap::from([
            (d(2025, 1, 2), 2.0),
            (d(2025, 1, 3), 3.0),
            (d(2025, 1, 4), 4.0),
        ]);
        let merged = merge_sources(&revenue, &price);
        assert_eq!(
            merged,
            vec![
                DailyRecord::new(d(2025, 1, 2), 2.0, 20.0),
                DailyRecord::new(d(2025, 1, 4), 4.0, 40.0),
            ]
        );
    }

    #[test]
    fn build_stamps_utc_time() {
        let revenue = BTreeMap::from([(d(2025, 1, 1), 10.0)]);
        let price = BTreeMap::from([(d(2025, 1, 1), 1.0)]);
        let now = DateTime::<Utc>::from_timestamp(DAY0 as i64 + 6 * 3_600 + 5, 0).unwrap();
        let ds = build_dataset(&revenue, &price, now).unwrap();
        assert_eq!(ds.last_updated, "2025-07-14 06:00:05 UTC");
        assert_eq!(ds.records().unwrap().len(), 1);
    }

    #[test]
    fn empty_merge_is_an_error() {
        let revenue = BTreeMap::from([(d(2025, 1, 1), 10.0)]);
        let price = BTreeMap::from([(d(2025, 1, 2), 1.0)]);
        assert!(matches!(
            build_dataset(&revenue, &price, Utc::now()),
            Err(SourceError::EmptyMerge)
        ));
    }
}
