//! Dataset document — the JSON file the engine is fed from.
//!
//! Two shapes exist on disk:
//! - interactive: `{ "last_updated", "raw_data": [{date, price, revenue}, ...] }`
//! - precomputed: `{ "last_updated", "metrics", "chart_data", "daily_history" }`
//!
//! The interactive form is validated on load; a dataset that fails validation
//! never reaches the engine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{validate_series, DailyRecord, EquityPoint, SeriesError, Signal};

/// Errors from the dataset loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset unavailable from {url}: {reason}")]
    Unavailable { url: String, reason: String },

    #[error("malformed dataset JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("dataset has neither raw_data nor a precomputed report")]
    MissingPayload,

    #[error("invalid series: {0}")]
    InvalidSeries(#[from] SeriesError),
}

/// A loaded dataset: display timestamp plus one of the two payload shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "DatasetFile")]
pub struct Dataset {
    pub last_updated: String,
    /// Generated rather than fetched from the upstream APIs.
    pub synthetic: bool,
    pub payload: DatasetPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DatasetPayload {
    /// Daily series for interactive recomputation.
    Raw(Vec<DailyRecord>),
    /// Results computed offline; displayed as-is.
    Precomputed(PrecomputedReport),
}

/// Offline results in display form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecomputedReport {
    pub metrics: DisplayMetrics,
    pub chart_data: Vec<ChartRow>,
    /// Reverse-chronological table rows.
    #[serde(default)]
    pub daily_history: Vec<EquityPoint>,
}

/// Metrics pre-formatted for display (`"12.34%"`, `"1.25"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayMetrics {
    pub total_return: String,
    pub annual_return: String,
    pub volatility: String,
    pub sharpe: String,
    pub max_drawdown: String,
    pub win_rate: String,
    pub trades: usize,
}

/// One point of the strategy-vs-benchmark chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    pub date: NaiveDate,
    pub price: f64,
    pub strategy_equity: f64,
    pub benchmark_equity: f64,
    pub signal: Signal,
}

impl From<&EquityPoint> for ChartRow {
    fn from(p: &EquityPoint) -> Self {
        Self {
            date: p.date,
            price: p.price,
            strategy_equity: p.strategy_equity,
            benchmark_equity: p.benchmark_equity,
            signal: p.signal,
        }
    }
}

impl Dataset {
    pub fn raw(last_updated: impl Into<String>, records: Vec<DailyRecord>) -> Self {
        Self {
            last_updated: last_updated.into(),
            synthetic: false,
            payload: DatasetPayload::Raw(records),
        }
    }

    /// Mark the dataset as generated.
    pub fn into_synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    /// The daily series, if this is an interactive dataset.
    pub fn records(&self) -> Option<&[DailyRecord]> {
        match &self.payload {
            DatasetPayload::Raw(records) => Some(records),
            DatasetPayload::Precomputed(_) => None,
        }
    }

    pub fn is_precomputed(&self) -> bool {
        matches!(self.payload, DatasetPayload::Precomputed(_))
    }

    pub fn to_json_pretty(&self) -> Result<String, LoadError> {
        serde_json::to_string_pretty(self).map_err(LoadError::Malformed)
    }
}

// ─── Wire format ────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct DatasetFile {
    last_updated: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    synthetic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raw_data: Option<Vec<DailyRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metrics: Option<DisplayMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chart_data: Option<Vec<ChartRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    daily_history: Option<Vec<EquityPoint>>,
}

impl From<Dataset> for DatasetFile {
    fn from(d: Dataset) -> Self {
        match d.payload {
            DatasetPayload::Raw(records) => DatasetFile {
                last_updated: d.last_updated,
                synthetic: d.synthetic,
                raw_data: Some(records),
                metrics: None,
                chart_data: None,
                daily_history: None,
            },
            DatasetPayload::Precomputed(report) => DatasetFile {
                last_updated: d.last_updated,
                synthetic: d.synthetic,
                raw_data: None,
                metrics: Some(report.metrics),
                chart_data: Some(report.chart_data),
                daily_history: Some(report.daily_history),
            },
        }
    }
}

impl TryFrom<DatasetFile> for Dataset {
    type Error = LoadError;

    fn try_from(f: DatasetFile) -> Result<Self, LoadError> {
        let payload = match (f.raw_data, f.metrics, f.chart_data) {
            (Some(records), _, _) => {
                validate_series(&records)?;
                DatasetPayload::Raw(records)
            }
            (None, Some(metrics), Some(chart_data)) => {
                DatasetPayload::Precomputed(PrecomputedReport {
                    metrics,
                    chart_data,
                    daily_history: f.daily_history.unwrap_or_default(),
                })
            }
            _ => return Err(LoadError::MissingPayload),
        };
        Ok(Dataset {
            last_updated: f.last_updated,
            synthetic: f.synthetic,
            payload,
        })
    }
}

// ─── Loading ────────────────────────────────────────────────────────

/// Parse and validate a dataset document.
pub fn parse_dataset(json: &str) -> Result<Dataset, LoadError> {
    let file: DatasetFile = serde_json::from_str(json).map_err(LoadError::Malformed)?;
    Dataset::try_from(file)
}

/// Read a dataset from disk.
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = parse_dataset(&text)?;
    info!(
        path = %path.display(),
        last_updated = %dataset.last_updated,
        records = dataset.records().map_or(0, |r| r.len()),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Fetch a dataset over HTTP. A non-success status is `Unavailable`.
pub fn fetch_dataset(url: &str) -> Result<Dataset, LoadError> {
    let unavailable = |reason: String| LoadError::Unavailable {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| unavailable(e.to_string()))?;

    debug!(url, "fetching dataset");
    let resp = client.get(url).send().map_err(|e| unavailable(e.to_string()))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(unavailable(format!("HTTP {status}")));
    }
    let text = resp.text().map_err(|e| unavailable(e.to_string()))?;

    let dataset = parse_dataset(&text)?;
    info!(url, last_updated = %dataset.last_updated, "dataset fetched");
    Ok(dataset)
}

/// Write a dataset as pretty-printed JSON.
pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<(), LoadError> {
    let json = dataset.to_json_pretty()?;
    std::fs::write(path, json).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "dataset written");
    Ok(())
}

/// Deterministic BLAKE3 hash over every record, in series order.
pub fn dataset_hash(records: &[DailyRecord]) -> String {
    let mut hasher = blake3::Hasher::new();
    for r in records {
        hasher.update(r.date.to_string().as_bytes());
        hasher.update(&r.price.to_le_bytes());
        hasher.update(&r.revenue.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
