//! Dataset acquisition: file and HTTP loading, upstream refresh, synthetic series.

pub mod dataset;
pub mod sources;
pub mod synthetic;

pub use dataset::{
    dataset_hash, fetch_dataset, load_dataset, parse_dataset, write_dataset, ChartRow, Dataset,
    DatasetPayload, DisplayMetrics, LoadError, PrecomputedReport,
};
pub use sources::{build_dataset, fetch_upstream, merge_sources, SourceError};
pub use synthetic::{generate_series, is_synthetic, synthetic_dataset, SYNTHETIC_TAG};
