//! vitalgrid - Aggregation and binning engine for wearable biometric data
//!
//! vitalgrid turns raw per-user time series (step counts, pulse readings,
//! alcohol-intake measurements) into chart-ready aggregates through a set of
//! pure transformations: grid binning → weekday folding → windowed
//! histograms → cross-metric correlation → report composition.
//!
//! ## Modules
//!
//! - **Grid Binner**: sparse 1-D and dense 2-D bucket-and-average primitives
//! - **Weekday Folder**: fixed-size weekday × time-of-day heatmap grids
//! - **Windowed Histograms**: "now"-anchored daily and monthly arrays
//! - **Correlator**: temporal join of alcohol events against activity
//! - **Analyzer**: composes everything into independently-gated reports

pub mod correlate;
pub mod error;
pub mod grid;
pub mod report;
pub mod schema;
pub mod store;
pub mod types;
pub mod weekly;
pub mod window;

pub use error::{StoreError, VizError};
pub use report::Analyzer;
pub use store::{MemoryStore, SampleStore};
pub use types::{
    ActivitySample, AnalyzerConfig, DrinkingSample, Figure, ReportBundle, ReportPayload,
    TimeRange, Trace,
};

// Schema exports
pub use schema::{RawSampleRecord, SampleBatch, SCHEMA_VERSION};

/// Crate version embedded in all report payloads
pub const VITALGRID_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "vitalgrid";
