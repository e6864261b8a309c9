//! Error types for vitalgrid

use thiserror::Error;

/// Errors reported by a [`SampleStore`](crate::store::SampleStore) backend.
///
/// These propagate unchanged through the analysis layer; the core performs
/// no retries.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Sample store unavailable: {0}")]
    Unavailable(String),

    #[error("Sample query failed: {0}")]
    Query(String),
}

/// Errors that can occur while building reports
#[derive(Debug, Error)]
pub enum VizError {
    #[error("Sample store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
