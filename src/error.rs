//! Error types for Synheart Stride
//!
//! Only the provider boundary can fail. Aggregation and risk scoring are total
//! over the canonical model and never return these errors.

use thiserror::Error;

/// Errors that can occur while turning provider payloads into reports
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid bucket timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}
