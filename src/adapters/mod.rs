//! Provider payload adapters
//!
//! This module provides adapters that parse raw provider JSON payloads and map
//! them to canonical buckets. Provider field names stay inside the adapters.

mod google_fit;

pub use google_fit::{
    aggregate_request, GoogleFitAdapter, DAY_MILLIS, DEFAULT_WINDOW_DAYS, STEP_DATA_SOURCE,
    STEP_DATA_TYPE,
};

use crate::error::ComputeError;
use crate::types::RawBucket;

/// Trait for provider payload adapters
pub trait ProviderPayloadAdapter {
    /// Parse raw JSON and convert to canonical buckets
    fn parse(&self, raw_json: &str) -> Result<Vec<RawBucket>, ComputeError>;
}
