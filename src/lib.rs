//! Synheart Stride - On-device step aggregation and activity risk scoring
//!
//! Stride turns provider step buckets into a daily step series and scores it
//! through a deterministic pipeline: provider adaptation → daily aggregation
//! → step statistics → rule-based risk scoring → report encoding.
//!
//! ## Modules
//!
//! - **Aggregation**: Fold nested provider buckets into one record per day
//! - **Risk Analysis**: Score the series and attach recommendations

pub mod adapters;
pub mod aggregator;
pub mod encoder;
pub mod error;
pub mod features;
pub mod pipeline;
pub mod risk;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use aggregator::{aggregate, Aggregator, CalendarZone};
pub use error::ComputeError;
pub use pipeline::{assess_series_json, google_fit_to_report, HealthPipeline};
pub use risk::{analyze, RiskAnalyzer};
pub use types::{DailyRecord, DailySeries, HealthReport, RawBucket, RiskAssessment};

/// Stride version embedded in report envelopes
pub const STRIDE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report envelopes
pub const PRODUCER_NAME: &str = "synheart-stride";
