//! Google Fit provider adapter
//!
//! Parses `users.dataset.aggregate` responses and maps them to canonical buckets.

use crate::error::ComputeError;
use crate::types::{DataPoint, Dataset, RawBucket, SampleValue};
use chrono::{DateTime, Days, Utc};
use serde::Deserialize;
use tracing::debug;

use super::ProviderPayloadAdapter;

/// Aggregated data type requested from the provider
pub const STEP_DATA_TYPE: &str = "com.google.step_count.delta";
/// Merged step source used by the provider's own apps
pub const STEP_DATA_SOURCE: &str =
    "derived:com.google.step_count.delta:com.google.android.gms:estimated_steps";
/// Bucket duration for daily aggregation
pub const DAY_MILLIS: i64 = 86_400_000;
/// Rolling window requested by default
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Google Fit payload adapter
pub struct GoogleFitAdapter;

impl ProviderPayloadAdapter for GoogleFitAdapter {
    fn parse(&self, raw_json: &str) -> Result<Vec<RawBucket>, ComputeError> {
        let payload: FitAggregateResponse = serde_json::from_str(raw_json)?;

        let buckets = payload
            .bucket
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, bucket)| convert_bucket(index, bucket))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(buckets = buckets.len(), "parsed google fit payload");

        Ok(buckets)
    }
}

fn convert_bucket(index: usize, bucket: FitBucket) -> Result<RawBucket, ComputeError> {
    let start_millis = bucket
        .start_time_millis
        .ok_or_else(|| ComputeError::MissingField(format!("bucket[{index}].startTimeMillis")))?
        .as_millis()
        .ok_or_else(|| {
            ComputeError::InvalidTimestamp(format!(
                "bucket[{index}].startTimeMillis is not an epoch-millisecond integer"
            ))
        })?;

    let datasets = bucket
        .dataset
        .unwrap_or_default()
        .into_iter()
        .map(|dataset| Dataset {
            points: dataset
                .point
                .unwrap_or_default()
                .into_iter()
                .map(|point| DataPoint {
                    values: point
                        .value
                        .unwrap_or_default()
                        .into_iter()
                        .map(|value| SampleValue {
                            count: value.int_val,
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    RawBucket::from_millis(start_millis, datasets).ok_or_else(|| {
        ComputeError::InvalidTimestamp(format!(
            "bucket[{index}].startTimeMillis out of range: {start_millis}"
        ))
    })
}

/// Build the aggregate request body for a daily step window ending at `end`
///
/// Fails when the window is negative or its start falls outside the
/// representable date range.
pub fn aggregate_request(
    end: DateTime<Utc>,
    window_days: i64,
) -> Result<serde_json::Value, ComputeError> {
    let start = u64::try_from(window_days)
        .ok()
        .and_then(|days| end.checked_sub_days(Days::new(days)))
        .ok_or_else(|| {
            ComputeError::InvalidTimestamp(format!(
                "request window of {window_days} days before {end} is out of range"
            ))
        })?;

    Ok(serde_json::json!({
        "aggregateBy": [{
            "dataTypeName": STEP_DATA_TYPE,
            "dataSourceId": STEP_DATA_SOURCE
        }],
        "bucketByTime": { "durationMillis": DAY_MILLIS },
        "startTimeMillis": start.timestamp_millis(),
        "endTimeMillis": end.timestamp_millis()
    }))
}

// Google Fit API response structures

#[derive(Debug, Deserialize)]
struct FitAggregateResponse {
    bucket: Option<Vec<FitBucket>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FitBucket {
    start_time_millis: Option<FitMillis>,
    dataset: Option<Vec<FitDataset>>,
}

/// Epoch milliseconds; the API encodes int64 as strings, but plain integers
/// are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FitMillis {
    Int(i64),
    Unsigned(u64),
    Text(String),
}

impl FitMillis {
    fn as_millis(&self) -> Option<i64> {
        match self {
            FitMillis::Int(ms) => Some(*ms),
            FitMillis::Unsigned(_) => None,
            FitMillis::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FitDataset {
    point: Option<Vec<FitPoint>>,
}

#[derive(Debug, Deserialize)]
struct FitPoint {
    value: Option<Vec<FitValue>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FitValue {
    int_val: Option<i64>,
}
