//! Daily step aggregation
//!
//! This module folds canonical provider buckets into the daily step series:
//! - One record per bucket, in bucket order
//! - Bucket start converted to a calendar date in the configured zone
//! - Nested sample counts summed with absent values treated as zero

use crate::error::ComputeError;
use crate::types::{DailyRecord, DailySeries, RawBucket};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};
use tracing::debug;

/// Zone used to turn a bucket start instant into a calendar date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CalendarZone {
    /// The process's local timezone
    #[default]
    Local,
    /// A fixed UTC offset
    Fixed(FixedOffset),
}

impl CalendarZone {
    pub fn utc() -> Self {
        CalendarZone::Fixed(Utc.fix())
    }

    /// Parse `Z`, `UTC`, `local`, or a `±HH:MM` offset
    pub fn parse(value: &str) -> Result<Self, ComputeError> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(CalendarZone::Local);
        }
        if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
            return Ok(Self::utc());
        }
        trimmed
            .parse::<FixedOffset>()
            .map(CalendarZone::Fixed)
            .map_err(|_| ComputeError::InvalidTimezone(value.to_string()))
    }

    /// Calendar date of an instant in this zone
    pub fn date_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        match self {
            CalendarZone::Local => instant.with_timezone(&Local).date_naive(),
            CalendarZone::Fixed(offset) => instant.with_timezone(offset).date_naive(),
        }
    }
}

/// Aggregator for converting buckets into a daily series
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    zone: CalendarZone,
}

impl Aggregator {
    /// Create an aggregator that dates buckets in the process's local zone
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(zone: CalendarZone) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> CalendarZone {
        self.zone
    }

    /// Aggregate buckets into a daily series
    ///
    /// Output has exactly one record per bucket, in input order. Duplicate
    /// dates are kept and missing days are not filled.
    pub fn aggregate(&self, buckets: &[RawBucket]) -> DailySeries {
        let records: Vec<DailyRecord> = buckets
            .iter()
            .map(|bucket| DailyRecord {
                date: self.zone.date_of(&bucket.start_time),
                steps: bucket_steps(bucket),
            })
            .collect();

        debug!(buckets = buckets.len(), "aggregated daily step series");

        DailySeries::new(records)
    }
}

/// Aggregate buckets using the process's local calendar
pub fn aggregate(buckets: &[RawBucket]) -> DailySeries {
    Aggregator::new().aggregate(buckets)
}

/// Total steps in a bucket.
///
/// Every level of the tree defaults to zero: an empty dataset, point, or value
/// list adds nothing and an absent count adds 0. Sums saturate, and a negative
/// total is clamped to 0.
pub fn bucket_steps(bucket: &RawBucket) -> u64 {
    let total = bucket
        .datasets
        .iter()
        .flat_map(|dataset| dataset.points.iter())
        .flat_map(|point| point.values.iter())
        .map(|value| value.count.unwrap_or(0))
        .fold(0i64, i64::saturating_add);

    total.max(0) as u64
}
