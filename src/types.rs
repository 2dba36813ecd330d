//! Core types for the Synheart Stride pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: canonical buckets, the daily step series, the risk assessment, and
//! the outbound report.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Single sample value inside a data point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleValue {
    /// Integer count carried by the sample (absent counts contribute zero)
    pub count: Option<i64>,
}

impl SampleValue {
    pub fn new(count: i64) -> Self {
        Self { count: Some(count) }
    }
}

/// Data point holding zero or more sample values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPoint {
    pub values: Vec<SampleValue>,
}

/// Dataset holding zero or more data points
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub points: Vec<DataPoint>,
}

/// Canonical provider bucket: one time window of nested activity samples
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBucket {
    /// Start of the bucket window (UTC)
    pub start_time: DateTime<Utc>,
    /// Nested datasets in provider order
    pub datasets: Vec<Dataset>,
}

impl RawBucket {
    pub fn new(start_time: DateTime<Utc>, datasets: Vec<Dataset>) -> Self {
        Self {
            start_time,
            datasets,
        }
    }

    /// Build a bucket from epoch milliseconds.
    ///
    /// Returns `None` for negative or unrepresentable timestamps.
    pub fn from_millis(start_time_millis: i64, datasets: Vec<Dataset>) -> Option<Self> {
        if start_time_millis < 0 {
            return None;
        }
        DateTime::<Utc>::from_timestamp_millis(start_time_millis)
            .map(|start_time| Self::new(start_time, datasets))
    }
}

/// One day of aggregated steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Calendar date (serialized as YYYY-MM-DD)
    pub date: NaiveDate,
    /// Total steps for the day
    pub steps: u64,
}

/// Ordered daily step series, one record per provider bucket
///
/// An empty series is a valid result and means no data was available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailySeries {
    records: Vec<DailyRecord>,
}

impl DailySeries {
    pub fn new(records: Vec<DailyRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DailyRecord> {
        self.records.iter()
    }

    /// Step counts in series order
    pub fn steps(&self) -> impl Iterator<Item = u64> + '_ {
        self.records.iter().map(|r| r.steps)
    }

    pub fn into_records(self) -> Vec<DailyRecord> {
        self.records
    }

    /// Parse the outbound `[{"date": "...", "steps": n}, ...]` form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to the outbound `[{"date": "...", "steps": n}, ...]` form
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<Vec<DailyRecord>> for DailySeries {
    fn from(records: Vec<DailyRecord>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a DailySeries {
    type Item = &'a DailyRecord;
    type IntoIter = std::slice::Iter<'a, DailyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Named behavioral risk factor
///
/// Declaration order is the recommendation priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    SedentaryLifestyle,
    InconsistentActivity,
    FrequentInactivity,
}

impl RiskFactor {
    /// All factors in priority order
    pub const ALL: [RiskFactor; 3] = [
        RiskFactor::SedentaryLifestyle,
        RiskFactor::InconsistentActivity,
        RiskFactor::FrequentInactivity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskFactor::SedentaryLifestyle => "sedentary_lifestyle",
            RiskFactor::InconsistentActivity => "inconsistent_activity",
            RiskFactor::FrequentInactivity => "frequent_inactivity",
        }
    }
}

/// Factor flags keyed by factor name
///
/// Empty when no data was analyzed; otherwise every factor is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskFactors(BTreeMap<RiskFactor, bool>);

impl RiskFactors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, factor: RiskFactor, flagged: bool) {
        self.0.insert(factor, flagged);
    }

    /// Flag value, or `None` when the factor was not evaluated
    pub fn get(&self, factor: RiskFactor) -> Option<bool> {
        self.0.get(&factor).copied()
    }

    pub fn is_flagged(&self, factor: RiskFactor) -> bool {
        self.get(factor).unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Flagged factors in priority order
    pub fn flagged(&self) -> impl Iterator<Item = RiskFactor> + '_ {
        self.0
            .iter()
            .filter(|(_, flagged)| **flagged)
            .map(|(factor, _)| *factor)
    }
}

/// Structured suggestion tied to one triggered risk factor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub suggestion: String,
    pub action_items: Vec<String>,
}

/// Risk score, factor flags, and recommendations for one series
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Sum of weights of the flagged factors (0-100)
    pub risk_score: u8,
    pub risk_factors: RiskFactors,
    pub recommendations: Vec<Recommendation>,
}

impl RiskAssessment {
    /// Assessment returned when there is no data to analyze
    pub fn no_data() -> Self {
        Self::default()
    }
}

/// Outbound report handed to presentation clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub fitness_data: DailySeries,
    pub health_analysis: RiskAssessment,
}

/// Report producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Report wrapped with producer provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEnvelope {
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub report: HealthReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_series_serializes_iso_dates() {
        let series = DailySeries::new(vec![
            DailyRecord {
                date: date(2024, 1, 15),
                steps: 8500,
            },
            DailyRecord {
                date: date(2024, 1, 16),
                steps: 0,
            },
        ]);

        let json = series.to_json().unwrap();
        assert_eq!(
            json,
            r#"[{"date":"2024-01-15","steps":8500},{"date":"2024-01-16","steps":0}]"#
        );
    }

    #[test]
    fn test_series_round_trip() {
        let series = DailySeries::new(vec![
            DailyRecord {
                date: date(2023, 12, 31),
                steps: 12_034,
            },
            DailyRecord {
                date: date(2024, 2, 29),
                steps: 4_999,
            },
            DailyRecord {
                date: date(2024, 2, 29),
                steps: 7,
            },
        ]);

        let parsed = DailySeries::from_json(&series.to_json().unwrap()).unwrap();
        assert_eq!(parsed, series);
    }

    #[test]
    fn test_empty_assessment_shape() {
        let json = serde_json::to_value(RiskAssessment::no_data()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "risk_score": 0,
                "risk_factors": {},
                "recommendations": []
            })
        );
    }

    #[test]
    fn test_risk_factors_keyed_by_name() {
        let mut factors = RiskFactors::new();
        factors.insert(RiskFactor::FrequentInactivity, false);
        factors.insert(RiskFactor::SedentaryLifestyle, true);
        factors.insert(RiskFactor::InconsistentActivity, false);

        let json = serde_json::to_string(&factors).unwrap();
        assert_eq!(
            json,
            r#"{"sedentary_lifestyle":true,"inconsistent_activity":false,"frequent_inactivity":false}"#
        );

        let parsed: RiskFactors = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, factors);
        assert_eq!(
            parsed.flagged().collect::<Vec<_>>(),
            vec![RiskFactor::SedentaryLifestyle]
        );
    }

    #[test]
    fn test_bucket_from_millis() {
        let bucket = RawBucket::from_millis(1_705_276_800_000, vec![]).unwrap();
        assert_eq!(bucket.start_time.date_naive(), date(2024, 1, 15));

        assert!(RawBucket::from_millis(-1, vec![]).is_none());
        assert!(RawBucket::from_millis(i64::MAX, vec![]).is_none());
    }
}
