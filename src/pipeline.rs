//! Pipeline orchestration
//!
//! This module provides the public API for Synheart Stride.
//! It orchestrates the full pipeline from raw provider JSON to the health report.

use crate::adapters::{GoogleFitAdapter, ProviderPayloadAdapter};
use crate::aggregator::{Aggregator, CalendarZone};
use crate::encoder::ReportEncoder;
use crate::error::ComputeError;
use crate::risk::RiskAnalyzer;
use crate::types::{DailySeries, HealthReport, ReportEnvelope};
use tracing::{debug, warn};

/// Convert a raw Google Fit aggregate response into a health report JSON.
///
/// Buckets are dated in the process's local timezone.
///
/// # Arguments
/// * `raw_json` - Raw `dataset.aggregate` response JSON
///
/// # Returns
/// Compact JSON of `{"fitness_data": [...], "health_analysis": {...}}`
///
/// # Example
/// ```ignore
/// let report_json = google_fit_to_report(response_json)?;
/// ```
pub fn google_fit_to_report(raw_json: String) -> Result<String, ComputeError> {
    let pipeline = HealthPipeline::new();
    let report = pipeline.process_google_fit(&raw_json)?;
    pipeline.encoder.encode_to_json(&report)
}

/// Assess an already aggregated daily series given as outbound JSON.
///
/// # Arguments
/// * `series_json` - `[{"date": "YYYY-MM-DD", "steps": n}, ...]`
pub fn assess_series_json(series_json: &str) -> Result<String, ComputeError> {
    let series = DailySeries::from_json(series_json)?;
    let pipeline = HealthPipeline::new();
    let report = pipeline.process_series(series);
    pipeline.encoder.encode_to_json(&report)
}

/// Configured aggregation and scoring pipeline.
///
/// Stages:
/// 1. ProviderPayloadAdapter - Parse provider JSON into canonical buckets
/// 2. Aggregator - Fold buckets into a daily series
/// 3. RiskAnalyzer - Score the series and build recommendations
/// 4. ReportEncoder - Assemble the outbound report
pub struct HealthPipeline {
    aggregator: Aggregator,
    analyzer: RiskAnalyzer,
    encoder: ReportEncoder,
}

impl Default for HealthPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthPipeline {
    /// Create a pipeline that dates buckets in the local timezone
    pub fn new() -> Self {
        Self {
            aggregator: Aggregator::new(),
            analyzer: RiskAnalyzer::new(),
            encoder: ReportEncoder::new(),
        }
    }

    /// Create a pipeline that dates buckets in the given zone
    pub fn with_zone(zone: CalendarZone) -> Self {
        Self {
            aggregator: Aggregator::with_zone(zone),
            ..Self::new()
        }
    }

    /// Replace the scoring analyzer
    pub fn with_analyzer(mut self, analyzer: RiskAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn encoder(&self) -> &ReportEncoder {
        &self.encoder
    }

    /// Process a Google Fit aggregate response
    pub fn process_google_fit(&self, raw_json: &str) -> Result<HealthReport, ComputeError> {
        self.process_with_adapter(&GoogleFitAdapter, raw_json)
    }

    /// Process a Google Fit response, falling back to the no-data report when
    /// the payload cannot be read.
    pub fn process_google_fit_or_empty(&self, raw_json: &str) -> HealthReport {
        match self.process_google_fit(raw_json) {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "provider payload rejected, reporting without data");
                self.process_series(DailySeries::empty())
            }
        }
    }

    /// Score an already aggregated series
    pub fn process_series(&self, series: DailySeries) -> HealthReport {
        let assessment = self.analyzer.analyze(&series);
        self.encoder.encode(series, assessment)
    }

    /// Wrap a report with this pipeline's producer metadata
    pub fn envelope(&self, report: HealthReport) -> ReportEnvelope {
        self.encoder.envelope(report)
    }

    fn process_with_adapter(
        &self,
        adapter: &dyn ProviderPayloadAdapter,
        raw_json: &str,
    ) -> Result<HealthReport, ComputeError> {
        let buckets = adapter.parse(raw_json)?;
        let series = self.aggregator.aggregate(&buckets);

        debug!(days = series.len(), "processing daily series");

        Ok(self.process_series(series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RiskAssessment, RiskFactor};
    use pretty_assertions::assert_eq;

    // Thirty daily buckets starting 2024-01-01T00:00:00Z
    fn sample_response(daily_steps: impl Fn(i64) -> i64) -> String {
        let buckets: Vec<serde_json::Value> = (0..30)
            .map(|day| {
                let start = 1_704_067_200_000i64 + day * 86_400_000;
                serde_json::json!({
                    "startTimeMillis": start.to_string(),
                    "endTimeMillis": (start + 86_400_000).to_string(),
                    "dataset": [{
                        "point": [{
                            "value": [{ "intVal": daily_steps(day) }]
                        }]
                    }]
                })
            })
            .collect();

        serde_json::json!({ "bucket": buckets }).to_string()
    }

    #[test]
    fn test_google_fit_to_report() {
        let json = google_fit_to_report(sample_response(|_| 6000)).unwrap();
        let report: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(report["fitness_data"].as_array().unwrap().len(), 30);
        assert_eq!(report["fitness_data"][0]["steps"], 6000);
        assert_eq!(report["health_analysis"]["risk_score"], 40);
        assert_eq!(
            report["health_analysis"]["risk_factors"]["sedentary_lifestyle"],
            true
        );
        assert_eq!(
            report["health_analysis"]["recommendations"][0]["category"],
            "Activity Level"
        );
    }

    #[test]
    fn test_dates_in_fixed_zone() {
        let pipeline = HealthPipeline::with_zone(CalendarZone::utc());
        let report = pipeline
            .process_google_fit(&sample_response(|day| 8000 + day * 10))
            .unwrap();

        let records = report.fitness_data.records();
        assert_eq!(records[0].date.to_string(), "2024-01-01");
        assert_eq!(records[29].date.to_string(), "2024-01-30");
        assert_eq!(records[29].steps, 8290);
        assert_eq!(report.health_analysis.risk_score, 0);
    }

    #[test]
    fn test_inactive_month() {
        let pipeline = HealthPipeline::with_zone(CalendarZone::utc());
        let report = pipeline
            .process_google_fit(&sample_response(|day| if day % 2 == 0 { 500 } else { 14_000 }))
            .unwrap();

        let analysis = &report.health_analysis;
        assert!(analysis.risk_factors.is_flagged(RiskFactor::InconsistentActivity));
        assert!(analysis.risk_factors.is_flagged(RiskFactor::FrequentInactivity));
        assert!(!analysis.risk_factors.is_flagged(RiskFactor::SedentaryLifestyle));
        assert_eq!(analysis.risk_score, 60);
    }

    #[test]
    fn test_empty_payload() {
        let pipeline = HealthPipeline::new();
        let report = pipeline.process_google_fit(r#"{"bucket": []}"#).unwrap();

        assert!(report.fitness_data.is_empty());
        assert_eq!(report.health_analysis, RiskAssessment::no_data());
    }

    #[test]
    fn test_invalid_json() {
        let result = google_fit_to_report("not valid json".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_lenient_fallback() {
        let pipeline = HealthPipeline::new();
        let report = pipeline.process_google_fit_or_empty("<html>401 Unauthorized</html>");

        assert!(report.fitness_data.is_empty());
        assert_eq!(report.health_analysis, RiskAssessment::no_data());
    }

    #[test]
    fn test_assess_series_json() {
        let json = assess_series_json(r#"[{"date": "2024-01-15", "steps": 3000}]"#).unwrap();
        let report: HealthReport = serde_json::from_str(&json).unwrap();

        assert_eq!(report.fitness_data.len(), 1);
        assert_eq!(report.health_analysis.risk_score, 40);
        assert_eq!(
            report.health_analysis.risk_factors.get(RiskFactor::InconsistentActivity),
            Some(false)
        );
    }
}
