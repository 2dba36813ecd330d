//! Report encoding
//!
//! This module assembles the outbound health report handed to presentation
//! clients and optionally wraps it with producer provenance.

use crate::error::ComputeError;
use crate::types::{DailySeries, HealthReport, ReportEnvelope, ReportProducer, RiskAssessment};
use crate::{PRODUCER_NAME, STRIDE_VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Report encoder for producing outbound JSON payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Combine a series and its assessment into a report
    pub fn encode(&self, series: DailySeries, assessment: RiskAssessment) -> HealthReport {
        HealthReport {
            fitness_data: series,
            health_analysis: assessment,
        }
    }

    /// Encode a report to compact JSON
    pub fn encode_to_json(&self, report: &HealthReport) -> Result<String, ComputeError> {
        serde_json::to_string(report).map_err(ComputeError::JsonError)
    }

    /// Encode a report to pretty-printed JSON
    pub fn encode_to_json_pretty(&self, report: &HealthReport) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(report).map_err(ComputeError::JsonError)
    }

    /// Wrap a report with producer metadata and computation time
    pub fn envelope(&self, report: HealthReport) -> ReportEnvelope {
        ReportEnvelope {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: STRIDE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            report,
        }
    }
}
