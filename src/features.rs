//! Step feature derivation
//!
//! This module derives the summary statistics the risk rules are evaluated on:
//! - Mean daily steps
//! - Day-to-day consistency (sample standard deviation)
//! - Count of inactive days

use crate::types::DailySeries;
use serde::{Deserialize, Serialize};

/// Summary statistics over a non-empty daily series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepStatistics {
    /// Number of records in the series
    pub days: usize,
    /// Arithmetic mean of daily steps
    pub avg_steps: f64,
    /// Sample standard deviation of daily steps (ddof = 1).
    /// `None` for a single record, where the spread is undefined.
    pub step_consistency: Option<f64>,
    /// Days with fewer steps than the inactive-day threshold
    pub inactive_days: usize,
}

impl StepStatistics {
    /// Derive statistics from a series; `None` when the series is empty
    pub fn from_series(series: &DailySeries, inactive_day_steps: u64) -> Option<Self> {
        if series.is_empty() {
            return None;
        }

        let days = series.len();
        let avg_steps = mean(series);
        let step_consistency = sample_std_dev(series, avg_steps);
        let inactive_days = series.steps().filter(|s| *s < inactive_day_steps).count();

        Some(Self {
            days,
            avg_steps,
            step_consistency,
            inactive_days,
        })
    }
}

fn mean(series: &DailySeries) -> f64 {
    let sum: f64 = series.steps().map(|s| s as f64).sum();
    sum / series.len() as f64
}

/// Bessel-corrected standard deviation, undefined below two samples
fn sample_std_dev(series: &DailySeries, mean: f64) -> Option<f64> {
    let n = series.len();
    if n < 2 {
        return None;
    }

    let sum_sq: f64 = series
        .steps()
        .map(|s| {
            let d = s as f64 - mean;
            d * d
        })
        .sum();

    Some((sum_sq / (n - 1) as f64).sqrt())
}
