//! Risk analysis
//!
//! This module scores a daily step series against fixed activity rules. Each
//! rule pairs a risk factor with its predicate, weight, and recommendation
//! template. Rules are evaluated in declaration order, which is also the order
//! recommendations are emitted in.

use crate::features::StepStatistics;
use crate::types::{DailySeries, Recommendation, RiskAssessment, RiskFactor, RiskFactors};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mean daily steps below this flag a sedentary lifestyle
pub const SEDENTARY_AVG_STEPS: f64 = 7000.0;
/// Step standard deviation above this flags inconsistent activity
pub const INCONSISTENT_STD_DEV: f64 = 4000.0;
/// A day with fewer steps than this counts as inactive
pub const INACTIVE_DAY_STEPS: u64 = 5000;
/// More inactive days than this flag frequent inactivity
pub const FREQUENT_INACTIVE_DAYS: usize = 10;

pub const SEDENTARY_WEIGHT: u8 = 40;
pub const INCONSISTENT_WEIGHT: u8 = 30;
pub const FREQUENT_INACTIVITY_WEIGHT: u8 = 30;

/// Rule thresholds (defaults are the fixed scoring constants)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub sedentary_avg_steps: f64,
    pub inconsistent_std_dev: f64,
    pub inactive_day_steps: u64,
    pub frequent_inactive_days: usize,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            sedentary_avg_steps: SEDENTARY_AVG_STEPS,
            inconsistent_std_dev: INCONSISTENT_STD_DEV,
            inactive_day_steps: INACTIVE_DAY_STEPS,
            frequent_inactive_days: FREQUENT_INACTIVE_DAYS,
        }
    }
}

/// Score contribution of each factor (defaults sum to 100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskWeights {
    pub sedentary_lifestyle: u8,
    pub inconsistent_activity: u8,
    pub frequent_inactivity: u8,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            sedentary_lifestyle: SEDENTARY_WEIGHT,
            inconsistent_activity: INCONSISTENT_WEIGHT,
            frequent_inactivity: FREQUENT_INACTIVITY_WEIGHT,
        }
    }
}

impl RiskWeights {
    pub fn weight(&self, factor: RiskFactor) -> u8 {
        match factor {
            RiskFactor::SedentaryLifestyle => self.sedentary_lifestyle,
            RiskFactor::InconsistentActivity => self.inconsistent_activity,
            RiskFactor::FrequentInactivity => self.frequent_inactivity,
        }
    }
}

/// Static recommendation content
#[derive(Debug, Clone, Copy)]
pub struct RecommendationTemplate {
    pub category: &'static str,
    pub suggestion: &'static str,
    pub action_items: &'static [&'static str],
}

impl RecommendationTemplate {
    pub fn to_recommendation(&self) -> Recommendation {
        Recommendation {
            category: self.category.to_string(),
            suggestion: self.suggestion.to_string(),
            action_items: self.action_items.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// One scoring rule
pub struct RiskRule {
    pub factor: RiskFactor,
    pub predicate: fn(&StepStatistics, &RiskThresholds) -> bool,
    pub recommendation: RecommendationTemplate,
}

/// Scoring rules in priority order
pub const RULES: [RiskRule; 3] = [
    RiskRule {
        factor: RiskFactor::SedentaryLifestyle,
        predicate: is_sedentary,
        recommendation: RecommendationTemplate {
            category: "Activity Level",
            suggestion: "Aim for 10,000 daily steps",
            action_items: &["Walk after meals", "Use stairs instead of elevator"],
        },
    },
    RiskRule {
        factor: RiskFactor::InconsistentActivity,
        predicate: is_inconsistent,
        recommendation: RecommendationTemplate {
            category: "Consistency",
            suggestion: "Establish a regular workout schedule",
            action_items: &["Join a class", "Exercise at the same time daily"],
        },
    },
    RiskRule {
        factor: RiskFactor::FrequentInactivity,
        predicate: is_frequently_inactive,
        recommendation: RecommendationTemplate {
            category: "Regular Movement",
            suggestion: "Reduce inactive days",
            action_items: &["Stretch hourly", "Do simple exercises at home"],
        },
    },
];

fn is_sedentary(stats: &StepStatistics, thresholds: &RiskThresholds) -> bool {
    stats.avg_steps < thresholds.sedentary_avg_steps
}

// An undefined spread (single record) never counts as inconsistent.
fn is_inconsistent(stats: &StepStatistics, thresholds: &RiskThresholds) -> bool {
    stats
        .step_consistency
        .is_some_and(|std_dev| std_dev > thresholds.inconsistent_std_dev)
}

fn is_frequently_inactive(stats: &StepStatistics, thresholds: &RiskThresholds) -> bool {
    stats.inactive_days > thresholds.frequent_inactive_days
}

/// Risk analyzer for scoring daily step series
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskAnalyzer {
    thresholds: RiskThresholds,
    weights: RiskWeights,
}

impl RiskAnalyzer {
    /// Create an analyzer with the fixed scoring constants
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(thresholds: RiskThresholds, weights: RiskWeights) -> Self {
        Self {
            thresholds,
            weights,
        }
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    pub fn weights(&self) -> &RiskWeights {
        &self.weights
    }

    /// Derive step statistics with this analyzer's inactive-day threshold
    pub fn statistics(&self, series: &DailySeries) -> Option<StepStatistics> {
        StepStatistics::from_series(series, self.thresholds.inactive_day_steps)
    }

    /// Analyze a daily series
    ///
    /// An empty series yields a zero score with no factors and no
    /// recommendations. Otherwise every factor is reported.
    pub fn analyze(&self, series: &DailySeries) -> RiskAssessment {
        let Some(stats) = self.statistics(series) else {
            debug!("empty series, returning no-data assessment");
            return RiskAssessment::no_data();
        };

        let mut risk_factors = RiskFactors::new();
        let mut risk_score: u16 = 0;
        let mut recommendations = Vec::new();

        for rule in &RULES {
            let flagged = (rule.predicate)(&stats, &self.thresholds);
            risk_factors.insert(rule.factor, flagged);
            if flagged {
                risk_score += u16::from(self.weights.weight(rule.factor));
                recommendations.push(rule.recommendation.to_recommendation());
            }
        }

        debug!(
            days = stats.days,
            avg_steps = stats.avg_steps,
            inactive_days = stats.inactive_days,
            risk_score,
            "scored step series"
        );

        RiskAssessment {
            risk_score: risk_score.min(100) as u8,
            risk_factors,
            recommendations,
        }
    }
}

/// Analyze a series with the fixed scoring constants
pub fn analyze(series: &DailySeries) -> RiskAssessment {
    RiskAnalyzer::new().analyze(series)
}

/// Whether a score is one the default weights can produce
pub fn is_attainable_score(score: u8) -> bool {
    let weights = RiskWeights::default();
    (0u8..8).any(|mask| {
        let sum: u16 = RiskFactor::ALL
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1u8 << *i) != 0)
            .map(|(_, factor)| u16::from(weights.weight(*factor)))
            .sum();
        sum == u16::from(score)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DailyRecord;
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;

    fn series_of(steps: &[u64]) -> DailySeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        steps
            .iter()
            .enumerate()
            .map(|(i, s)| DailyRecord {
                date: start + Duration::days(i as i64),
                steps: *s,
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn categories(assessment: &RiskAssessment) -> Vec<&str> {
        assessment
            .recommendations
            .iter()
            .map(|r| r.category.as_str())
            .collect()
    }

    #[test]
    fn test_empty_series() {
        let assessment = analyze(&DailySeries::empty());
        assert_eq!(assessment, RiskAssessment::no_data());
        assert!(assessment.risk_factors.is_empty());
    }

    #[test]
    fn test_active_consistent_series_scores_zero() {
        let assessment = analyze(&series_of(&[9000, 10_500, 8200, 11_000, 9800, 7000]));

        assert_eq!(assessment.risk_score, 0);
        assert!(assessment.recommendations.is_empty());
        assert_eq!(assessment.risk_factors.len(), 3);
        for factor in RiskFactor::ALL {
            assert_eq!(assessment.risk_factors.get(factor), Some(false));
        }
    }

    #[test]
    fn test_identical_6000_step_days() {
        let assessment = analyze(&series_of(&[6000; 31]));

        assert_eq!(assessment.risk_score, 40);
        assert!(assessment.risk_factors.is_flagged(RiskFactor::SedentaryLifestyle));
        assert!(!assessment.risk_factors.is_flagged(RiskFactor::InconsistentActivity));
        assert!(!assessment.risk_factors.is_flagged(RiskFactor::FrequentInactivity));
        assert_eq!(categories(&assessment), vec!["Activity Level"]);
        assert_eq!(
            assessment.recommendations[0],
            Recommendation {
                category: "Activity Level".to_string(),
                suggestion: "Aim for 10,000 daily steps".to_string(),
                action_items: vec![
                    "Walk after meals".to_string(),
                    "Use stairs instead of elevator".to_string(),
                ],
            }
        );
    }

    #[test]
    fn test_single_record_is_not_inconsistent() {
        let assessment = analyze(&series_of(&[3000]));

        assert_eq!(assessment.risk_score, 40);
        assert_eq!(
            assessment.risk_factors.get(RiskFactor::InconsistentActivity),
            Some(false)
        );
        assert_eq!(
            assessment.risk_factors.get(RiskFactor::FrequentInactivity),
            Some(false)
        );
    }

    #[test]
    fn test_all_factors_in_priority_order() {
        // 15 near-zero days and 5 very active days: low mean, high spread,
        // and more than 10 inactive days.
        let mut steps = vec![500u64; 15];
        steps.extend([20_000u64; 5]);
        let assessment = analyze(&series_of(&steps));

        assert_eq!(assessment.risk_score, 100);
        assert_eq!(
            categories(&assessment),
            vec!["Activity Level", "Consistency", "Regular Movement"]
        );
    }

    #[test]
    fn test_inconsistent_without_sedentary() {
        let assessment = analyze(&series_of(&[1000, 15_000, 2000, 16_000, 9000, 14_000]));

        assert!(!assessment.risk_factors.is_flagged(RiskFactor::SedentaryLifestyle));
        assert!(assessment.risk_factors.is_flagged(RiskFactor::InconsistentActivity));
        assert!(!assessment.risk_factors.is_flagged(RiskFactor::FrequentInactivity));
        assert_eq!(assessment.risk_score, 30);
        assert_eq!(categories(&assessment), vec!["Consistency"]);
    }

    #[test]
    fn test_frequent_inactivity_boundary() {
        // exactly 10 inactive days does not trigger, 11 does
        let mut ten = vec![4999u64; 10];
        ten.extend([12_000u64; 20]);
        let assessment = analyze(&series_of(&ten));
        assert!(!assessment.risk_factors.is_flagged(RiskFactor::FrequentInactivity));

        let mut eleven = vec![4999u64; 11];
        eleven.extend([12_000u64; 20]);
        let assessment = analyze(&series_of(&eleven));
        assert!(assessment.risk_factors.is_flagged(RiskFactor::FrequentInactivity));
    }

    #[test]
    fn test_sedentary_boundary() {
        let at_threshold = analyze(&series_of(&[7000, 7000]));
        assert!(!at_threshold.risk_factors.is_flagged(RiskFactor::SedentaryLifestyle));

        let below = analyze(&series_of(&[6999, 7000]));
        assert!(below.risk_factors.is_flagged(RiskFactor::SedentaryLifestyle));
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = RiskThresholds {
            sedentary_avg_steps: 10_000.0,
            ..RiskThresholds::default()
        };
        let analyzer = RiskAnalyzer::with_parameters(thresholds, RiskWeights::default());

        let assessment = analyzer.analyze(&series_of(&[8000; 7]));
        assert_eq!(assessment.risk_score, 40);
    }

    #[test]
    fn test_scores_are_subset_sums() {
        let samples: Vec<Vec<u64>> = vec![
            vec![],
            vec![0],
            vec![12_000; 30],
            vec![100, 20_000],
            vec![3000; 12],
            [vec![0u64; 11], vec![30_000u64; 19]].concat(),
        ];

        for steps in samples {
            let score = analyze(&series_of(&steps)).risk_score;
            assert!(score <= 100);
            assert!(is_attainable_score(score), "unexpected score {score}");
        }
        assert!(!is_attainable_score(50));
        assert!(is_attainable_score(60));
        assert!(is_attainable_score(70));
    }
}
