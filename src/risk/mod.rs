//! Dropout risk engine.
//!
//! Every function here is pure: the same record and configuration always
//! produce the same result, so callers may score from any number of threads.

mod components;
mod explain;
pub mod recommend;

use tracing::debug;

use crate::error::RecordError;
use crate::models::{ComponentRisks, RecordFields, RiskComponent, RiskLevel, RiskSummary, StudentRecord};
use crate::record::parse_record;

pub use components::component_risks;
pub use explain::{explain, explain_parsed};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentWeights {
    pub attendance: f64,
    pub score_trend: f64,
    pub fees: f64,
    pub attempts: f64,
}

impl ComponentWeights {
    pub fn weight(&self, component: RiskComponent) -> f64 {
        match component {
            RiskComponent::Attendance => self.attendance,
            RiskComponent::ScoreTrend => self.score_trend,
            RiskComponent::Fees => self.fees,
            RiskComponent::Attempts => self.attempts,
        }
    }

    pub fn apply(&self, risks: &ComponentRisks) -> ComponentRisks {
        ComponentRisks {
            attendance: risks.attendance * self.attendance,
            score_trend: risks.score_trend * self.score_trend,
            fees: risks.fees * self.fees,
            attempts: risks.attempts * self.attempts,
        }
    }
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            attendance: 0.50,
            score_trend: 0.30,
            fees: 0.15,
            attempts: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high: 0.70,
            medium: 0.40,
        }
    }
}

/// Fixed scoring configuration. Weights must sum to 1.0 so that the overall
/// score stays in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiskConfig {
    pub weights: ComponentWeights,
    pub thresholds: Thresholds,
}

pub fn classify(risk_score: f64, thresholds: &Thresholds) -> RiskLevel {
    if risk_score >= thresholds.high {
        RiskLevel::High
    } else if risk_score >= thresholds.medium {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn weighted_score(risks: &ComponentRisks, weights: &ComponentWeights) -> f64 {
    RiskComponent::ALL
        .iter()
        .map(|component| weights.weight(*component) * risks.get(*component))
        .sum()
}

/// Lightweight score for list views. Unparsable input yields a Low summary
/// carrying the error instead of failing.
pub fn score(config: &RiskConfig, fields: &RecordFields) -> RiskSummary {
    score_parsed(config, parse_record(fields))
}

pub fn score_parsed(config: &RiskConfig, parsed: Result<StudentRecord, RecordError>) -> RiskSummary {
    match parsed {
        Ok(record) => score_record(config, &record),
        Err(err) => {
            debug!(error = %err, "record could not be scored, using safe default");
            RiskSummary::failed(format!("Data processing error: {err}"))
        }
    }
}

pub fn score_record(config: &RiskConfig, record: &StudentRecord) -> RiskSummary {
    let risks = component_risks(record);
    let risk_score = weighted_score(&risks, &config.weights);
    let risk_level = classify(risk_score, &config.thresholds);

    RiskSummary {
        risk_score,
        risk_level,
        risk_color: risk_level.color(),
        error: None,
    }
}
