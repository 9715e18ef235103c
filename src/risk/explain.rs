use std::cmp::Ordering;

use tracing::debug;

use super::components::{component_risks, score_drop};
use super::recommend::recommendations;
use super::{classify, weighted_score, RiskConfig};
use crate::error::RecordError;
use crate::models::{RecordFields, RiskAssessment, RiskComponent, RiskFactor, Severity, StudentRecord};
use crate::record::parse_record;

/// Number of factors surfaced as the headline reasons.
pub const TOP_REASON_COUNT: usize = 2;

/// Detailed drill-down: score, ranked factors, and recommendations.
/// Unparsable input yields a zeroed Low assessment carrying the error.
pub fn explain(config: &RiskConfig, fields: &RecordFields) -> RiskAssessment {
    explain_parsed(config, parse_record(fields))
}

pub fn explain_parsed(
    config: &RiskConfig,
    parsed: Result<StudentRecord, RecordError>,
) -> RiskAssessment {
    match parsed {
        Ok(record) => explain_record(config, &record),
        Err(err) => {
            debug!(error = %err, "record could not be explained, using safe default");
            RiskAssessment::failed(format!("Detailed analysis error: {err}"))
        }
    }
}

pub fn explain_record(config: &RiskConfig, record: &StudentRecord) -> RiskAssessment {
    let components = component_risks(record);
    let weighted = config.weights.apply(&components);
    let risk_score = weighted_score(&components, &config.weights);
    let risk_level = classify(risk_score, &config.thresholds);

    let mut risk_factors: Vec<RiskFactor> = RiskComponent::ALL
        .iter()
        .filter(|component| components.get(**component) > 0.0)
        .map(|component| RiskFactor {
            component: *component,
            value: describe(*component, record),
            risk_contribution: weighted.get(*component),
            severity: severity(*component, record),
        })
        .collect();

    // sort_by is stable, so ties keep evaluation order.
    risk_factors.sort_by(|a, b| {
        b.risk_contribution
            .partial_cmp(&a.risk_contribution)
            .unwrap_or(Ordering::Equal)
    });

    let top_reasons = risk_factors.iter().take(TOP_REASON_COUNT).cloned().collect();
    let recommendations = recommendations(&risk_factors);

    RiskAssessment {
        risk_score,
        risk_level,
        risk_color: risk_level.color(),
        components,
        weighted,
        risk_factors,
        top_reasons,
        recommendations,
        error: None,
    }
}

fn trend_drop(record: &StudentRecord) -> f64 {
    score_drop(record.previous_3_tests_avg, record.last_3_tests_avg).unwrap_or(0.0)
}

/// Shortest exact form, keeping ".0" on whole numbers.
fn display_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn describe(component: RiskComponent, record: &StudentRecord) -> String {
    match component {
        RiskComponent::Attendance => {
            format!("{}% (below 75%)", display_number(record.attendance_percent))
        }
        RiskComponent::ScoreTrend => format!("Dropped by {:.1} points", trend_drop(record)),
        RiskComponent::Fees => format!("{} days overdue", record.fees_due_days),
        RiskComponent::Attempts => format!("{} attempts", record.attempts_in_subject),
    }
}

pub fn severity(component: RiskComponent, record: &StudentRecord) -> Severity {
    match component {
        RiskComponent::Attendance => {
            let attendance = record.attendance_percent;
            if attendance < 50.0 {
                Severity::High
            } else if attendance < 65.0 {
                Severity::Medium
            } else {
                Severity::Low
            }
        }
        RiskComponent::ScoreTrend => {
            let drop = trend_drop(record);
            if drop > 15.0 {
                Severity::High
            } else if drop > 8.0 {
                Severity::Medium
            } else {
                Severity::Low
            }
        }
        RiskComponent::Fees => match record.fees_due_days {
            days if days > 90 => Severity::High,
            days if days > 30 => Severity::Medium,
            _ => Severity::Low,
        },
        RiskComponent::Attempts => match record.attempts_in_subject {
            attempts if attempts >= 4 => Severity::High,
            3 => Severity::Medium,
            _ => Severity::Low,
        },
    }
}
