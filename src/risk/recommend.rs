//! Intervention recommendation rules.

use crate::models::{RiskComponent, RiskFactor, Severity};

pub const MAX_RECOMMENDATIONS: usize = 3;

/// Suggestion for one factor at a given severity.
pub fn factor_recommendation(component: RiskComponent, severity: Severity) -> &'static str {
    match (component, severity) {
        (RiskComponent::Attendance, Severity::High) => {
            "URGENT: Schedule immediate parent-teacher meeting and attendance counseling"
        }
        (RiskComponent::Attendance, Severity::Medium) => {
            "Schedule one-on-one attendance counseling session"
        }
        (RiskComponent::Attendance, Severity::Low) => {
            "Monitor attendance closely and provide gentle reminders"
        }
        (RiskComponent::ScoreTrend, Severity::High) => {
            "Arrange remedial classes and peer tutoring support"
        }
        (RiskComponent::ScoreTrend, Severity::Medium) => {
            "Provide additional study materials and practice sessions"
        }
        (RiskComponent::ScoreTrend, Severity::Low) => {
            "Regular check-ins on study habits and academic support"
        }
        (RiskComponent::Fees, Severity::High) => {
            "Connect with financial aid office for payment plan options"
        }
        (RiskComponent::Fees, _) => {
            "Send fee payment reminder and discuss any financial difficulties"
        }
        (RiskComponent::Attempts, Severity::High) => {
            "Consider alternative learning methods or course modification"
        }
        (RiskComponent::Attempts, _) => "Provide focused support for challenging subject areas",
    }
}

/// Closing suggestion keyed on how many factors are High severity.
pub fn escalation(high_count: usize) -> Option<&'static str> {
    match high_count {
        0 => None,
        1 => Some("Bi-weekly check-ins and targeted intervention strategy"),
        _ => Some("Schedule weekly mentor meetings and create comprehensive support plan"),
    }
}

/// Builds at most [`MAX_RECOMMENDATIONS`] suggestions. Only Medium and High
/// factors qualify, visited in component order rather than contribution order;
/// the escalation line comes last.
pub fn recommendations(factors: &[RiskFactor]) -> Vec<String> {
    let mut output: Vec<String> = RiskComponent::ALL
        .iter()
        .filter_map(|component| {
            factors
                .iter()
                .find(|factor| factor.component == *component && factor.severity >= Severity::Medium)
        })
        .map(|factor| factor_recommendation(factor.component, factor.severity).to_string())
        .collect();

    let high_count = factors
        .iter()
        .filter(|factor| factor.severity == Severity::High)
        .count();
    if let Some(line) = escalation(high_count) {
        output.push(line.to_string());
    }

    output.truncate(MAX_RECOMMENDATIONS);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor(component: RiskComponent, severity: Severity, contribution: f64) -> RiskFactor {
        RiskFactor {
            component,
            value: String::new(),
            risk_contribution: contribution,
            severity,
        }
    }

    #[test]
    fn low_severity_factors_get_no_recommendation() {
        let factors = vec![
            factor(RiskComponent::Attendance, Severity::Low, 0.03),
            factor(RiskComponent::Fees, Severity::Low, 0.02),
        ];
        assert!(recommendations(&factors).is_empty());
    }

    #[test]
    fn follows_component_order_not_contribution_order() {
        let factors = vec![
            factor(RiskComponent::Fees, Severity::Medium, 0.10),
            factor(RiskComponent::ScoreTrend, Severity::Medium, 0.03),
        ];
        assert_eq!(
            recommendations(&factors),
            vec![
                "Provide additional study materials and practice sessions",
                "Send fee payment reminder and discuss any financial difficulties",
            ]
        );
    }

    #[test]
    fn single_high_factor_adds_bi_weekly_escalation() {
        let factors = vec![
            factor(RiskComponent::Attendance, Severity::Medium, 0.10),
            factor(RiskComponent::Attempts, Severity::High, 0.05),
        ];
        assert_eq!(
            recommendations(&factors),
            vec![
                "Schedule one-on-one attendance counseling session",
                "Consider alternative learning methods or course modification",
                "Bi-weekly check-ins and targeted intervention strategy",
            ]
        );
    }

    #[test]
    fn two_high_factors_add_weekly_escalation() {
        let factors = vec![
            factor(RiskComponent::Attendance, Severity::High, 0.3),
            factor(RiskComponent::Fees, Severity::High, 0.15),
        ];
        assert_eq!(
            recommendations(&factors).last().map(String::as_str),
            Some("Schedule weekly mentor meetings and create comprehensive support plan")
        );
    }

    #[test]
    fn escalation_is_dropped_when_cap_is_reached() {
        let factors = vec![
            factor(RiskComponent::Attendance, Severity::High, 0.3),
            factor(RiskComponent::ScoreTrend, Severity::Medium, 0.1),
            factor(RiskComponent::Fees, Severity::Medium, 0.08),
        ];
        let output = recommendations(&factors);
        assert_eq!(output.len(), MAX_RECOMMENDATIONS);
        assert!(!output.iter().any(|line| line.starts_with("Bi-weekly")));
    }
}
