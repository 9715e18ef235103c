use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Raw cells for one student, keyed by column name.
pub type RecordFields = HashMap<String, String>;

/// Typed scoring input, produced by [`crate::record::parse_record`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StudentRecord {
    pub attendance_percent: f64,
    pub fees_due_days: i64,
    pub attempts_in_subject: i64,
    pub last_3_tests_avg: f64,
    pub previous_3_tests_avg: f64,
}

/// One roster row: identity columns plus every raw cell.
#[derive(Debug, Clone)]
pub struct StudentRow {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub class: String,
    pub roll_no: String,
    pub fields: RecordFields,
    /// Set when the CSV row stopped before a scored column.
    pub short_row: Option<RecordError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskComponent {
    Attendance,
    ScoreTrend,
    Fees,
    Attempts,
}

impl RiskComponent {
    /// Evaluation order. Factor ties and recommendations follow it.
    pub const ALL: [RiskComponent; 4] = [
        RiskComponent::Attendance,
        RiskComponent::ScoreTrend,
        RiskComponent::Fees,
        RiskComponent::Attempts,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskComponent::Attendance => "Attendance",
            RiskComponent::ScoreTrend => "Test Score Trend",
            RiskComponent::Fees => "Fee Payment",
            RiskComponent::Attempts => "Subject Attempts",
        }
    }
}

/// Per-component values, either raw risks in [0, 1] or weighted contributions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComponentRisks {
    pub attendance: f64,
    pub score_trend: f64,
    pub fees: f64,
    pub attempts: f64,
}

impl ComponentRisks {
    pub fn get(&self, component: RiskComponent) -> f64 {
        match component {
            RiskComponent::Attendance => self.attendance,
            RiskComponent::ScoreTrend => self.score_trend,
            RiskComponent::Fees => self.fees,
            RiskComponent::Attempts => self.attempts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn color(&self) -> RiskColor {
        match self {
            RiskLevel::High => RiskColor::Danger,
            RiskLevel::Medium => RiskColor::Warning,
            RiskLevel::Low => RiskColor::Success,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

/// Dashboard presentation tag for a [`RiskLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskColor {
    Success,
    Warning,
    Danger,
}

/// Per-factor tag that selects recommendation text. Not the overall level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskSummary {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_color: RiskColor,
    pub error: Option<String>,
}

impl RiskSummary {
    pub fn failed(error: String) -> Self {
        Self {
            risk_score: 0.0,
            risk_level: RiskLevel::Low,
            risk_color: RiskLevel::Low.color(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskFactor {
    pub component: RiskComponent,
    pub value: String,
    pub risk_contribution: f64,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_color: RiskColor,
    pub components: ComponentRisks,
    pub weighted: ComponentRisks,
    pub risk_factors: Vec<RiskFactor>,
    pub top_reasons: Vec<RiskFactor>,
    pub recommendations: Vec<String>,
    pub error: Option<String>,
}

impl RiskAssessment {
    pub fn failed(error: String) -> Self {
        Self {
            risk_score: 0.0,
            risk_level: RiskLevel::Low,
            risk_color: RiskLevel::Low.color(),
            components: ComponentRisks::default(),
            weighted: ComponentRisks::default(),
            risk_factors: Vec::new(),
            top_reasons: Vec::new(),
            recommendations: Vec::new(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionNote {
    pub timestamp: NaiveDateTime,
    pub mentor_id: String,
    pub note: String,
}
