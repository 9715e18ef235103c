//! JSON response shapes. Numbers leave the engine unrounded; they are
//! rounded to three decimals here.

use serde::Serialize;
use serde_json::Value;

use crate::models::{
    ComponentRisks, InterventionNote, RecordFields, RiskAssessment, RiskColor, RiskFactor,
    RiskLevel, Severity, StudentRow,
};
use crate::record::{
    ATTEMPTS_IN_SUBJECT, ATTENDANCE_PERCENT, FEES_DUE_DAYS, LAST_3_TESTS_AVG,
    PREVIOUS_3_TESTS_AVG,
};
use crate::roster::RankedStudent;

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// A raw cell as JSON: a number when it reads as one, otherwise the text.
pub fn cell_value(fields: &RecordFields, name: &str) -> Value {
    let Some(text) = fields.get(name).map(|value| value.trim()) else {
        return Value::Null;
    };
    if text.is_empty() {
        return Value::Null;
    }
    if let Ok(number) = text.parse::<i64>() {
        return Value::from(number);
    }
    match text.parse::<f64>() {
        Ok(number) if number.is_finite() => Value::from(number),
        _ => Value::from(text),
    }
}

// Individual test columns are optional; absent ones read as 0.
fn test_score(fields: &RecordFields, name: &str) -> Value {
    match cell_value(fields, name) {
        Value::Null => Value::from(0),
        value => value,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentListEntry {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub class: String,
    pub roll_no: String,
    pub attendance_percent: Value,
    pub fees_due_days: Value,
    pub last_3_tests_avg: Value,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_color: RiskColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentList {
    pub students: Vec<StudentListEntry>,
    pub total_count: usize,
}

impl StudentList {
    pub fn from_ranked(ranked: &[RankedStudent<'_>]) -> Self {
        let students: Vec<StudentListEntry> = ranked
            .iter()
            .map(|entry| {
                let student = entry.student;
                StudentListEntry {
                    student_id: student.student_id.clone(),
                    first_name: student.first_name.clone(),
                    last_name: student.last_name.clone(),
                    class: student.class.clone(),
                    roll_no: student.roll_no.clone(),
                    attendance_percent: cell_value(&student.fields, ATTENDANCE_PERCENT),
                    fees_due_days: cell_value(&student.fields, FEES_DUE_DAYS),
                    last_3_tests_avg: cell_value(&student.fields, LAST_3_TESTS_AVG),
                    risk_score: round3(entry.summary.risk_score),
                    risk_level: entry.summary.risk_level,
                    risk_color: entry.summary.risk_color,
                    error: entry.summary.error.clone(),
                }
            })
            .collect();

        Self {
            total_count: students.len(),
            students,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentView {
    pub attendance_risk: f64,
    pub score_trend_risk: f64,
    pub fee_risk: f64,
    pub attempts_risk: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightedView {
    pub attendance_weighted: f64,
    pub score_trend_weighted: f64,
    pub fee_weighted: f64,
    pub attempts_weighted: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactorView {
    pub factor: &'static str,
    pub value: String,
    pub risk_contribution: f64,
    pub severity: Severity,
}

impl From<&RiskFactor> for FactorView {
    fn from(factor: &RiskFactor) -> Self {
        Self {
            factor: factor.component.label(),
            value: factor.value.clone(),
            risk_contribution: round3(factor.risk_contribution),
            severity: factor.severity,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentView {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_color: RiskColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_components: Option<ComponentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted_components: Option<WeightedView>,
    pub risk_factors: Vec<FactorView>,
    pub top_reasons: Vec<FactorView>,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&RiskAssessment> for AssessmentView {
    fn from(assessment: &RiskAssessment) -> Self {
        let parsed = assessment.error.is_none();
        let components = |risks: &ComponentRisks| ComponentView {
            attendance_risk: round3(risks.attendance),
            score_trend_risk: round3(risks.score_trend),
            fee_risk: round3(risks.fees),
            attempts_risk: round3(risks.attempts),
        };
        let weighted = |risks: &ComponentRisks| WeightedView {
            attendance_weighted: round3(risks.attendance),
            score_trend_weighted: round3(risks.score_trend),
            fee_weighted: round3(risks.fees),
            attempts_weighted: round3(risks.attempts),
        };

        Self {
            risk_score: round3(assessment.risk_score),
            risk_level: assessment.risk_level,
            risk_color: assessment.risk_color,
            risk_components: parsed.then(|| components(&assessment.components)),
            weighted_components: parsed.then(|| weighted(&assessment.weighted)),
            risk_factors: assessment.risk_factors.iter().map(FactorView::from).collect(),
            top_reasons: assessment.top_reasons.iter().map(FactorView::from).collect(),
            recommendations: assessment.recommendations.clone(),
            error: assessment.error.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentDetail {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub class: String,
    pub roll_no: String,
    pub attendance_percent: Value,
    pub fees_due_days: Value,
    #[serde(rename = "attempts_in_subject_X")]
    pub attempts_in_subject: Value,
    pub last_test_1: Value,
    pub last_test_2: Value,
    pub last_test_3: Value,
    pub last_3_tests_avg: Value,
    pub previous_3_tests_avg: Value,
    pub risk_analysis: AssessmentView,
    pub intervention_notes: Vec<InterventionNote>,
}

impl StudentDetail {
    pub fn new(
        student: &StudentRow,
        assessment: &RiskAssessment,
        notes: &[InterventionNote],
    ) -> Self {
        let fields = &student.fields;
        Self {
            student_id: student.student_id.clone(),
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            class: student.class.clone(),
            roll_no: student.roll_no.clone(),
            attendance_percent: cell_value(fields, ATTENDANCE_PERCENT),
            fees_due_days: cell_value(fields, FEES_DUE_DAYS),
            attempts_in_subject: cell_value(fields, ATTEMPTS_IN_SUBJECT),
            last_test_1: test_score(fields, "last_test_1"),
            last_test_2: test_score(fields, "last_test_2"),
            last_test_3: test_score(fields, "last_test_3"),
            last_3_tests_avg: cell_value(fields, LAST_3_TESTS_AVG),
            previous_3_tests_avg: cell_value(fields, PREVIOUS_3_TESTS_AVG),
            risk_analysis: AssessmentView::from(assessment),
            intervention_notes: notes.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::risk::{explain, RiskConfig};
    use crate::roster::Roster;

    const ROSTER: &str = "\
student_id,first_name,last_name,attendance_percent,fees_due_days,attempts_in_subject_X,last_test_1,last_test_2,last_3_tests_avg,previous_3_tests_avg
S001,Asha,Verma,92,0,1,80,,79.5,76
S002,Ravi,Kumar,40,100,5,50,60,55,80
S003,Meera,Iyer,N/A,10,2,,,60,62
";

    fn fields(pairs: &[(&str, &str)]) -> RecordFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn rounds_to_three_places() {
        assert_eq!(round3(0.508333), 0.508);
        assert_eq!(round3(0.23366), 0.234);
        assert_eq!(round3(1.0), 1.0);
    }

    #[test]
    fn cell_values_keep_numbers_and_text() {
        let row = fields(&[("a", "45"), ("b", "62.5"), ("c", "N/A"), ("d", " ")]);
        assert_eq!(cell_value(&row, "a"), Value::from(45));
        assert_eq!(cell_value(&row, "b"), Value::from(62.5));
        assert_eq!(cell_value(&row, "c"), Value::from("N/A"));
        assert_eq!(cell_value(&row, "d"), Value::Null);
        assert_eq!(cell_value(&row, "missing"), Value::Null);
    }

    #[test]
    fn assessment_json_uses_dashboard_names() {
        let assessment = explain(
            &RiskConfig::default(),
            &fields(&[
                ("attendance_percent", "40"),
                ("fees_due_days", "100"),
                ("attempts_in_subject_X", "5"),
                ("previous_3_tests_avg", "80"),
                ("last_3_tests_avg", "55"),
            ]),
        );
        let json = serde_json::to_value(AssessmentView::from(&assessment)).unwrap();

        assert_eq!(json["risk_score"], Value::from(0.508));
        assert_eq!(json["risk_level"], "Medium");
        assert_eq!(json["risk_color"], "warning");
        assert_eq!(json["risk_components"]["attendance_risk"], Value::from(0.467));
        assert_eq!(json["weighted_components"]["fee_weighted"], Value::from(0.15));
        assert_eq!(json["top_reasons"][0]["factor"], "Attendance");
        assert_eq!(json["top_reasons"][0]["severity"], "High");
        assert_eq!(json["top_reasons"][0]["risk_contribution"], Value::from(0.233));
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failed_assessment_json_carries_error_only() {
        let assessment = explain(
            &RiskConfig::default(),
            &fields(&[("attendance_percent", "N/A")]),
        );
        let json = serde_json::to_value(AssessmentView::from(&assessment)).unwrap();

        assert_eq!(json["risk_score"], Value::from(0.0));
        assert_eq!(json["risk_level"], "Low");
        assert_eq!(json["risk_color"], "success");
        assert!(json.get("risk_components").is_none());
        assert_eq!(json["risk_factors"], Value::Array(Vec::new()));
        assert!(json["error"].as_str().is_some_and(|error| !error.is_empty()));
    }

    #[test]
    fn list_rounds_scores_and_flags_unscored_rows() {
        let roster = Roster::from_reader(ROSTER.as_bytes()).unwrap();
        let ranked = roster.ranked(&RiskConfig::default());
        let json = serde_json::to_value(StudentList::from_ranked(&ranked)).unwrap();

        assert_eq!(json["total_count"], Value::from(3));
        let students = json["students"].as_array().unwrap();
        assert_eq!(students[0]["student_id"], "S002");
        assert_eq!(students[0]["risk_score"], Value::from(0.508));
        assert_eq!(students[0]["risk_level"], "Medium");
        assert_eq!(students[0]["risk_color"], "warning");
        assert_eq!(students[0]["class"], "N/A");
        assert_eq!(students[0]["fees_due_days"], Value::from(100));
        assert!(students[0].get("error").is_none());

        let meera = students
            .iter()
            .find(|entry| entry["student_id"] == "S003")
            .unwrap();
        assert_eq!(meera["risk_score"], Value::from(0.0));
        assert_eq!(meera["risk_level"], "Low");
        assert_eq!(meera["attendance_percent"], "N/A");
        assert!(meera["error"]
            .as_str()
            .is_some_and(|error| error.contains("attendance_percent")));
    }

    #[test]
    fn detail_includes_test_scores_and_notes() {
        let roster = Roster::from_reader(ROSTER.as_bytes()).unwrap();
        let student = roster.find("S001").unwrap();
        let assessment = student.explain(&RiskConfig::default());
        let notes = vec![InterventionNote {
            timestamp: NaiveDate::from_ymd_opt(2026, 3, 2)
                .and_then(|date| date.and_hms_opt(9, 30, 0))
                .unwrap(),
            mentor_id: "mentor".to_string(),
            note: "Checked in after class".to_string(),
        }];
        let json = serde_json::to_value(StudentDetail::new(student, &assessment, &notes)).unwrap();

        assert_eq!(json["attempts_in_subject_X"], Value::from(1));
        assert!(json.get("attempts_in_subject").is_none());
        assert_eq!(json["last_test_1"], Value::from(80));
        assert_eq!(json["last_test_2"], Value::from(0));
        assert_eq!(json["last_test_3"], Value::from(0));
        assert_eq!(json["last_3_tests_avg"], Value::from(79.5));
        assert_eq!(json["risk_analysis"]["risk_level"], "Low");
        assert_eq!(json["intervention_notes"][0]["note"], "Checked in after class");
        assert_eq!(json["intervention_notes"][0]["mentor_id"], "mentor");
        assert_eq!(
            json["intervention_notes"][0]["timestamp"],
            "2026-03-02T09:30:00"
        );
    }
}
