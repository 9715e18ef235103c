use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{RecordError, RosterError};
use crate::models::{RecordFields, RiskAssessment, RiskLevel, RiskSummary, StudentRecord, StudentRow};
use crate::record::{
    parse_record, ATTENDANCE_PERCENT, LAST_3_TESTS_AVG, PREVIOUS_3_TESTS_AVG, SCORED_FIELDS,
};
use crate::risk::{self, RiskConfig};
use crate::views::{cell_value, round3};

pub const REQUIRED_COLUMNS: [&str; 8] = [
    "student_id",
    "first_name",
    "last_name",
    "attendance_percent",
    "fees_due_days",
    "attempts_in_subject_X",
    "last_3_tests_avg",
    "previous_3_tests_avg",
];

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Default)]
pub struct Roster {
    students: Vec<StudentRow>,
}

#[derive(Debug, Clone)]
pub struct RankedStudent<'a> {
    pub student: &'a StudentRow,
    pub summary: RiskSummary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskDistribution {
    #[serde(rename = "Low")]
    pub low: usize,
    #[serde(rename = "Medium")]
    pub medium: usize,
    #[serde(rename = "High")]
    pub high: usize,
}

impl RiskDistribution {
    fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Low => self.low += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::High => self.high += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceStat {
    pub student_id: String,
    pub attendance: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreTrendStat {
    pub student_id: String,
    pub previous_avg: Value,
    pub current_avg: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterSummary {
    pub total_students: usize,
    pub risk_distribution: RiskDistribution,
    pub attendance_stats: Vec<AttendanceStat>,
    pub score_trends: Vec<ScoreTrendStat>,
    pub high_risk_percentage: f64,
}

impl StudentRow {
    pub fn from_fields(fields: RecordFields, short_row: Option<RecordError>) -> Self {
        let text = |name: &str| fields.get(name).cloned().unwrap_or_default();
        let optional = |name: &str| {
            fields
                .get(name)
                .filter(|value| !value.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        Self {
            student_id: text("student_id"),
            first_name: text("first_name"),
            last_name: text("last_name"),
            class: optional("class"),
            roll_no: optional("roll_no"),
            fields,
            short_row,
        }
    }

    pub fn parse(&self) -> Result<StudentRecord, RecordError> {
        match &self.short_row {
            Some(err) => Err(err.clone()),
            None => parse_record(&self.fields),
        }
    }

    pub fn score(&self, config: &RiskConfig) -> RiskSummary {
        risk::score_parsed(config, self.parse())
    }

    pub fn explain(&self, config: &RiskConfig) -> RiskAssessment {
        risk::explain_parsed(config, self.parse())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Roster {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open student data at {}", path.display()))?;
        let roster = Self::from_reader(file)
            .with_context(|| format!("failed to read student data from {}", path.display()))?;
        info!(path = %path.display(), students = roster.len(), "student data loaded");
        Ok(roster)
    }

    pub fn from_reader<R: Read>(source: R) -> anyhow::Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);

        let headers = reader.headers()?.clone();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|column| !headers.iter().any(|header| header == **column))
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(RosterError::MissingColumns(missing).into());
        }

        let mut students = Vec::new();
        // Short rows load; extra trailing cells are dropped.
        for result in reader.records() {
            let row = result?;
            let fields: RecordFields = headers
                .iter()
                .zip(row.iter())
                .map(|(header, value)| (header.to_string(), value.to_string()))
                .collect();

            let cut: Vec<String> = headers
                .iter()
                .skip(row.len())
                .filter(|header| SCORED_FIELDS.contains(header))
                .map(str::to_string)
                .collect();
            let short_row = (!cut.is_empty()).then(|| RecordError::MissingCells { fields: cut });

            let student = StudentRow::from_fields(fields, short_row);
            if let Some(err) = &student.short_row {
                warn!(student_id = %student.student_id, error = %err, "short row will not be scored");
            }
            students.push(student);
        }

        Ok(Self { students })
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn find(&self, student_id: &str) -> Option<&StudentRow> {
        self.students
            .iter()
            .find(|student| student.student_id == student_id)
    }

    /// Every student with its summary, highest rounded score first.
    pub fn ranked(&self, config: &RiskConfig) -> Vec<RankedStudent<'_>> {
        let mut ranked: Vec<RankedStudent<'_>> = self
            .students
            .iter()
            .map(|student| RankedStudent {
                student,
                summary: student.score(config),
            })
            .collect();

        ranked.sort_by(|a, b| {
            round3(b.summary.risk_score)
                .partial_cmp(&round3(a.summary.risk_score))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    pub fn summary(&self, config: &RiskConfig) -> RosterSummary {
        let mut distribution = RiskDistribution::default();
        let mut attendance_stats = Vec::with_capacity(self.students.len());
        let mut score_trends = Vec::with_capacity(self.students.len());

        for student in &self.students {
            distribution.record(student.score(config).risk_level);

            attendance_stats.push(AttendanceStat {
                student_id: student.student_id.clone(),
                attendance: cell_value(&student.fields, ATTENDANCE_PERCENT),
            });
            score_trends.push(ScoreTrendStat {
                student_id: student.student_id.clone(),
                previous_avg: cell_value(&student.fields, PREVIOUS_3_TESTS_AVG),
                current_avg: cell_value(&student.fields, LAST_3_TESTS_AVG),
            });
        }

        let high_risk_percentage = if self.students.is_empty() {
            0.0
        } else {
            let share = distribution.high as f64 / self.students.len() as f64 * 100.0;
            (share * 10.0).round() / 10.0
        };

        RosterSummary {
            total_students: self.students.len(),
            risk_distribution: distribution,
            attendance_stats,
            score_trends,
            high_risk_percentage,
        }
    }
}
