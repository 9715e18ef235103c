use crate::error::RecordError;
use crate::models::{RecordFields, StudentRecord};

pub const ATTENDANCE_PERCENT: &str = "attendance_percent";
pub const FEES_DUE_DAYS: &str = "fees_due_days";
pub const ATTEMPTS_IN_SUBJECT: &str = "attempts_in_subject_X";
pub const LAST_3_TESTS_AVG: &str = "last_3_tests_avg";
pub const PREVIOUS_3_TESTS_AVG: &str = "previous_3_tests_avg";

/// Columns the engine reads.
pub const SCORED_FIELDS: [&str; 5] = [
    ATTENDANCE_PERCENT,
    FEES_DUE_DAYS,
    ATTEMPTS_IN_SUBJECT,
    LAST_3_TESTS_AVG,
    PREVIOUS_3_TESTS_AVG,
];

/// Converts raw cells into a typed record.
///
/// Absent or blank cells take their defaults (attendance 0, fees 0,
/// attempts 1, averages 0). Unknown columns are ignored.
pub fn parse_record(fields: &RecordFields) -> Result<StudentRecord, RecordError> {
    Ok(StudentRecord {
        attendance_percent: real_field(fields, ATTENDANCE_PERCENT, 0.0)?,
        fees_due_days: integer_field(fields, FEES_DUE_DAYS, 0)?,
        attempts_in_subject: integer_field(fields, ATTEMPTS_IN_SUBJECT, 1)?,
        last_3_tests_avg: real_field(fields, LAST_3_TESTS_AVG, 0.0)?,
        previous_3_tests_avg: real_field(fields, PREVIOUS_3_TESTS_AVG, 0.0)?,
    })
}

fn cell<'a>(fields: &'a RecordFields, name: &str) -> Option<&'a str> {
    fields
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn unparsable(name: &str, text: &str) -> RecordError {
    RecordError::Unparsable {
        field: name.to_string(),
        value: text.to_string(),
    }
}

fn real_field(fields: &RecordFields, name: &str, default: f64) -> Result<f64, RecordError> {
    let Some(text) = cell(fields, name) else {
        return Ok(default);
    };

    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(unparsable(name, text)),
    }
}

// Spreadsheet exports write whole numbers as "30.0"; those are accepted.
fn integer_field(fields: &RecordFields, name: &str, default: i64) -> Result<i64, RecordError> {
    let Some(text) = cell(fields, name) else {
        return Ok(default);
    };

    if let Ok(value) = text.parse::<i64>() {
        return Ok(value);
    }

    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 => {
            Ok(value as i64)
        }
        _ => Err(unparsable(name, text)),
    }
}
