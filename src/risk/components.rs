use crate::models::{ComponentRisks, StudentRecord};

/// Attendance at or above this percentage carries no risk.
pub const ATTENDANCE_FLOOR: f64 = 75.0;
/// Fees overdue this many days saturate the fee component.
pub const FEE_SATURATION_DAYS: f64 = 90.0;
/// Retakes beyond the first attempt that saturate the attempts component.
pub const ATTEMPT_SATURATION: f64 = 4.0;

pub fn attendance_risk(attendance_percent: f64) -> f64 {
    if attendance_percent >= ATTENDANCE_FLOOR {
        return 0.0;
    }
    ((ATTENDANCE_FLOOR - attendance_percent) / ATTENDANCE_FLOOR).clamp(0.0, 1.0)
}

/// Points lost between the two test windows, or `None` when either average
/// is the 0 "no data" sentinel.
pub fn score_drop(previous_avg: f64, current_avg: f64) -> Option<f64> {
    if previous_avg == 0.0 || current_avg == 0.0 {
        return None;
    }
    Some(previous_avg - current_avg)
}

pub fn score_trend_risk(previous_avg: f64, current_avg: f64) -> f64 {
    match score_drop(previous_avg, current_avg) {
        Some(drop) if drop > 0.0 => (drop / 100.0).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

pub fn fee_risk(fees_due_days: i64) -> f64 {
    (fees_due_days as f64 / FEE_SATURATION_DAYS).clamp(0.0, 1.0)
}

pub fn attempts_risk(attempts: i64) -> f64 {
    if attempts <= 1 {
        return 0.0;
    }
    ((attempts - 1) as f64 / ATTEMPT_SATURATION).clamp(0.0, 1.0)
}

pub fn component_risks(record: &StudentRecord) -> ComponentRisks {
    ComponentRisks {
        attendance: attendance_risk(record.attendance_percent),
        score_trend: score_trend_risk(record.previous_3_tests_avg, record.last_3_tests_avg),
        fees: fee_risk(record.fees_due_days),
        attempts: attempts_risk(record.attempts_in_subject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendance_risk_is_linear_below_floor() {
        assert_eq!(attendance_risk(75.0), 0.0);
        assert_eq!(attendance_risk(98.0), 0.0);
        assert_eq!(attendance_risk(0.0), 1.0);
        assert!((attendance_risk(37.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn attendance_risk_is_clamped_outside_percentage_range() {
        assert_eq!(attendance_risk(-20.0), 1.0);
        assert_eq!(attendance_risk(140.0), 0.0);
    }

    #[test]
    fn score_trend_ignores_flat_or_improving_scores() {
        assert_eq!(score_trend_risk(60.0, 60.0), 0.0);
        assert_eq!(score_trend_risk(60.0, 72.0), 0.0);
    }

    #[test]
    fn score_trend_scales_drop_by_hundred() {
        assert!((score_trend_risk(80.0, 60.0) - 0.20).abs() < 1e-9);
    }

    #[test]
    fn sentinel_average_suppresses_trend() {
        assert_eq!(score_trend_risk(0.0, 70.0), 0.0);
        assert_eq!(score_trend_risk(70.0, 0.0), 0.0);
        assert_eq!(score_drop(0.0, 70.0), None);
    }

    #[test]
    fn fee_risk_saturates_at_ninety_days() {
        assert_eq!(fee_risk(0), 0.0);
        assert_eq!(fee_risk(45), 0.5);
        assert_eq!(fee_risk(90), 1.0);
        assert_eq!(fee_risk(400), 1.0);
        assert_eq!(fee_risk(-5), 0.0);
    }

    #[test]
    fn attempts_risk_counts_retakes() {
        assert_eq!(attempts_risk(0), 0.0);
        assert_eq!(attempts_risk(1), 0.0);
        assert_eq!(attempts_risk(3), 0.5);
        assert_eq!(attempts_risk(5), 1.0);
        assert_eq!(attempts_risk(9), 1.0);
    }

    #[test]
    fn every_component_stays_in_unit_interval() {
        for attendance in [-50.0, 0.0, 49.9, 74.9, 75.0, 100.0, 250.0] {
            for fees in [-10, 0, 30, 91, 1000] {
                for attempts in [0, 1, 2, 4, 12] {
                    for (previous, current) in [(0.0, 50.0), (95.0, 10.0), (40.0, 90.0), (300.0, 1.0)] {
                        let risks = component_risks(&StudentRecord {
                            attendance_percent: attendance,
                            fees_due_days: fees,
                            attempts_in_subject: attempts,
                            last_3_tests_avg: current,
                            previous_3_tests_avg: previous,
                        });
                        for value in [risks.attendance, risks.score_trend, risks.fees, risks.attempts] {
                            assert!((0.0..=1.0).contains(&value));
                        }
                    }
                }
            }
        }
    }
}
