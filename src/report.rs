use std::fmt::Write;

use crate::models::RiskLevel;
use crate::notes::NotesStore;
use crate::risk::RiskConfig;
use crate::roster::Roster;
use crate::views::round3;

const HIGHEST_RISK_LIMIT: usize = 10;
const RECENT_NOTE_LIMIT: usize = 5;

pub fn build_report(roster: &Roster, notes: &NotesStore, config: &RiskConfig) -> String {
    let summary = roster.summary(config);
    let ranked = roster.ranked(config);

    let mut output = String::new();

    let _ = writeln!(output, "# Student Dropout Risk Report");
    let _ = writeln!(output, "Generated for {} students", summary.total_students);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Mix");

    if roster.is_empty() {
        let _ = writeln!(output, "No student data loaded.");
    } else {
        let distribution = summary.risk_distribution;
        for (level, count) in [
            (RiskLevel::High, distribution.high),
            (RiskLevel::Medium, distribution.medium),
            (RiskLevel::Low, distribution.low),
        ] {
            let _ = writeln!(output, "- {}: {} students", level.as_str(), count);
        }
        let _ = writeln!(
            output,
            "- High risk share: {:.1}%",
            summary.high_risk_percentage
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Risk Students");

    let flagged: Vec<_> = ranked
        .iter()
        .filter(|entry| entry.summary.risk_level != RiskLevel::Low)
        .take(HIGHEST_RISK_LIMIT)
        .collect();

    if flagged.is_empty() {
        let _ = writeln!(output, "No students above Low risk.");
    } else {
        for entry in flagged {
            let student = entry.student;
            let assessment = student.explain(config);
            let reasons: Vec<String> = assessment
                .top_reasons
                .iter()
                .map(|factor| format!("{} {}", factor.component.label(), factor.value))
                .collect();

            let _ = writeln!(
                output,
                "- {} ({}, {}) {} risk, score {:.3}: {}",
                student.full_name(),
                student.student_id,
                student.class,
                entry.summary.risk_level.as_str(),
                round3(entry.summary.risk_score),
                reasons.join("; ")
            );
            if let Some(first) = assessment.recommendations.first() {
                let _ = writeln!(output, "  - Next step: {first}");
            }
        }
    }

    let unscored: Vec<_> = ranked
        .iter()
        .filter(|entry| entry.summary.error.is_some())
        .collect();
    if !unscored.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Records Needing Cleanup");
        for entry in unscored {
            let _ = writeln!(
                output,
                "- {} ({}): {}",
                entry.student.full_name(),
                entry.student.student_id,
                entry.summary.error.as_deref().unwrap_or_default()
            );
        }
    }

    let mut recent: Vec<_> = notes.iter().collect();
    recent.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Intervention Notes");

    if recent.is_empty() {
        let _ = writeln!(output, "No intervention notes recorded.");
    } else {
        for (student_id, note) in recent.iter().take(RECENT_NOTE_LIMIT) {
            let _ = writeln!(
                output,
                "- {} by {} on {}: {}",
                student_id,
                note.mentor_id,
                note.timestamp.format("%Y-%m-%d"),
                note.note
            );
        }
    }

    output
}
