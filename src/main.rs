use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

mod config;
mod error;
mod models;
mod notes;
mod record;
mod report;
mod risk;
mod roster;
mod views;

use config::AppConfig;
use notes::NotesStore;
use risk::RiskConfig;
use roster::Roster;
use views::{round3, AssessmentView, StudentDetail, StudentList};

#[derive(Parser)]
#[command(name = "dropout-risk")]
#[command(about = "Explainable dropout risk scoring for student mentors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank students by risk score
    Score {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Explain one student's risk with recommendations and notes
    Explain {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Record an intervention note for a student
    Note {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        text: String,
        #[arg(long)]
        mentor: Option<String>,
    },
    /// Print risk distribution and cohort statistics as JSON
    Summary {
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long, default_value = "risk-report.md")]
        out: PathBuf,
    },
}

fn load_roster(csv: Option<PathBuf>, app: &AppConfig) -> anyhow::Result<Roster> {
    let path = csv.unwrap_or_else(|| app.students_csv.clone());
    Roster::load(&path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app = AppConfig::from_env();
    config::init_tracing(&app.log_level);

    let risk_config = RiskConfig::default();

    match cli.command {
        Commands::Score { csv, limit, json } => {
            let roster = load_roster(csv, &app)?;
            let ranked = roster.ranked(&risk_config);

            if json {
                let list = StudentList::from_ranked(&ranked);
                println!("{}", serde_json::to_string_pretty(&list)?);
                return Ok(());
            }

            if ranked.is_empty() {
                println!("No students found in this data set.");
                return Ok(());
            }

            println!("Top students by risk score:");
            for entry in ranked.iter().take(limit) {
                println!(
                    "- {} ({}, {}) score {:.3} [{}]",
                    entry.student.full_name(),
                    entry.student.student_id,
                    entry.student.class,
                    round3(entry.summary.risk_score),
                    entry.summary.risk_level.as_str()
                );
            }
        }
        Commands::Explain {
            student_id,
            csv,
            json,
        } => {
            let roster = load_roster(csv, &app)?;
            let student = roster
                .find(&student_id)
                .with_context(|| format!("student {student_id} not found"))?;
            let notes = NotesStore::open(&app.notes_path).await?;
            let assessment = student.explain(&risk_config);

            if json {
                let detail =
                    StudentDetail::new(student, &assessment, notes.for_student(&student_id));
                println!("{}", serde_json::to_string_pretty(&detail)?);
                return Ok(());
            }

            let view = AssessmentView::from(&assessment);
            println!(
                "{} ({}): {} risk, score {:.3}",
                student.full_name(),
                student.student_id,
                view.risk_level.as_str(),
                view.risk_score
            );
            if let Some(error) = &view.error {
                println!("  {error}");
            }
            for factor in &view.risk_factors {
                println!(
                    "  - {}: {} (contribution {:.3}, {:?} severity)",
                    factor.factor, factor.value, factor.risk_contribution, factor.severity
                );
            }
            if !view.recommendations.is_empty() {
                println!("Recommendations:");
                for line in &view.recommendations {
                    println!("  - {line}");
                }
            }
            let student_notes = notes.for_student(&student_id);
            if !student_notes.is_empty() {
                println!("Intervention notes:");
                for note in student_notes {
                    println!("  - {} {}: {}", note.timestamp, note.mentor_id, note.note);
                }
            }
        }
        Commands::Note {
            student_id,
            text,
            mentor,
        } => {
            let mentor = mentor.unwrap_or_else(|| app.mentor_id.clone());
            let mut notes = NotesStore::open(&app.notes_path).await?;
            let note = notes.append(&student_id, &mentor, &text).await?;
            println!(
                "Note added for {student_id} at {} ({}).",
                note.timestamp,
                notes.path().display()
            );
        }
        Commands::Summary { csv } => {
            let roster = load_roster(csv, &app)?;
            let summary = roster.summary(&risk_config);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Report { csv, out } => {
            let roster = load_roster(csv, &app)?;
            let notes = NotesStore::open(&app.notes_path).await?;
            let report = report::build_report(&roster, &notes, &risk_config);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write report to {}", out.display()))?;
            info!(path = %out.display(), "report written");
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
