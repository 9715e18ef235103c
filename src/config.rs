use std::path::PathBuf;

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub students_csv: PathBuf,
    pub notes_path: PathBuf,
    pub mentor_id: String,
    pub log_level: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or blank keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var_or = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            students_csv: PathBuf::from(var_or("STUDENTS_CSV", "data/students_sample.csv")),
            notes_path: PathBuf::from(var_or("NOTES_PATH", "data/student_notes.json")),
            mentor_id: var_or("MENTOR_ID", "mentor"),
            log_level: var_or("LOG_LEVEL", "info"),
        }
    }
}

/// Reads `RUST_LOG` for the filter, falling back to the configured level.
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.students_csv, PathBuf::from("data/students_sample.csv"));
        assert_eq!(config.notes_path, PathBuf::from("data/student_notes.json"));
        assert_eq!(config.mentor_id, "mentor");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn reads_overrides_and_ignores_blank_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("STUDENTS_CSV", "/srv/cohort.csv"),
            ("MENTOR_ID", "  "),
            ("LOG_LEVEL", "debug"),
        ]);
        let config = AppConfig::from_lookup(|key| vars.get(key).map(|value| value.to_string()));
        assert_eq!(config.students_csv, PathBuf::from("/srv/cohort.csv"));
        assert_eq!(config.mentor_id, "mentor");
        assert_eq!(config.log_level, "debug");
    }
}
