use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use tracing::info;

use crate::error::NotesError;
use crate::models::InterventionNote;

/// Append-only intervention notes, persisted as one JSON object keyed by
/// student id.
#[derive(Debug)]
pub struct NotesStore {
    path: PathBuf,
    notes: BTreeMap<String, Vec<InterventionNote>>,
}

impl NotesStore {
    /// Opens the store, starting empty when the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let notes = match tokio::fs::read_to_string(&path).await {
            Ok(body) => serde_json::from_str(&body)
                .with_context(|| format!("notes file {} is not valid JSON", path.display()))?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read notes from {}", path.display()))
            }
        };

        Ok(Self { path, notes })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn for_student(&self, student_id: &str) -> &[InterventionNote] {
        self.notes
            .get(student_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InterventionNote)> {
        self.notes
            .iter()
            .flat_map(|(student_id, notes)| notes.iter().map(move |note| (student_id.as_str(), note)))
    }

    pub async fn append(
        &mut self,
        student_id: &str,
        mentor_id: &str,
        text: &str,
    ) -> anyhow::Result<InterventionNote> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NotesError::EmptyNote.into());
        }

        let note = InterventionNote {
            timestamp: Local::now().naive_local(),
            mentor_id: mentor_id.to_string(),
            note: text.to_string(),
        };
        self.notes
            .entry(student_id.to_string())
            .or_default()
            .push(note.clone());

        // Memory must not hold a note the file does not.
        if let Err(err) = self.save().await {
            if let Some(entries) = self.notes.get_mut(student_id) {
                entries.pop();
                if entries.is_empty() {
                    self.notes.remove(student_id);
                }
            }
            return Err(err);
        }

        info!(student_id, mentor_id, "intervention note saved");
        Ok(note)
    }

    async fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let body = serde_json::to_string_pretty(&self.notes)?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("failed to write notes to {}", self.path.display()))?;
        Ok(())
    }
}
