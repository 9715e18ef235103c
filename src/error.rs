use thiserror::Error;

/// The engine's only failure: a numeric field that does not convert.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("could not convert {field} value {value:?} to a number")]
    Unparsable { field: String, value: String },

    #[error("row ends before {}", .fields.join(", "))]
    MissingCells { fields: Vec<String> },
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

#[derive(Debug, Error)]
pub enum NotesError {
    #[error("note text is required")]
    EmptyNote,
}
