use thiserror::Error;

use crate::db::DatabaseError;
use crate::store::StorageError;

/// A single field-level validation failure, reported with the offending
/// field's path (e.g. `groups[2].probability`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Error, Debug)]
pub enum SurveyError {
    /// Pre-reconciliation validation failed. Nothing was written.
    #[error("Validation failed: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// An update item referenced an id that does not exist in its parent
    /// scope, or a translation key that is not registered.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Structural conflict: the targeted subtree is referenced by recorded
    /// attempt/answer data and cannot be destructively edited.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<rusqlite::Error> for SurveyError {
    fn from(e: rusqlite::Error) -> Self {
        SurveyError::Database(DatabaseError::Sqlite(e))
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, SurveyError>;
