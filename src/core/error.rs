use std::io;
use thiserror::Error;

/// Failures surfaced by the preference store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Preference store not initialized")]
    NotInitialized,
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Schema migration to v{version} failed: {detail}")]
    Migration { version: u32, detail: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Failures reported by services the session drives but does not own
/// (theme toggle, directory dialogs, search/injection, CSV export).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("Theme toggle failed: {0}")]
    Toggle(String),
    #[error("Directory dialog failed: {0}")]
    Dialog(String),
    #[error("Search failed: {0}")]
    Search(String),
    #[error("Export failed: {0}")]
    Export(String),
}

#[derive(Error, Debug)]
pub enum PrefError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Unknown preference key: {0}")]
    UnknownKey(String),
    #[error("Validation error: {0}")]
    Validation(String),
}
