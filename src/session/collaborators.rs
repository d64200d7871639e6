//! Boundaries to services the session calls but does not implement:
//! directory dialogs, recursive search/injection, and CSV export.

use crate::core::error::CollaboratorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One call site found (and possibly instrumented) by the search service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub file_name: String,
    pub line_number: u32,
    pub function_call: String,
    pub parameters: Vec<String>,
    pub status: String,
}

#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    /// `Ok(None)` when the user dismissed the dialog.
    async fn pick_workspace(&self) -> Result<Option<String>, CollaboratorError>;

    async fn pick_output(&self) -> Result<Option<String>, CollaboratorError>;
}

#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search_and_inject(
        &self,
        function_name: &str,
        workspace_path: &str,
    ) -> Result<Vec<SearchResult>, CollaboratorError>;
}

#[async_trait]
pub trait CsvExporter: Send + Sync {
    async fn export(
        &self,
        results: &[SearchResult],
        output_path: &str,
        filename: &str,
    ) -> Result<(), CollaboratorError>;
}
