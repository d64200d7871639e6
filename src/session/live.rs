//! The live session: field values the user is editing, and the save-on-input
//! path that writes each edit through to the store.
//!
//! Writes here never fail the caller. A store error is logged and that one
//! edit simply does not persist; the next edit is the retry.

use crate::core::error::{CollaboratorError, PrefError};
use crate::core::store::PreferenceBackend;
use crate::core::time;
use crate::session::collaborators::{CsvExporter, DirectoryPicker, SearchResult, SearchService};
use crate::session::registry::{PreferenceKey, ThemeMode};
use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use serde::Serialize;
use serde_json::Value;

/// Directory used when the workspace or output field is left empty.
pub const DEFAULT_DIR: &str = ".";

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveSession {
    pub workspace_path: String,
    pub output_path: String,
    pub function_name: String,
    pub theme_mode: ThemeMode,
}

/// Arguments handed to the search service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub function_name: String,
    pub workspace_path: String,
}

/// Write one key, logging instead of returning a failure. Returns whether the
/// value persisted.
pub async fn save_preference(
    backend: &dyn PreferenceBackend,
    key: PreferenceKey,
    value: Value,
) -> bool {
    match backend.set_preference(key.as_str(), value).await {
        Ok(()) => {
            debug!("saved {}", key);
            true
        }
        Err(e) => {
            error!("failed to save preference {}: {}", key, e);
            false
        }
    }
}

impl LiveSession {
    /// The live text field backing a plain (non-theme) key.
    pub fn field(&self, key: PreferenceKey) -> Option<&str> {
        match key {
            PreferenceKey::WorkspacePath => Some(&self.workspace_path),
            PreferenceKey::OutputPath => Some(&self.output_path),
            PreferenceKey::FunctionName => Some(&self.function_name),
            PreferenceKey::ThemeMode => None,
        }
    }

    pub fn field_mut(&mut self, key: PreferenceKey) -> Option<&mut String> {
        match key {
            PreferenceKey::WorkspacePath => Some(&mut self.workspace_path),
            PreferenceKey::OutputPath => Some(&mut self.output_path),
            PreferenceKey::FunctionName => Some(&mut self.function_name),
            PreferenceKey::ThemeMode => None,
        }
    }

    /// Apply an edit to a field and persist it. Input is trimmed first.
    ///
    /// Theme input is parsed as a [`ThemeMode`]; an unparseable mode is
    /// rejected without touching the session or the store.
    pub async fn record_input(
        &mut self,
        backend: &dyn PreferenceBackend,
        key: PreferenceKey,
        raw: &str,
    ) -> bool {
        let value = raw.trim();
        match self.field_mut(key) {
            Some(field) => {
                *field = value.to_string();
                save_preference(backend, key, Value::String(value.to_string())).await
            }
            None => match value.parse::<ThemeMode>() {
                Ok(mode) => self.set_theme_mode(backend, mode).await,
                Err(e) => {
                    warn!("{}", e);
                    false
                }
            },
        }
    }

    pub async fn set_theme_mode(
        &mut self,
        backend: &dyn PreferenceBackend,
        mode: ThemeMode,
    ) -> bool {
        self.theme_mode = mode;
        save_preference(
            backend,
            PreferenceKey::ThemeMode,
            Value::String(mode.as_str().to_string()),
        )
        .await
    }

    /// Advance the theme picker one step and persist the new mode.
    pub async fn cycle_theme(&mut self, backend: &dyn PreferenceBackend) -> ThemeMode {
        let next = self.theme_mode.cycle();
        self.set_theme_mode(backend, next).await;
        next
    }

    pub async fn browse_workspace(
        &mut self,
        picker: &dyn DirectoryPicker,
        backend: &dyn PreferenceBackend,
    ) -> Result<Option<String>, CollaboratorError> {
        let picked = picker.pick_workspace().await?;
        self.apply_pick(backend, PreferenceKey::WorkspacePath, picked).await
    }

    pub async fn browse_output(
        &mut self,
        picker: &dyn DirectoryPicker,
        backend: &dyn PreferenceBackend,
    ) -> Result<Option<String>, CollaboratorError> {
        let picked = picker.pick_output().await?;
        self.apply_pick(backend, PreferenceKey::OutputPath, picked).await
    }

    async fn apply_pick(
        &mut self,
        backend: &dyn PreferenceBackend,
        key: PreferenceKey,
        picked: Option<String>,
    ) -> Result<Option<String>, CollaboratorError> {
        let Some(path) = picked.filter(|p| !p.is_empty()) else {
            return Ok(None);
        };
        if let Some(field) = self.field_mut(key) {
            field.clone_from(&path);
        }
        save_preference(backend, key, Value::String(path.clone())).await;
        Ok(Some(path))
    }

    /// Validate the search fields. An empty workspace becomes `.` and the
    /// live field is updated to show it.
    pub fn prepare_search(&mut self) -> Result<SearchRequest, PrefError> {
        let function_name = self.function_name.trim().to_string();
        if function_name.is_empty() {
            return Err(PrefError::Validation(
                "Please enter a function name".to_string(),
            ));
        }
        if self.workspace_path.trim().is_empty() {
            self.workspace_path = DEFAULT_DIR.to_string();
        }
        Ok(SearchRequest {
            function_name,
            workspace_path: self.workspace_path.trim().to_string(),
        })
    }

    pub async fn start_search(
        &mut self,
        search: &dyn SearchService,
    ) -> Result<Vec<SearchResult>, PrefError> {
        let request = self.prepare_search()?;
        Ok(search
            .search_and_inject(&request.function_name, &request.workspace_path)
            .await?)
    }

    /// Export results to `<output>/<function>_<YYYYMMDD>_<HHMM>.csv`.
    /// Returns the file name handed to the exporter.
    pub async fn export_results(
        &self,
        exporter: &dyn CsvExporter,
        results: &[SearchResult],
        now: DateTime<Utc>,
    ) -> Result<String, PrefError> {
        if results.is_empty() {
            return Err(PrefError::Validation("No results to export".to_string()));
        }
        let output_path = match self.output_path.trim() {
            "" => DEFAULT_DIR,
            path => path,
        };
        let filename = export_filename(self.function_name.trim(), now);
        exporter.export(results, output_path, &filename).await?;
        Ok(filename)
    }
}

pub fn export_filename(function_name: &str, now: DateTime<Utc>) -> String {
    let (date, time) = time::export_stamp(now);
    format!("{}_{}_{}.csv", function_name, date, time)
}
