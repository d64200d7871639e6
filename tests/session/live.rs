use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use prefkeep::core::db::StoreLocation;
use prefkeep::core::error::{CollaboratorError, PrefError};
use prefkeep::core::store::PreferenceStore;
use prefkeep::session::collaborators::{CsvExporter, DirectoryPicker, SearchResult, SearchService};
use prefkeep::session::live::LiveSession;
use prefkeep::session::registry::{PreferenceKey, ThemeMode};
use serde_json::json;
use std::sync::Mutex;

async fn memory_store() -> PreferenceStore {
    let store = PreferenceStore::new(StoreLocation::Memory);
    store.init().await.expect("init");
    store
}

struct FixedPicker {
    workspace: Option<String>,
    output: Option<String>,
}

#[async_trait]
impl DirectoryPicker for FixedPicker {
    async fn pick_workspace(&self) -> Result<Option<String>, CollaboratorError> {
        Ok(self.workspace.clone())
    }

    async fn pick_output(&self) -> Result<Option<String>, CollaboratorError> {
        Ok(self.output.clone())
    }
}

#[derive(Default)]
struct RecordingSearch {
    calls: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl SearchService for RecordingSearch {
    async fn search_and_inject(
        &self,
        function_name: &str,
        workspace_path: &str,
    ) -> Result<Vec<SearchResult>, CollaboratorError> {
        self.calls
            .lock()
            .unwrap()
            .push((function_name.to_string(), workspace_path.to_string()));
        Ok(vec![sample_result()])
    }
}

#[derive(Default)]
struct RecordingExporter {
    calls: Mutex<Vec<(usize, String, String)>>,
}

#[async_trait]
impl CsvExporter for RecordingExporter {
    async fn export(
        &self,
        results: &[SearchResult],
        output_path: &str,
        filename: &str,
    ) -> Result<(), CollaboratorError> {
        self.calls.lock().unwrap().push((
            results.len(),
            output_path.to_string(),
            filename.to_string(),
        ));
        Ok(())
    }
}

fn sample_result() -> SearchResult {
    SearchResult {
        file_name: "src/flux.f90".to_string(),
        line_number: 42,
        function_call: "call compute_flux(a, b)".to_string(),
        parameters: vec!["a".to_string(), "b".to_string()],
        status: "Injected".to_string(),
    }
}

#[tokio::test]
async fn input_edits_are_trimmed_and_persisted() {
    let store = memory_store().await;
    let mut session = LiveSession::default();

    assert!(
        session
            .record_input(&store, PreferenceKey::WorkspacePath, "  /repo  ")
            .await
    );
    assert!(
        session
            .record_input(&store, PreferenceKey::FunctionName, "compute_flux\n")
            .await
    );

    assert_eq!(session.workspace_path, "/repo");
    assert_eq!(store.get("workspacePath").await.unwrap(), Some(json!("/repo")));
    assert_eq!(
        store.get("lastFunctionName").await.unwrap(),
        Some(json!("compute_flux"))
    );
}

#[tokio::test]
async fn theme_input_is_validated() {
    let store = memory_store().await;
    let mut session = LiveSession::default();

    assert!(session.record_input(&store, PreferenceKey::ThemeMode, "dark").await);
    assert_eq!(session.theme_mode, ThemeMode::Dark);
    assert_eq!(store.get("themeMode").await.unwrap(), Some(json!("dark")));

    assert!(!session.record_input(&store, PreferenceKey::ThemeMode, "neon").await);
    assert_eq!(session.theme_mode, ThemeMode::Dark);
    assert_eq!(store.get("themeMode").await.unwrap(), Some(json!("dark")));
}

#[tokio::test]
async fn cycle_theme_persists_each_step() {
    let store = memory_store().await;
    let mut session = LiveSession::default();

    assert_eq!(session.cycle_theme(&store).await, ThemeMode::Dark);
    assert_eq!(session.cycle_theme(&store).await, ThemeMode::Light);
    assert_eq!(store.get("themeMode").await.unwrap(), Some(json!("light")));
}

#[tokio::test]
async fn failed_save_keeps_the_live_edit() {
    let store = PreferenceStore::new(StoreLocation::Memory);
    let mut session = LiveSession::default();

    let persisted = session
        .record_input(&store, PreferenceKey::OutputPath, "/out")
        .await;
    assert!(!persisted);
    assert_eq!(session.output_path, "/out");
}

#[tokio::test]
async fn picked_directories_are_applied_and_saved() {
    let store = memory_store().await;
    let mut session = LiveSession::default();
    let picker = FixedPicker {
        workspace: Some("/src/project".to_string()),
        output: None,
    };

    let picked = session.browse_workspace(&picker, &store).await.unwrap();
    assert_eq!(picked.as_deref(), Some("/src/project"));
    assert_eq!(session.workspace_path, "/src/project");
    assert_eq!(
        store.get("workspacePath").await.unwrap(),
        Some(json!("/src/project"))
    );

    // Dismissed dialog leaves everything alone.
    session.output_path = "/keep".to_string();
    assert_eq!(session.browse_output(&picker, &store).await.unwrap(), None);
    assert_eq!(session.output_path, "/keep");
    assert_eq!(store.get("outputPath").await.unwrap(), None);
}

#[tokio::test]
async fn search_defaults_workspace_and_requires_function() {
    let search = RecordingSearch::default();
    let mut session = LiveSession::default();

    let err = session.start_search(&search).await.unwrap_err();
    assert!(matches!(err, PrefError::Validation(_)));
    assert!(search.calls.lock().unwrap().is_empty());

    session.function_name = "compute_flux".to_string();
    let results = session.start_search(&search).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(
        search.calls.lock().unwrap().as_slice(),
        &[("compute_flux".to_string(), ".".to_string())]
    );
    assert_eq!(session.workspace_path, ".");
}

#[tokio::test]
async fn export_names_file_from_function_and_utc_time() {
    let exporter = RecordingExporter::default();
    let session = LiveSession {
        function_name: "compute_flux".to_string(),
        ..Default::default()
    };
    let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();

    let err = session.export_results(&exporter, &[], now).await.unwrap_err();
    assert!(err.to_string().contains("No results to export"));

    let filename = session
        .export_results(&exporter, &[sample_result()], now)
        .await
        .unwrap();
    assert_eq!(filename, "compute_flux_20260102_0304.csv");
    assert_eq!(
        exporter.calls.lock().unwrap().as_slice(),
        &[(1, ".".to_string(), filename)]
    );
}
