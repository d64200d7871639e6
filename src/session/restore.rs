//! Startup restoration: read every registry key and reapply it to a fresh
//! live session, then drive the theme toggle to the persisted mode.
//!
//! Each key is its own unit of work. A failed read is logged and recorded in
//! the report; it never stops the other keys from restoring.

use crate::core::config::{Config, ThemeStrategy};
use crate::core::error::StoreError;
use crate::core::store::{PreferenceBackend, PreferenceStore};
use crate::session::live::LiveSession;
use crate::session::registry::{PreferenceKey, ThemeMode};
use crate::session::theme::{self, ThemeOutcome, ThemeState, ThemeToggle};
use log::{error, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Wait before driving the theme so the toggle owner can finish starting.
    pub theme_delay: Duration,
    pub strategy: ThemeStrategy,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for RestoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            theme_delay: config.theme_restore_delay(),
            strategy: config.theme_strategy,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct KeyFailure {
    pub key: PreferenceKey,
    pub error: String,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub session: LiveSession,
    /// Keys that had a stored value which was applied.
    pub restored: Vec<PreferenceKey>,
    pub failures: Vec<KeyFailure>,
    pub theme: Option<ThemeOutcome>,
    /// Set when the store could not be opened and everything stayed default.
    pub store_error: Option<String>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.store_error.is_none()
    }

    fn fail(&mut self, key: PreferenceKey, error: impl ToString) {
        let error = error.to_string();
        warn!("could not restore {}: {}", key, error);
        self.failures.push(KeyFailure { key, error });
    }
}

/// Open the store, then restore. If the store cannot be opened the session
/// keeps its defaults and the theme is left to the system.
pub async fn startup(
    store: &PreferenceStore,
    toggle: &dyn ThemeToggle,
    options: &RestoreOptions,
) -> RestoreReport {
    match store.init().await {
        Ok(()) => restore(store, toggle, options).await,
        Err(e) => {
            error!("failed to initialize preferences: {}", e);
            RestoreReport {
                store_error: Some(e.to_string()),
                ..Default::default()
            }
        }
    }
}

/// Rebuild a live session from the store and apply the persisted theme.
pub async fn restore(
    backend: &dyn PreferenceBackend,
    toggle: &dyn ThemeToggle,
    options: &RestoreOptions,
) -> RestoreReport {
    let (workspace, output, function, theme_mode) = tokio::join!(
        read_text(backend, PreferenceKey::WorkspacePath),
        read_text(backend, PreferenceKey::OutputPath),
        read_text(backend, PreferenceKey::FunctionName),
        backend.get_preference(PreferenceKey::ThemeMode.as_str()),
    );

    let mut report = RestoreReport::default();
    for (key, result) in [
        (PreferenceKey::WorkspacePath, workspace),
        (PreferenceKey::OutputPath, output),
        (PreferenceKey::FunctionName, function),
    ] {
        match result {
            Ok(Some(value)) => {
                if let Some(field) = report.session.field_mut(key) {
                    *field = value;
                }
                report.restored.push(key);
            }
            Ok(None) => {}
            Err(e) => report.fail(key, e),
        }
    }

    let mode = match theme_mode {
        Ok(Some(value)) => {
            report.restored.push(PreferenceKey::ThemeMode);
            ThemeMode::from_stored(&value)
        }
        Ok(None) => ThemeMode::System,
        Err(e) => {
            report.fail(PreferenceKey::ThemeMode, e);
            ThemeMode::System
        }
    };
    report.session.theme_mode = mode;

    if let Some(target) = ThemeState::target_for(mode) {
        info!("restoring {} theme", mode);
        if !options.theme_delay.is_zero() {
            tokio::time::sleep(options.theme_delay).await;
        }
        match theme::drive_to(toggle, target, options.strategy).await {
            Ok(outcome) => report.theme = Some(outcome),
            Err(e) => report.fail(PreferenceKey::ThemeMode, e),
        }
    }

    report
}

/// A plain key's stored string. Empty strings count as absent so the live
/// field keeps its default.
async fn read_text(
    backend: &dyn PreferenceBackend,
    key: PreferenceKey,
) -> Result<Option<String>, StoreError> {
    match backend.get_preference(key.as_str()).await? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(StoreError::Serialization(format!(
            "expected a string for {}, found {}",
            key, other
        ))),
    }
}
