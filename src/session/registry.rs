//! The closed set of persisted preference keys and how callers interpret them.
//!
//! The store is schema-less; this registry is the call-site contract. Adding a
//! key means adding a variant here, not touching the storage schema.

use crate::core::error::PrefError;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PreferenceKey {
    #[serde(rename = "workspacePath")]
    WorkspacePath,
    #[serde(rename = "outputPath")]
    OutputPath,
    #[serde(rename = "themeMode")]
    ThemeMode,
    #[serde(rename = "lastFunctionName")]
    FunctionName,
}

/// Semantic role of a key's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    /// Filesystem path string.
    Path,
    /// Enum-like mode string.
    Mode,
    /// Free text.
    Text,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 4] = [
        PreferenceKey::WorkspacePath,
        PreferenceKey::OutputPath,
        PreferenceKey::ThemeMode,
        PreferenceKey::FunctionName,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            PreferenceKey::WorkspacePath => "workspacePath",
            PreferenceKey::OutputPath => "outputPath",
            PreferenceKey::ThemeMode => "themeMode",
            PreferenceKey::FunctionName => "lastFunctionName",
        }
    }

    pub const fn role(self) -> KeyRole {
        match self {
            PreferenceKey::WorkspacePath | PreferenceKey::OutputPath => KeyRole::Path,
            PreferenceKey::ThemeMode => KeyRole::Mode,
            PreferenceKey::FunctionName => KeyRole::Text,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            PreferenceKey::WorkspacePath => "Directory searched for function calls",
            PreferenceKey::OutputPath => "Directory exported result files are written to",
            PreferenceKey::ThemeMode => "Theme preference: system, light or dark",
            PreferenceKey::FunctionName => "Function name from the last search",
        }
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreferenceKey {
    type Err = PrefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PreferenceKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| PrefError::UnknownKey(s.to_string()))
    }
}

/// Persisted theme preference. `System` leaves the platform default alone.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    System,
    Light,
    Dark,
}

impl ThemeMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ThemeMode::System => "system",
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Next mode in the picker cycle: system -> dark -> light -> system.
    pub const fn cycle(self) -> ThemeMode {
        match self {
            ThemeMode::System => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::System,
        }
    }

    /// Interpret a stored value. Anything unrecognised falls back to `System`
    /// so a corrupt entry never drives the toggle.
    pub fn from_stored(value: &Value) -> ThemeMode {
        match value.as_str().map(str::parse::<ThemeMode>) {
            Some(Ok(mode)) => mode,
            _ => {
                warn!("ignoring unrecognised theme mode {}", value);
                ThemeMode::System
            }
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = PrefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(ThemeMode::System),
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(PrefError::Validation(format!(
                "unknown theme mode '{}' (expected system, light or dark)",
                other
            ))),
        }
    }
}
