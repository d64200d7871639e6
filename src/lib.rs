//! Prefkeep: local-first preference persistence and startup restoration.
//!
//! Prefkeep stores small pieces of session state (paths, the last searched
//! function name, a theme mode) in a versioned SQLite container and rebuilds
//! the session from them on the next launch, including driving a flip-only
//! dark/light toggle to the persisted theme.
//!
//! # Architecture
//!
//! - [`core::store::PreferenceStore`]: async key/value store. One transaction
//!   per operation, schema versioned through `PRAGMA user_version`.
//! - [`session::registry`]: the closed set of known keys and their roles.
//! - [`session::restore`]: startup restoration with per-key error isolation.
//! - [`session::theme`]: the two-state theme machine and toggle planning.
//! - [`session::live`]: save-on-input path and collaborator-driven actions.
//!
//! The store handle is built once by the caller (the CLI below, or an
//! embedding application) and passed to whatever needs persistence.
//!
//! # Examples
//!
//! ```bash
//! prefkeep init
//! prefkeep set workspacePath /src/project
//! prefkeep set themeMode dark
//! prefkeep restore --no-delay
//! ```

mod cli;
pub mod core;
pub mod session;

use crate::cli::{Cli, Command, KeyArg, OutputFormat, StartArg, StrategyArg};
use crate::core::config::{self, Config, ThemeStrategy};
use crate::core::db::StoreLocation;
use crate::core::error::PrefError;
use crate::core::output;
use crate::core::schemas;
use crate::core::store::PreferenceStore;
use crate::core::time;
use crate::session::registry::{PreferenceKey, ThemeMode};
use crate::session::restore::{self, RestoreOptions, RestoreReport};
use crate::session::theme::{SimulatedToggle, ThemeState};

use clap::Parser;
use colored::Colorize;
use serde_json::Value;

const VALUE_PREVIEW_CHARS: usize = 80;

pub async fn run() -> Result<(), PrefError> {
    let cli = Cli::parse();

    if let Command::Version = cli.command {
        println!("v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if let Command::Keys = cli.command {
        print_keys();
        return Ok(());
    }

    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    let store = PreferenceStore::new(StoreLocation::file(&config.database_path));

    match cli.command {
        Command::Init => {
            let existed = store.location().exists();
            store.init().await?;
            let verb = if existed { "is ready" } else { "created" };
            println!(
                "{} Preference store {} at {} (schema v{})",
                "✓".bright_green(),
                verb,
                store.location(),
                schemas::PREFERENCES_SCHEMA_VERSION
            );
        }
        Command::Set { key, value, json } => {
            let key = checked_key(&key)?;
            let value = parse_value(&key, &value, json)?;
            store.init().await?;
            store.set(&key, value).await?;
            println!("{} {}", "✓".bright_green(), key);
        }
        Command::Get { key } => {
            let key = checked_key(&key)?;
            store.init().await?;
            match store.get(&key).await? {
                Some(Value::String(s)) => println!("{}", s),
                Some(other) => println!("{}", other),
                None => {
                    return Err(PrefError::Validation(format!("{} is not set", key)));
                }
            }
        }
        Command::Show { key, format } => {
            let key = checked_key(&key)?;
            store.init().await?;
            let Some(record) = store.get_record(&key).await? else {
                return Err(PrefError::Validation(format!("{} is not set", key)));
            };
            match format {
                OutputFormat::Json => print_json(&record),
                OutputFormat::Text => {
                    println!("{}: {}", "key".bold(), record.key);
                    println!("{}: {}", "value".bold(), record.value);
                    println!(
                        "{}: {}",
                        "written".bold(),
                        time::format_millis_utc(record.timestamp)
                    );
                }
            }
        }
        Command::List { format } => {
            store.init().await?;
            let all = store.get_all().await?;
            match format {
                OutputFormat::Json => print_json(&all),
                OutputFormat::Text if all.is_empty() => println!("No preferences stored."),
                OutputFormat::Text => {
                    for (key, value) in &all {
                        println!(
                            "{} = {}",
                            key.bright_cyan(),
                            output::render_value(value, VALUE_PREVIEW_CHARS)
                        );
                    }
                }
            }
        }
        Command::Remove { key } => {
            let key = checked_key(&key)?;
            store.init().await?;
            if store.remove(&key).await? {
                println!("{} removed {}", "✓".bright_green(), key);
            } else {
                println!("{} {} was not set", "▸".bright_yellow(), key);
            }
        }
        Command::Clear => {
            store.init().await?;
            store.clear().await?;
            println!("{} All preferences cleared", "✓".bright_green());
        }
        Command::Restore {
            start,
            strategy,
            no_delay,
            format,
        } => {
            let start = match start {
                StartArg::Light => ThemeState::Light,
                StartArg::Dark => ThemeState::Dark,
            };
            let mut options = RestoreOptions::from(&config);
            if let Some(strategy) = strategy {
                options.strategy = match strategy {
                    StrategyArg::AssumeLight => ThemeStrategy::AssumeLight,
                    StrategyArg::QueryFirst => ThemeStrategy::QueryFirst,
                };
            }
            if no_delay {
                options.theme_delay = std::time::Duration::ZERO;
            }

            let toggle = SimulatedToggle::new(start);
            let report = restore::startup(&store, &toggle, &options).await;
            match format {
                OutputFormat::Json => print_json(&report),
                OutputFormat::Text => print_report(&report, &config),
            }
        }
        Command::Keys | Command::Version => {}
    }

    Ok(())
}

fn checked_key(arg: &KeyArg) -> Result<String, PrefError> {
    if !arg.any_key {
        arg.key.parse::<PreferenceKey>()?;
    }
    Ok(arg.key.clone())
}

fn parse_value(key: &str, raw: &str, json: bool) -> Result<Value, PrefError> {
    if json {
        return serde_json::from_str(raw)
            .map_err(|e| PrefError::Validation(format!("invalid JSON value: {}", e)));
    }
    if key == PreferenceKey::ThemeMode.as_str() {
        let mode = raw.trim().parse::<ThemeMode>()?;
        return Ok(Value::String(mode.as_str().to_string()));
    }
    Ok(Value::String(raw.trim().to_string()))
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("failed to render JSON: {}", e),
    }
}

fn print_keys() {
    for key in PreferenceKey::ALL {
        println!(
            "{:<18} {:<6} {}",
            key.as_str().bright_cyan(),
            format!("{:?}", key.role()).to_lowercase(),
            key.description()
        );
    }
}

fn print_report(report: &RestoreReport, config: &Config) {
    if let Some(err) = &report.store_error {
        println!(
            "{} Preference store unavailable at {}: {}",
            "✗".bright_red(),
            config.database_path.display(),
            err
        );
        println!("  Continuing with default preferences.");
        return;
    }

    let session = &report.session;
    for key in PreferenceKey::ALL {
        let shown = match session.field(key) {
            Some(value) if value.is_empty() => "(default)".dimmed().to_string(),
            Some(value) => value.to_string(),
            None => session.theme_mode.to_string(),
        };
        println!("{:<18} {}", key.as_str().bright_cyan(), shown);
    }

    match &report.theme {
        Some(outcome) if outcome.reached_target() => println!(
            "{} theme {:?} applied with {} toggle(s)",
            "✓".bright_green(),
            outcome.target,
            outcome.toggles
        ),
        Some(outcome) => println!(
            "{} theme {:?} requested, {} toggle(s) left it {:?}",
            "▸".bright_yellow(),
            outcome.target,
            outcome.toggles,
            outcome.final_state
        ),
        None => println!("  theme left to system"),
    }

    for failure in &report.failures {
        println!(
            "{} {}: {}",
            "✗".bright_red(),
            failure.key,
            output::compact_line(&failure.error, VALUE_PREVIEW_CHARS)
        );
    }
}
