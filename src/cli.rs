//! CLI struct definitions for the prefkeep command-line interface.
//!
//! All clap-derived types live here. Dispatch lives in `lib.rs`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "prefkeep",
    version = env!("CARGO_PKG_VERSION"),
    about = "Persist session preferences and restore them, theme included, on the next launch.",
    disable_version_flag = true
)]
pub(crate) struct Cli {
    /// Config file (defaults to $PREFKEEP_CONFIG, then the platform data dir).
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    /// Preference database path, overriding the config file.
    #[clap(long, global = true)]
    pub db: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StrategyArg {
    AssumeLight,
    QueryFirst,
}

/// Starting state of the simulated theme toggle.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum StartArg {
    #[default]
    Light,
    Dark,
}

#[derive(clap::Args, Debug)]
pub(crate) struct KeyArg {
    /// Preference key (see `prefkeep keys`).
    pub key: String,
    /// Allow keys outside the preference registry.
    #[clap(long)]
    pub any_key: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Create the preference database (or upgrade its schema)
    Init,
    /// Store a value
    Set {
        #[clap(flatten)]
        key: KeyArg,
        /// Value to store; stored as a string unless --json is given.
        value: String,
        /// Parse the value as JSON.
        #[clap(long)]
        json: bool,
    },
    /// Print a stored value
    Get {
        #[clap(flatten)]
        key: KeyArg,
    },
    /// Print a stored record with its write time
    Show {
        #[clap(flatten)]
        key: KeyArg,
        #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List every stored preference
    List {
        #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Delete one stored preference
    Remove {
        #[clap(flatten)]
        key: KeyArg,
    },
    /// Delete every stored preference
    Clear,
    /// Run startup restoration against an in-process theme toggle
    Restore {
        /// Theme state the simulated toggle starts in.
        #[clap(long, value_enum, default_value_t = StartArg::Light)]
        start: StartArg,
        /// Override the configured theme strategy.
        #[clap(long, value_enum)]
        strategy: Option<StrategyArg>,
        /// Skip the theme deferral delay.
        #[clap(long)]
        no_delay: bool,
        #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the known preference keys
    Keys,
    /// Print version
    Version,
}
