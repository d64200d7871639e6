use crate::core::error::StoreError;
use rusqlite::Connection;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const BUSY_TIMEOUT_SECS: u64 = 5;

/// Where the preference container lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// SQLite file on disk, created on first open.
    File(PathBuf),
    /// Private in-memory container; contents vanish with the handle.
    Memory,
}

impl StoreLocation {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        StoreLocation::File(path.into())
    }

    pub fn exists(&self) -> bool {
        match self {
            StoreLocation::File(path) => path.exists(),
            StoreLocation::Memory => false,
        }
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreLocation::File(path) => write!(f, "{}", path.display()),
            StoreLocation::Memory => write!(f, ":memory:"),
        }
    }
}

pub fn db_connect(location: &StoreLocation) -> Result<Connection, StoreError> {
    match location {
        StoreLocation::File(path) => db_connect_file(path),
        StoreLocation::Memory => Ok(Connection::open_in_memory()?),
    }
}

fn db_connect_file(db_path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS))?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))?;
    Ok(conn)
}
