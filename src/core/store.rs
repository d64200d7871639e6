//! Persistent preference store.
//!
//! A versioned, schema-less key/value container backed by SQLite. Every public
//! operation is async: the SQL runs on tokio's blocking pool inside its own
//! transaction against the single connection owned by the store. Issued
//! operations are not cancellable; dropping the returned future discards the
//! result but a write still lands.

use crate::core::db::{self, StoreLocation};
use crate::core::error::StoreError;
use crate::core::migration;
use crate::core::schemas;
use crate::core::time;
use async_trait::async_trait;
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// One stored preference: `key` is unique, `timestamp` is write time in epoch ms.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PreferenceRecord {
    pub key: String,
    pub value: Value,
    pub timestamp: i64,
}

/// Narrow async persistence surface the session layer depends on.
#[async_trait]
pub trait PreferenceBackend: Send + Sync {
    async fn set_preference(&self, key: &str, value: Value) -> Result<(), StoreError>;
    async fn get_preference(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn get_all_preferences(&self) -> Result<BTreeMap<String, Value>, StoreError>;
    async fn clear_preferences(&self) -> Result<(), StoreError>;
}

/// Store handle. Construct once at the composition root and share by reference
/// (or `Arc`); operations before a successful [`PreferenceStore::init`] fail
/// with [`StoreError::NotInitialized`].
pub struct PreferenceStore {
    location: StoreLocation,
    conn: Arc<Mutex<Option<Connection>>>,
}

impl PreferenceStore {
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            conn: Arc::new(Mutex::new(None)),
        }
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    pub fn is_initialized(&self) -> bool {
        self.conn.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }

    /// Open (creating if absent) the container and bring its schema up to
    /// [`schemas::PREFERENCES_SCHEMA_VERSION`].
    pub async fn init(&self) -> Result<(), StoreError> {
        let location = self.location.clone();
        let slot = Arc::clone(&self.conn);
        run_blocking("init", move || {
            let mut guard = slot.lock().map_err(|_| poisoned())?;
            // Re-init keeps the held connection; reopening `Memory` would drop its data.
            // A fresh connection is only kept once its schema is current.
            let applied = match guard.as_mut() {
                Some(conn) => {
                    migration::check_and_migrate(conn, schemas::PREFERENCES_SCHEMA_VERSION)?
                }
                None => {
                    let mut conn = db::db_connect(&location)?;
                    let applied = migration::check_and_migrate(
                        &mut conn,
                        schemas::PREFERENCES_SCHEMA_VERSION,
                    )?;
                    *guard = Some(conn);
                    applied
                }
            };
            if applied > 0 {
                info!(
                    "preference store at {} set up at schema v{} ({} migration(s))",
                    location,
                    schemas::PREFERENCES_SCHEMA_VERSION,
                    applied
                );
            } else {
                debug!("preference store at {} already current", location);
            }
            Ok(())
        })
        .await
    }

    /// Upsert `{key, value, timestamp: now}`. Last write wins.
    pub async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let key = key.to_string();
        let encoded = serde_json::to_string(&value)?;
        self.with_conn("set", move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                schemas::UPSERT_PREFERENCE,
                params![key, encoded, time::now_millis()],
            )?;
            tx.commit()?;
            debug!("set preference {}", key);
            Ok(())
        })
        .await
    }

    /// Stored value for `key`, or `None` if never written, removed, or cleared.
    pub async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.get_record(key).await?.map(|record| record.value))
    }

    pub async fn get_record(&self, key: &str) -> Result<Option<PreferenceRecord>, StoreError> {
        let key = key.to_string();
        self.with_conn("get", move |conn| {
            let tx = conn.transaction()?;
            let row: Option<(String, i64)> = tx
                .query_row(schemas::SELECT_PREFERENCE, params![key], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })
                .optional()?;
            tx.commit()?;
            row.map(|(raw, timestamp)| -> Result<PreferenceRecord, StoreError> {
                Ok(PreferenceRecord {
                    key,
                    value: serde_json::from_str(&raw)?,
                    timestamp,
                })
            })
            .transpose()
        })
        .await
    }

    /// Every stored record reduced to key -> value.
    pub async fn get_all(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        self.with_conn("get_all", |conn| {
            let tx = conn.transaction()?;
            let rows = {
                let mut stmt = tx.prepare(schemas::SELECT_ALL_PREFERENCES)?;
                stmt.query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?
            };
            tx.commit()?;

            let mut out = BTreeMap::new();
            for (key, raw) in rows {
                out.insert(key, serde_json::from_str(&raw)?);
            }
            Ok(out)
        })
        .await
    }

    /// Delete one record. Returns whether a record existed.
    pub async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let key = key.to_string();
        self.with_conn("remove", move |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(schemas::DELETE_PREFERENCE, params![key])?;
            tx.commit()?;
            Ok(changed > 0)
        })
        .await
    }

    /// Remove every record. The store stays open.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.with_conn("clear", |conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute(schemas::CLEAR_PREFERENCES, [])?;
            tx.commit()?;
            debug!("cleared {} preference(s)", removed);
            Ok(())
        })
        .await
    }

    pub async fn schema_version(&self) -> Result<u32, StoreError> {
        self.with_conn("schema_version", |conn| migration::stored_version(conn))
            .await
    }

    async fn with_conn<F, R>(&self, op: &'static str, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<R, StoreError> + Send + 'static,
        R: Send + 'static,
    {
        let slot = Arc::clone(&self.conn);
        run_blocking(op, move || {
            let mut guard = slot.lock().map_err(|_| poisoned())?;
            let conn = guard.as_mut().ok_or(StoreError::NotInitialized)?;
            f(conn)
        })
        .await
    }
}

#[async_trait]
impl PreferenceBackend for PreferenceStore {
    async fn set_preference(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.set(key, value).await
    }

    async fn get_preference(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.get(key).await
    }

    async fn get_all_preferences(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        self.get_all().await
    }

    async fn clear_preferences(&self) -> Result<(), StoreError> {
        self.clear().await
    }
}

async fn run_blocking<F, R>(op: &'static str, f: F) -> Result<R, StoreError>
where
    F: FnOnce() -> Result<R, StoreError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Backend(format!("{} task failed: {}", op, e)))?
}

fn poisoned() -> StoreError {
    StoreError::Backend("preference connection lock poisoned".to_string())
}
