//! SQLite implementation of the store traits.
//!
//! This is the primary storage backend for the Entitle ledger. It uses
//! rusqlite with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use entitle_core::{EntitlementRecord, GrantType, PrincipalId, SettingKey, SettingValue, Timestamp};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::{EntitlementStore, SettingsStore, UpsertResult};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime. Holding the mutex for the whole
/// statement gives per-principal linearizability.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        // Writes must be on disk before the call returns.
        conn.pragma_update(None, "synchronous", "FULL")?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection.
    async fn with_conn<F, T>(&self, op: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("mutex poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("{}: spawn_blocking failed: {}", op, e)))?
    }
}

// Helper to convert a row to (principal, record)
fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<(PrincipalId, EntitlementRecord)> {
    let principal: String = row.get("principal")?;
    let expires_at: String = row.get("expires_at")?;
    let created_at: String = row.get("created_at")?;
    let grant_type: String = row.get("grant_type")?;
    let issuer: Option<String> = row.get("issuer")?;

    let principal = PrincipalId::new(principal)
        .map_err(|e| StoreError::InvalidData(format!("principal: {}", e)))?;
    let grant_type = grant_type
        .parse::<GrantType>()
        .map_err(|e| StoreError::InvalidData(format!("principal {}: {}", principal, e)))?;

    let record = EntitlementRecord {
        expires_at: Timestamp::parse(&expires_at),
        created_at: Timestamp::parse(&created_at),
        grant_type,
        issuer,
    };

    Ok((principal, record))
}

#[async_trait]
impl EntitlementStore for SqliteStore {
    async fn put(&self, principal: &PrincipalId, record: &EntitlementRecord) -> Result<UpsertResult> {
        let principal = principal.clone();
        let record = record.clone();

        self.with_conn("put", move |conn| {
            let tx = conn.transaction()?;

            let existed = tx
                .query_row(
                    "SELECT 1 FROM entitlements WHERE principal = ?1",
                    params![principal.as_str()],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();

            tx.execute(
                "INSERT INTO entitlements (
                    principal, expires_at, created_at, grant_type, issuer, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(principal) DO UPDATE SET
                    expires_at = excluded.expires_at,
                    created_at = excluded.created_at,
                    grant_type = excluded.grant_type,
                    issuer = excluded.issuer,
                    updated_at = excluded.updated_at",
                params![
                    principal.as_str(),
                    record.expires_at.to_stored(),
                    record.created_at.to_stored(),
                    record.grant_type.as_str(),
                    record.issuer,
                    now_millis(),
                ],
            )?;

            tx.commit()?;
            debug!(principal = %principal, grant_type = %record.grant_type, existed, "stored entitlement");

            Ok(if existed {
                UpsertResult::Replaced
            } else {
                UpsertResult::Inserted
            })
        })
        .await
    }

    async fn get(&self, principal: &PrincipalId) -> Result<Option<EntitlementRecord>> {
        let principal = principal.clone();

        self.with_conn("get", move |conn| {
            let mut stmt = conn.prepare(
                "SELECT principal, expires_at, created_at, grant_type, issuer
                 FROM entitlements WHERE principal = ?1",
            )?;
            let mut rows = stmt.query(params![principal.as_str()])?;

            let record = match rows.next()? {
                Some(row) => Some(row_to_entry(row)?.1),
                None => None,
            };
            Ok(record)
        })
        .await
    }

    async fn delete(&self, principal: &PrincipalId) -> Result<bool> {
        let principal = principal.clone();

        self.with_conn("delete", move |conn| {
            let removed = conn.execute(
                "DELETE FROM entitlements WHERE principal = ?1",
                params![principal.as_str()],
            )?;
            debug!(principal = %principal, removed, "deleted entitlement");
            Ok(removed > 0)
        })
        .await
    }

    async fn list_all(&self) -> Result<BTreeMap<PrincipalId, EntitlementRecord>> {
        self.with_conn("list_all", move |conn| {
            let mut stmt = conn.prepare(
                "SELECT principal, expires_at, created_at, grant_type, issuer
                 FROM entitlements ORDER BY principal",
            )?;
            let mut rows = stmt.query([])?;

            let mut entries = BTreeMap::new();
            while let Some(row) = rows.next()? {
                let (principal, record) = row_to_entry(row)?;
                entries.insert(principal, record);
            }
            Ok(entries)
        })
        .await
    }
}

#[async_trait]
impl SettingsStore for SqliteStore {
    async fn get_setting(&self, key: SettingKey) -> Result<Option<SettingValue>> {
        self.with_conn("get_setting", move |conn| {
            let raw: Option<String> = conn
                .query_row(
                    "SELECT value FROM settings WHERE key = ?1",
                    params![key.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            match raw {
                Some(json) => Ok(Some(serde_json::from_str(&json)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn put_setting(&self, key: SettingKey, value: &SettingValue) -> Result<()> {
        let json = serde_json::to_string(value)?;

        self.with_conn("put_setting", move |conn| {
            conn.execute(
                "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at",
                params![key.as_str(), json, now_millis()],
            )?;
            debug!(key = %key, value = %json, "stored setting");
            Ok(())
        })
        .await
    }
}
