//! Store traits: the abstract interface for ledger persistence.
//!
//! These traits keep the ledger storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use std::collections::BTreeMap;

use async_trait::async_trait;
use entitle_core::{EntitlementRecord, PrincipalId, SettingKey, SettingValue};

use crate::error::Result;

/// Result of writing a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertResult {
    /// No record existed for the principal.
    Inserted,
    /// An existing record was replaced in full.
    Replaced,
}

/// Persistent mapping from principal to entitlement record.
///
/// # Consistency
///
/// - Writes to one principal are linearizable: the last write to complete
///   wins, and a record is never a mix of two writes.
/// - Every mutating call is durable before it returns.
/// - A read observes every write that completed before it started.
/// - Operations on different principals are independent.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Write a record, replacing any existing record for the principal.
    async fn put(&self, principal: &PrincipalId, record: &EntitlementRecord) -> Result<UpsertResult>;

    /// Read a principal's record. Absence is `Ok(None)`, not an error.
    async fn get(&self, principal: &PrincipalId) -> Result<Option<EntitlementRecord>>;

    /// Delete a principal's record. Returns whether one existed.
    async fn delete(&self, principal: &PrincipalId) -> Result<bool>;

    /// Snapshot of every record, ordered by principal.
    async fn list_all(&self) -> Result<BTreeMap<PrincipalId, EntitlementRecord>>;
}

/// Persistent process-wide settings cells.
///
/// Cells are independent; there is no multi-cell transaction.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read a cell. `None` means the cell was never written.
    async fn get_setting(&self, key: SettingKey) -> Result<Option<SettingValue>>;

    /// Write a cell.
    async fn put_setting(&self, key: SettingKey, value: &SettingValue) -> Result<()>;
}

/// A backend that stores both records and settings.
pub trait LedgerStore: EntitlementStore + SettingsStore {}

impl<S: EntitlementStore + SettingsStore + ?Sized> LedgerStore for S {}

#[async_trait]
impl<S: EntitlementStore + ?Sized> EntitlementStore for std::sync::Arc<S> {
    async fn put(&self, principal: &PrincipalId, record: &EntitlementRecord) -> Result<UpsertResult> {
        (**self).put(principal, record).await
    }

    async fn get(&self, principal: &PrincipalId) -> Result<Option<EntitlementRecord>> {
        (**self).get(principal).await
    }

    async fn delete(&self, principal: &PrincipalId) -> Result<bool> {
        (**self).delete(principal).await
    }

    async fn list_all(&self) -> Result<BTreeMap<PrincipalId, EntitlementRecord>> {
        (**self).list_all().await
    }
}

#[async_trait]
impl<S: SettingsStore + ?Sized> SettingsStore for std::sync::Arc<S> {
    async fn get_setting(&self, key: SettingKey) -> Result<Option<SettingValue>> {
        (**self).get_setting(key).await
    }

    async fn put_setting(&self, key: SettingKey, value: &SettingValue) -> Result<()> {
        (**self).put_setting(key, value).await
    }
}
