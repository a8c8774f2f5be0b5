//! In-memory implementation of the store traits.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use entitle_core::{EntitlementRecord, PrincipalId, SettingKey, SettingValue};

use crate::error::{Result, StoreError};
use crate::traits::{EntitlementStore, SettingsStore, UpsertResult};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Records indexed by principal.
    records: BTreeMap<PrincipalId, EntitlementRecord>,

    /// Settings cells. A missing key was never written.
    settings: HashMap<SettingKey, SettingValue>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntitlementStore for MemoryStore {
    async fn put(&self, principal: &PrincipalId, record: &EntitlementRecord) -> Result<UpsertResult> {
        let mut inner = self.write()?;
        match inner.records.insert(principal.clone(), record.clone()) {
            Some(_) => Ok(UpsertResult::Replaced),
            None => Ok(UpsertResult::Inserted),
        }
    }

    async fn get(&self, principal: &PrincipalId) -> Result<Option<EntitlementRecord>> {
        let inner = self.read()?;
        Ok(inner.records.get(principal).cloned())
    }

    async fn delete(&self, principal: &PrincipalId) -> Result<bool> {
        let mut inner = self.write()?;
        Ok(inner.records.remove(principal).is_some())
    }

    async fn list_all(&self) -> Result<BTreeMap<PrincipalId, EntitlementRecord>> {
        let inner = self.read()?;
        Ok(inner.records.clone())
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get_setting(&self, key: SettingKey) -> Result<Option<SettingValue>> {
        let inner = self.read()?;
        Ok(inner.settings.get(&key).cloned())
    }

    async fn put_setting(&self, key: SettingKey, value: &SettingValue) -> Result<()> {
        let mut inner = self.write()?;
        inner.settings.insert(key, value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use entitle_core::GrantType;

    fn principal(id: &str) -> PrincipalId {
        PrincipalId::new(id).unwrap()
    }

    fn make_record(grant_type: GrantType, days: i64) -> EntitlementRecord {
        let created = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        EntitlementRecord::new(grant_type, created, created + Duration::days(days))
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        let id = principal("u1");
        let record = make_record(GrantType::Premium, 30);

        // Insert
        let result = store.put(&id, &record).await.unwrap();
        assert_eq!(result, UpsertResult::Inserted);

        // Get
        let retrieved = store.get(&id).await.unwrap().unwrap();
        assert_eq!(retrieved, record);

        // Delete
        assert!(store.delete(&id).await.unwrap());
        assert!(store.get(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_put_replaces() {
        let store = MemoryStore::new();
        let id = principal("u1");

        store.put(&id, &make_record(GrantType::Trial, 3)).await.unwrap();
        let replacement = make_record(GrantType::Premium, 90);
        let result = store.put(&id, &replacement).await.unwrap();

        assert_eq!(result, UpsertResult::Replaced);
        assert_eq!(store.get(&id).await.unwrap().unwrap(), replacement);
    }

    #[tokio::test]
    async fn test_memory_store_delete_absent() {
        let store = MemoryStore::new();
        assert!(!store.delete(&principal("ghost")).await.unwrap());
        assert!(!store.delete(&principal("ghost")).await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_store_settings_absent_vs_false() {
        let store = MemoryStore::new();
        let key = SettingKey::PublicTrailEnabled;

        assert_eq!(store.get_setting(key).await.unwrap(), None);

        store.put_setting(key, &SettingValue::Bool(false)).await.unwrap();
        assert_eq!(
            store.get_setting(key).await.unwrap(),
            Some(SettingValue::Bool(false))
        );
    }

    proptest::proptest! {
        #[test]
        fn test_list_all_matches_last_writes(
            writes in proptest::collection::vec(("[a-zA-Z0-9]{1,6}", 1i64..400), 0..40)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let store = MemoryStore::new();
                let mut expected = BTreeMap::new();
                for (id, days) in &writes {
                    let record = make_record(GrantType::Premium, *days);
                    store.put(&principal(id), &record).await.unwrap();
                    expected.insert(principal(id), record);
                }
                proptest::prop_assert_eq!(store.list_all().await.unwrap(), expected);
                Ok(())
            })?;
        }
    }
}
