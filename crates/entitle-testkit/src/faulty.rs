//! A store wrapper that can be told to fail or to answer reads late.
//!
//! Used to check that a failed persistence call surfaces as a transient error
//! and leaves no partial effect behind, and that a read-then-write in the
//! ledger is not interleaved with another write.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use entitle_core::{EntitlementRecord, PrincipalId, SettingKey, SettingValue};
use entitle_store::{EntitlementStore, MemoryStore, Result, SettingsStore, StoreError, UpsertResult};

/// Wraps a store. While failing, every call returns
/// [`StoreError::Unavailable`] without touching the inner store.
///
/// With a read delay set, `get` reads the inner store first and then waits,
/// so the caller acts on a value that may be stale by the time it arrives.
pub struct FaultyStore<S = MemoryStore> {
    inner: S,
    failing: AtomicBool,
    read_delay_ms: AtomicU64,
}

impl<S> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
            read_delay_ms: AtomicU64::new(0),
        }
    }

    /// Delay every `get` by `delay` after the inner read.
    pub fn set_read_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.read_delay_ms.store(millis, Ordering::SeqCst);
    }

    /// Start or stop failing.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for FaultyStore<MemoryStore> {
    fn default() -> Self {
        Self::new(MemoryStore::new())
    }
}

#[async_trait]
impl<S: EntitlementStore> EntitlementStore for FaultyStore<S> {
    async fn put(&self, principal: &PrincipalId, record: &EntitlementRecord) -> Result<UpsertResult> {
        self.check()?;
        self.inner.put(principal, record).await
    }

    async fn get(&self, principal: &PrincipalId) -> Result<Option<EntitlementRecord>> {
        self.check()?;
        let record = self.inner.get(principal).await;
        let delay = self.read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        record
    }

    async fn delete(&self, principal: &PrincipalId) -> Result<bool> {
        self.check()?;
        self.inner.delete(principal).await
    }

    async fn list_all(&self) -> Result<BTreeMap<PrincipalId, EntitlementRecord>> {
        self.check()?;
        self.inner.list_all().await
    }
}

#[async_trait]
impl<S: SettingsStore> SettingsStore for FaultyStore<S> {
    async fn get_setting(&self, key: SettingKey) -> Result<Option<SettingValue>> {
        self.check()?;
        self.inner.get_setting(key).await
    }

    async fn put_setting(&self, key: SettingKey, value: &SettingValue) -> Result<()> {
        self.check()?;
        self.inner.put_setting(key, value).await
    }
}
