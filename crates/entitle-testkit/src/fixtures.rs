//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use chrono::{DateTime, Duration, Utc};
use entitle::{Ledger, LedgerConfig};
use entitle_core::{Clock, EntitlementRecord, GrantType, PrincipalId};
use entitle_store::{EntitlementStore, LedgerStore, MemoryStore, UpsertResult};

use crate::clock::ManualClock;

/// A ledger over a test store, driven by a [`ManualClock`].
pub struct LedgerFixture<S: LedgerStore = MemoryStore> {
    pub ledger: Ledger<S, ManualClock>,
    pub clock: ManualClock,
}

impl LedgerFixture<MemoryStore> {
    /// Fresh in-memory ledger at the default epoch.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for LedgerFixture<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: LedgerStore> LedgerFixture<S> {
    /// Wrap an existing store.
    pub fn with_store(store: S) -> Self {
        let clock = ManualClock::epoch();
        Self {
            ledger: Ledger::with_clock(store, clock.clone(), LedgerConfig::default()),
            clock,
        }
    }

    /// Current fixture time.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Move the fixture clock.
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// Write a record directly to the store, bypassing ledger policy.
    ///
    /// `expires_in` is relative to the fixture clock and may be negative.
    pub async fn seed(
        &self,
        principal: &PrincipalId,
        grant_type: GrantType,
        expires_in: Duration,
    ) -> EntitlementRecord {
        let now = self.now();
        let record = EntitlementRecord::new(grant_type, now, now + expires_in);
        let result = self.ledger.store().put(principal, &record).await;
        assert!(
            matches!(result, Ok(UpsertResult::Inserted | UpsertResult::Replaced)),
            "seeding {principal} failed: {result:?}"
        );
        record
    }
}

/// Build a principal id, panicking on the empty string.
pub fn principal(id: &str) -> PrincipalId {
    match PrincipalId::new(id) {
        Ok(principal) => principal,
        Err(e) => panic!("bad test principal {id:?}: {e}"),
    }
}

/// `count` distinct principals: `user-0`, `user-1`, ...
pub fn principals(count: usize) -> Vec<PrincipalId> {
    (0..count).map(|i| principal(&format!("user-{i}"))).collect()
}
