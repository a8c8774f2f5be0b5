//! Ledger state survives a restart of the process owning the SQLite file.

use chrono::Duration;
use entitle::core::Clock;
use entitle::store::{EntitlementStore, SqliteStore};
use entitle::{AccessResult, GrantType, Ledger, LedgerConfig, LedgerError};
use entitle_testkit::{principal, ManualClock};
use proptest::prelude::*;
use tempfile::TempDir;

fn open(dir: &TempDir, clock: &ManualClock) -> Ledger<SqliteStore, ManualClock> {
    let store = SqliteStore::open(dir.path().join("entitle.db")).unwrap();
    Ledger::with_clock(store, clock.clone(), LedgerConfig::default())
}

#[tokio::test]
async fn records_and_settings_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::epoch();
    let id = principal("5316048641");

    {
        let ledger = open(&dir, &clock);
        ledger.grant(&id, "30d", Some("admin")).await.unwrap();
        ledger.settings().set_trial_duration_days(10).await.unwrap();
        ledger.settings().set_trial_request_enabled(true).await.unwrap();
    }

    let ledger = open(&dir, &clock);
    let record = ledger.record(&id).await.unwrap().unwrap();
    assert_eq!(record.grant_type, GrantType::Premium);
    assert_eq!(record.issuer.as_deref(), Some("admin"));
    assert_eq!(
        record.expires_at.instant(),
        Some(clock.now() + Duration::days(30))
    );

    let snapshot = ledger.settings().snapshot().await.unwrap();
    assert!(snapshot.trial_request_enabled);
    assert!(!snapshot.public_trail_enabled);
    assert_eq!(snapshot.trial_duration_days, 10);
}

#[tokio::test]
async fn revoke_is_durable() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::epoch();
    let id = principal("gone");

    {
        let ledger = open(&dir, &clock);
        ledger.give_trail(&id, None, None).await.unwrap();
        assert!(ledger.revoke(&id).await.unwrap());
    }

    let ledger = open(&dir, &clock);
    assert_eq!(ledger.evaluate(&id).await.unwrap(), AccessResult::NotFound);
}

#[tokio::test]
async fn repeated_puts_equal_one_put() {
    let store = SqliteStore::open_memory().unwrap();
    let clock = ManualClock::epoch();
    let ledger = Ledger::with_clock(store, clock, LedgerConfig::default());
    let id = principal("same");

    let first = ledger.grant(&id, "1d", None).await.unwrap();
    ledger.store().put(&id, &first).await.unwrap();
    ledger.store().put(&id, &first).await.unwrap();

    let all = ledger.store().list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all.get(&id), Some(&first));
}

#[tokio::test]
async fn unknown_grant_type_is_reported_as_corrupt() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::epoch();

    {
        let ledger = open(&dir, &clock);
        ledger.grant(&principal("ok"), "30d", None).await.unwrap();
        ledger.grant(&principal("odd"), "30d", None).await.unwrap();
    }
    {
        let conn = rusqlite::Connection::open(dir.path().join("entitle.db")).unwrap();
        conn.execute(
            "UPDATE entitlements SET grant_type = 'vip' WHERE principal = 'odd'",
            [],
        )
        .unwrap();
    }

    let ledger = open(&dir, &clock);
    let err = ledger.stats().await.unwrap_err();
    assert!(matches!(err, LedgerError::CorruptData(_)), "{err}");
    assert!(!err.is_transient());
    assert!(!ledger.entries().await.unwrap_err().is_transient());

    // Rows that parse are still served.
    assert!(ledger.evaluate(&principal("ok")).await.unwrap().has_access());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn put_get_delete_round_trip(
        params in any::<entitle_testkit::RecordParams>(),
        id in entitle_testkit::generators::principal_id(),
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let store = SqliteStore::open_memory().unwrap();
            let record = entitle_testkit::record_from_params(&params);

            store.put(&id, &record).await.unwrap();
            prop_assert_eq!(store.get(&id).await.unwrap(), Some(record));

            prop_assert!(store.delete(&id).await.unwrap());
            prop_assert_eq!(store.get(&id).await.unwrap(), None);
            prop_assert!(!store.delete(&id).await.unwrap());
            Ok(())
        })?;
    }
}
