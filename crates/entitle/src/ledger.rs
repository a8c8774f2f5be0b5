//! The Ledger: unified API for the Entitle system.
//!
//! The Ledger brings together storage, settings and access evaluation into a
//! single interface for command layers to call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use entitle_core::{
    check_give_trail, check_trial_request, evaluate_access, AccessResult, Clock, CoreError,
    EntitlementRecord, GrantDuration, GrantType, PrincipalId, SettingsSnapshot, SystemClock,
    TimeStatus, TrialRejection,
};
use entitle_store::{LedgerStore, UpsertResult};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::LedgerConfig;
use crate::error::Result;
use crate::settings::GlobalSettings;

/// The main Ledger struct.
///
/// Provides a unified API for:
/// - Evaluating access for a principal
/// - Administrative grants and revocations
/// - Self-service trial requests
/// - Listing and summarizing records
/// - Reading and writing global settings
pub struct Ledger<S: LedgerStore, C: Clock = SystemClock> {
    /// The storage backend.
    store: Arc<S>,
    /// Typed settings over the same backend.
    settings: GlobalSettings<S>,
    /// Source of "now".
    clock: C,
    /// Configuration.
    config: LedgerConfig,
    /// Held across every record mutation, so a read-then-write (trail
    /// grants, trial requests) cannot interleave with another write. Only
    /// covers writers going through this ledger.
    writes: Mutex<()>,
}

impl<S: LedgerStore> Ledger<S> {
    /// Create a ledger reading wall-clock time.
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self::with_clock(store, SystemClock, config)
    }
}

impl<S: LedgerStore, C: Clock> Ledger<S, C> {
    /// Create a ledger with an explicit clock.
    pub fn with_clock(store: S, clock: C, config: LedgerConfig) -> Self {
        let store = Arc::new(store);
        Self {
            settings: GlobalSettings::new(Arc::clone(&store)),
            store,
            clock,
            config,
            writes: Mutex::new(()),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the settings handle.
    pub fn settings(&self) -> &GlobalSettings<S> {
        &self.settings
    }

    /// Get the configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The current instant according to the ledger's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Does `principal` have access right now, and as what?
    pub async fn evaluate(&self, principal: &PrincipalId) -> Result<AccessResult> {
        self.evaluate_at(principal, self.now()).await
    }

    /// Evaluate access at a given instant.
    ///
    /// The public-trail flag is read first; when it is on, the principal's
    /// record is not consulted at all.
    pub async fn evaluate_at(
        &self,
        principal: &PrincipalId,
        now: DateTime<Utc>,
    ) -> Result<AccessResult> {
        let public_trail_enabled = self.settings.public_trail_enabled().await?;
        if public_trail_enabled {
            return Ok(AccessResult::PublicTrail);
        }

        let record = self.store.get(principal).await?;
        let settings = SettingsSnapshot {
            public_trail_enabled,
            ..SettingsSnapshot::default()
        };
        let result = evaluate_access(record.as_ref(), &settings, now);
        debug!(
            principal = %principal,
            has_access = result.has_access(),
            grant_type = ?result.grant_type(),
            "evaluated access"
        );
        Ok(result)
    }

    /// Read a principal's raw record.
    pub async fn record(&self, principal: &PrincipalId) -> Result<Option<EntitlementRecord>> {
        Ok(self.store.get(principal).await?)
    }

    /// Every record with its status, ordered by principal.
    pub async fn entries(&self) -> Result<Vec<LedgerEntry>> {
        let now = self.now();
        let records = self.store.list_all().await?;
        Ok(records
            .into_iter()
            .map(|(principal, record)| LedgerEntry {
                status: record.status_at(now),
                principal,
                record,
            })
            .collect())
    }

    /// Totals for the admin summary.
    pub async fn stats(&self) -> Result<LedgerStats> {
        let now = self.now();
        let records = self.store.list_all().await?;
        let active = records.values().filter(|r| r.is_active_at(now)).count();
        Ok(LedgerStats {
            total: records.len(),
            active,
            public_trail_enabled: self.settings.public_trail_enabled().await?,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Administrative Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant premium access for the duration in `token`, replacing any
    /// existing record.
    ///
    /// A zero-length duration is rejected as a usage error.
    pub async fn grant(
        &self,
        principal: &PrincipalId,
        token: &str,
        issuer: Option<&str>,
    ) -> Result<EntitlementRecord> {
        let duration = GrantDuration::parse(token)?;
        if duration.is_zero() {
            return Err(CoreError::EmptyDuration(token.to_string()).into());
        }
        let _writes = self.writes.lock().await;
        let (record, upsert) = self
            .write_grant(principal, GrantType::Premium, duration, issuer)
            .await?;
        let replaced = upsert == UpsertResult::Replaced;
        info!(principal = %principal, duration = %duration, replaced, "granted premium access");
        Ok(record)
    }

    /// Remove a principal's record. Returns whether one existed.
    pub async fn revoke(&self, principal: &PrincipalId) -> Result<bool> {
        let _writes = self.writes.lock().await;
        let removed = self.store.delete(principal).await?;
        info!(principal = %principal, removed, "revoked access");
        Ok(removed)
    }

    /// Grant trail access, permanently unless `token` gives a duration.
    ///
    /// An existing `premium` or `trail` record is left untouched and reported
    /// back; a `trial` record is replaced. The check and the write happen
    /// under the ledger's write lock, so a concurrent `grant` is never
    /// overwritten.
    pub async fn give_trail(
        &self,
        principal: &PrincipalId,
        token: Option<&str>,
        issuer: Option<&str>,
    ) -> Result<GiveTrailOutcome> {
        let duration = match token {
            Some(token) => GrantDuration::parse(token)?,
            None => self.config.permanent_grant(),
        };

        let _writes = self.writes.lock().await;
        let existing = self.store.get(principal).await?;
        if let Err(held) = check_give_trail(existing.as_ref()) {
            info!(principal = %principal, held = %held, "trail grant skipped");
            return Ok(GiveTrailOutcome::AlreadyHeld { grant_type: held });
        }

        let (record, _) = self
            .write_grant(principal, GrantType::Trail, duration, issuer)
            .await?;
        info!(principal = %principal, duration = %duration, "granted trail access");
        Ok(GiveTrailOutcome::Granted {
            record,
            replaced: existing.map(|r| r.grant_type),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Self-Service Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Request a trial for `principal`.
    ///
    /// Refused while trial requests are off, and refused for any principal
    /// that already has a record, even an expired one.
    pub async fn request_trial(&self, principal: &PrincipalId) -> Result<TrialOutcome> {
        let settings = self.settings.snapshot().await?;
        let _writes = self.writes.lock().await;
        let existing = self.store.get(principal).await?;

        if let Err(rejection) = check_trial_request(existing.as_ref(), &settings) {
            info!(principal = %principal, rejection = ?rejection, "trial request refused");
            return Ok(TrialOutcome::Rejected(rejection));
        }

        let duration = GrantDuration::days(i64::from(settings.trial_duration_days));
        let issuer = self.config.trial_issuer.clone();
        let (record, _) = self
            .write_grant(principal, GrantType::Trial, duration, Some(&issuer))
            .await?;
        info!(principal = %principal, days = settings.trial_duration_days, "trial granted");
        Ok(TrialOutcome::Granted(record))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────────

    async fn write_grant(
        &self,
        principal: &PrincipalId,
        grant_type: GrantType,
        duration: GrantDuration,
        issuer: Option<&str>,
    ) -> Result<(EntitlementRecord, UpsertResult)> {
        let now = self.now();
        let expires_at = duration.expiry_after(now)?;
        let mut record = EntitlementRecord::new(grant_type, now, expires_at);
        if let Some(issuer) = issuer {
            record = record.with_issuer(issuer);
        }
        let upsert = self.store.put(principal, &record).await?;
        Ok((record, upsert))
    }
}

/// One row of the admin listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub principal: PrincipalId,
    pub record: EntitlementRecord,
    pub status: TimeStatus,
}

/// Totals for the admin summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerStats {
    /// Records in the store, expired ones included.
    pub total: usize,
    /// Records that are active now.
    pub active: usize,
    /// Whether the public trail is on.
    pub public_trail_enabled: bool,
}

/// Result of an administrative trail grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GiveTrailOutcome {
    /// The trail record was written.
    Granted {
        record: EntitlementRecord,
        /// Grant type of the record that was overwritten, if any.
        replaced: Option<GrantType>,
    },
    /// An equal or stronger grant exists; nothing was written.
    AlreadyHeld { grant_type: GrantType },
}

/// Result of a self-service trial request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialOutcome {
    /// A trial record was created.
    Granted(EntitlementRecord),
    /// The request was refused; nothing was written.
    Rejected(TrialRejection),
}
