//! Entitlement records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grant::GrantType;
use crate::status::TimeStatus;
use crate::timestamp::Timestamp;

/// One time-bounded grant for one principal.
///
/// Writing a record for a principal replaces the previous record entirely.
/// `created_at <= expires_at` is expected but not enforced; an expiry in the
/// past simply evaluates as expired. Expired records are kept until revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementRecord {
    /// When access ends.
    #[serde(rename = "expiry")]
    pub expires_at: Timestamp,

    /// When the record was written. Never changes afterwards.
    #[serde(rename = "created")]
    pub created_at: Timestamp,

    /// Category of the grant.
    #[serde(rename = "type")]
    pub grant_type: GrantType,

    /// Who or what created the record. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

impl EntitlementRecord {
    /// Create a record from well-formed instants.
    pub fn new(grant_type: GrantType, created_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            expires_at: Timestamp::at(expires_at),
            created_at: Timestamp::at(created_at),
            grant_type,
            issuer: None,
        }
    }

    /// Attach an issuer attribution.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Expiry status at `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> TimeStatus {
        TimeStatus::evaluate_stored(&self.expires_at, now)
    }

    /// Whether the record grants access at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now).is_active()
    }
}
