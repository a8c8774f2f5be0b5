//! Access evaluation.
//!
//! Precedence, highest first:
//!
//! 1. Public trail enabled: everyone has access.
//! 2. No record: not found.
//! 3. Record with a malformed expiry: invalid.
//! 4. Record expired: expired.
//! 5. Otherwise: granted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grant::GrantType;
use crate::record::EntitlementRecord;
use crate::settings::SettingsSnapshot;
use crate::status::{Remaining, TimeStatus};
use crate::timestamp::Timestamp;

/// Outcome of an access check for one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessResult {
    /// The global override is on.
    PublicTrail,

    /// An unexpired record exists.
    Granted {
        grant_type: GrantType,
        expires_at: DateTime<Utc>,
        remaining: Remaining,
    },

    /// No record exists for the principal.
    NotFound,

    /// A record exists but has expired.
    Expired {
        grant_type: GrantType,
        expires_at: Timestamp,
    },

    /// A record exists but its stored expiry does not parse.
    Invalid { grant_type: GrantType },
}

impl AccessResult {
    /// Collapse to a yes/no answer.
    pub fn has_access(&self) -> bool {
        matches!(self, AccessResult::PublicTrail | AccessResult::Granted { .. })
    }

    /// Grant type of the underlying record, if one was consulted.
    pub fn grant_type(&self) -> Option<GrantType> {
        match self {
            AccessResult::Granted { grant_type, .. }
            | AccessResult::Expired { grant_type, .. }
            | AccessResult::Invalid { grant_type } => Some(*grant_type),
            AccessResult::PublicTrail | AccessResult::NotFound => None,
        }
    }
}

/// Decide access from the principal's record (if any), the settings and `now`.
///
/// Pure: the same inputs always give the same result.
pub fn evaluate_access(
    record: Option<&EntitlementRecord>,
    settings: &SettingsSnapshot,
    now: DateTime<Utc>,
) -> AccessResult {
    if settings.public_trail_enabled {
        return AccessResult::PublicTrail;
    }

    let Some(record) = record else {
        return AccessResult::NotFound;
    };

    match (record.status_at(now), &record.expires_at) {
        (TimeStatus::Active(remaining), Timestamp::At(expires_at)) => AccessResult::Granted {
            grant_type: record.grant_type,
            expires_at: *expires_at,
            remaining,
        },
        (TimeStatus::Expired, expires_at) => AccessResult::Expired {
            grant_type: record.grant_type,
            expires_at: expires_at.clone(),
        },
        _ => AccessResult::Invalid {
            grant_type: record.grant_type,
        },
    }
}
