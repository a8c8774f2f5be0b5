//! Ledger configuration.

use entitle_core::{GrantDuration, PERMANENT_GRANT_DAYS};
use serde::{Deserialize, Serialize};

/// Configuration for the Ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Length of a trail grant issued without an explicit duration.
    pub permanent_grant_days: i64,
    /// Issuer recorded on self-service trial records.
    pub trial_issuer: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            permanent_grant_days: PERMANENT_GRANT_DAYS,
            trial_issuer: "self-service".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Duration used for trail grants without an explicit token.
    pub fn permanent_grant(&self) -> GrantDuration {
        GrantDuration::days(self.permanent_grant_days)
    }
}
