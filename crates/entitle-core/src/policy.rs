//! Guards for the self-service and administrative grant policies.

use serde::{Deserialize, Serialize};

use crate::grant::GrantType;
use crate::record::EntitlementRecord;
use crate::settings::SettingsSnapshot;

/// Why a self-service trial request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialRejection {
    /// Trial requests are switched off.
    Disabled,
    /// The principal already has a record, active or expired.
    AlreadyRegistered { grant_type: GrantType },
}

/// Check whether a principal may request a trial.
///
/// Existence of any record blocks the request, even an expired one: each
/// principal gets at most one trial.
pub fn check_trial_request(
    existing: Option<&EntitlementRecord>,
    settings: &SettingsSnapshot,
) -> Result<(), TrialRejection> {
    if !settings.trial_request_enabled {
        return Err(TrialRejection::Disabled);
    }
    if let Some(record) = existing {
        return Err(TrialRejection::AlreadyRegistered {
            grant_type: record.grant_type,
        });
    }
    Ok(())
}

/// Check whether an administrative trail grant may overwrite `existing`.
///
/// Returns the blocking grant type when the existing record is `premium` or
/// `trail`.
pub fn check_give_trail(existing: Option<&EntitlementRecord>) -> Result<(), GrantType> {
    match existing {
        Some(record) if !record.grant_type.yields_to_trail() => Err(record.grant_type),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn record(grant_type: GrantType, expired: bool) -> EntitlementRecord {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let delta = if expired { -Duration::days(1) } else { Duration::days(1) };
        EntitlementRecord::new(grant_type, now, now + delta)
    }

    fn trials_on() -> SettingsSnapshot {
        SettingsSnapshot {
            trial_request_enabled: true,
            ..SettingsSnapshot::default()
        }
    }

    #[test]
    fn test_trial_disabled_by_default() {
        assert_eq!(
            check_trial_request(None, &SettingsSnapshot::default()),
            Err(TrialRejection::Disabled)
        );
    }

    #[test]
    fn test_trial_blocked_by_any_record() {
        for expired in [false, true] {
            let existing = record(GrantType::Trial, expired);
            assert_eq!(
                check_trial_request(Some(&existing), &trials_on()),
                Err(TrialRejection::AlreadyRegistered {
                    grant_type: GrantType::Trial
                })
            );
        }
        assert_eq!(check_trial_request(None, &trials_on()), Ok(()));
    }

    #[test]
    fn test_give_trail_guard() {
        assert_eq!(check_give_trail(None), Ok(()));
        assert_eq!(check_give_trail(Some(&record(GrantType::Trial, false))), Ok(()));
        assert_eq!(
            check_give_trail(Some(&record(GrantType::Premium, true))),
            Err(GrantType::Premium)
        );
        assert_eq!(
            check_give_trail(Some(&record(GrantType::Trail, false))),
            Err(GrantType::Trail)
        );
    }
}
