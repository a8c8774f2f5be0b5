//! Process-wide settings.
//!
//! Each setting is an independent scalar cell. A cell that was never written
//! is distinct from one explicitly set to `false`: absence resolves to the
//! documented default.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Trial length used when the setting was never configured.
pub const DEFAULT_TRIAL_DURATION_DAYS: u32 = 3;

/// Smallest accepted trial length.
pub const MIN_TRIAL_DURATION_DAYS: u32 = 1;

/// Largest accepted trial length.
pub const MAX_TRIAL_DURATION_DAYS: u32 = 365;

/// Key of a settings cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SettingKey {
    PublicTrailEnabled,
    TrialRequestEnabled,
    TrialDurationDays,
}

impl SettingKey {
    pub const ALL: [SettingKey; 3] = [
        SettingKey::PublicTrailEnabled,
        SettingKey::TrialRequestEnabled,
        SettingKey::TrialDurationDays,
    ];

    /// Storage key. `trail_enabled` is shared with other readers of the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::PublicTrailEnabled => "trail_enabled",
            SettingKey::TrialRequestEnabled => "trial_request_enabled",
            SettingKey::TrialDurationDays => "trial_duration_days",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a settings cell, stored as a JSON scalar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

/// All settings, resolved against their defaults.
///
/// The access evaluator takes this as an explicit input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    /// Grants access to every principal regardless of records.
    pub public_trail_enabled: bool,
    /// Allows principals to request a trial themselves.
    pub trial_request_enabled: bool,
    /// Length of a self-service trial.
    pub trial_duration_days: u32,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            public_trail_enabled: false,
            trial_request_enabled: false,
            trial_duration_days: DEFAULT_TRIAL_DURATION_DAYS,
        }
    }
}

impl SettingsSnapshot {
    /// Overlay one stored cell. Absent cells are simply never applied.
    ///
    /// Returns `false`, leaving the field at its current value, when the
    /// cell holds the wrong type or an out-of-range trial length.
    pub fn apply(&mut self, key: SettingKey, value: &SettingValue) -> bool {
        match key {
            SettingKey::PublicTrailEnabled => value
                .as_bool()
                .map(|enabled| self.public_trail_enabled = enabled)
                .is_some(),
            SettingKey::TrialRequestEnabled => value
                .as_bool()
                .map(|enabled| self.trial_request_enabled = enabled)
                .is_some(),
            SettingKey::TrialDurationDays => value
                .as_integer()
                .and_then(|n| validate_trial_duration_days(n).ok())
                .map(|days| self.trial_duration_days = days)
                .is_some(),
        }
    }
}

/// Check a trial length against `[MIN_TRIAL_DURATION_DAYS, MAX_TRIAL_DURATION_DAYS]`.
pub fn validate_trial_duration_days(days: i64) -> Result<u32, ValidationError> {
    let range = i64::from(MIN_TRIAL_DURATION_DAYS)..=i64::from(MAX_TRIAL_DURATION_DAYS);
    if !range.contains(&days) {
        return Err(ValidationError::TrialDurationOutOfRange {
            min: MIN_TRIAL_DURATION_DAYS,
            max: MAX_TRIAL_DURATION_DAYS,
            got: days,
        });
    }
    Ok(days as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let snapshot = SettingsSnapshot::default();
        assert!(!snapshot.public_trail_enabled);
        assert!(!snapshot.trial_request_enabled);
        assert_eq!(snapshot.trial_duration_days, 3);
    }

    #[test]
    fn test_apply_explicit_values() {
        let mut snapshot = SettingsSnapshot {
            public_trail_enabled: true,
            ..SettingsSnapshot::default()
        };
        assert!(snapshot.apply(SettingKey::PublicTrailEnabled, &SettingValue::Bool(false)));
        assert!(snapshot.apply(SettingKey::TrialRequestEnabled, &SettingValue::Bool(true)));
        assert!(snapshot.apply(SettingKey::TrialDurationDays, &SettingValue::Integer(7)));
        assert!(!snapshot.public_trail_enabled);
        assert!(snapshot.trial_request_enabled);
        assert_eq!(snapshot.trial_duration_days, 7);
    }

    #[test]
    fn test_apply_rejects_wrong_type_and_range() {
        let mut snapshot = SettingsSnapshot::default();
        assert!(!snapshot.apply(SettingKey::PublicTrailEnabled, &SettingValue::Text("yes".into())));
        assert!(!snapshot.apply(SettingKey::TrialRequestEnabled, &SettingValue::Integer(1)));
        assert!(!snapshot.apply(SettingKey::TrialDurationDays, &SettingValue::Integer(900)));
        assert_eq!(snapshot, SettingsSnapshot::default());
    }

    #[test]
    fn test_trial_duration_bounds() {
        assert_eq!(validate_trial_duration_days(1), Ok(1));
        assert_eq!(validate_trial_duration_days(365), Ok(365));
        assert!(validate_trial_duration_days(0).is_err());
        assert_eq!(
            validate_trial_duration_days(400),
            Err(ValidationError::TrialDurationOutOfRange {
                min: 1,
                max: 365,
                got: 400
            })
        );
    }

    #[test]
    fn test_setting_value_json_shape() {
        assert_eq!(serde_json::to_string(&SettingValue::Bool(true)).unwrap(), "true");
        assert_eq!(serde_json::to_string(&SettingValue::Integer(3)).unwrap(), "3");
        assert_eq!(
            serde_json::from_str::<SettingValue>("3").unwrap(),
            SettingValue::Integer(3)
        );
    }
}
