//! Typed access to the process-wide settings cells.

use std::sync::Arc;

use entitle_core::{
    settings::validate_trial_duration_days, SettingKey, SettingValue, SettingsSnapshot,
};
use entitle_store::SettingsStore;
use tracing::{info, warn};

use crate::error::Result;

/// Global settings backed by a [`SettingsStore`].
///
/// Each getter distinguishes "never written" from an explicit value: only an
/// absent cell falls back to the default.
pub struct GlobalSettings<S: SettingsStore> {
    store: Arc<S>,
}

impl<S: SettingsStore> Clone for GlobalSettings<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: SettingsStore> GlobalSettings<S> {
    /// Wrap a shared store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Whether the public trail (access for everyone) is on. Default: off.
    pub async fn public_trail_enabled(&self) -> Result<bool> {
        Ok(self
            .resolve(&[SettingKey::PublicTrailEnabled])
            .await?
            .public_trail_enabled)
    }

    pub async fn set_public_trail_enabled(&self, enabled: bool) -> Result<()> {
        self.store
            .put_setting(SettingKey::PublicTrailEnabled, &SettingValue::Bool(enabled))
            .await?;
        info!(enabled, "public trail toggled");
        Ok(())
    }

    /// Whether principals may request a trial themselves. Default: off.
    pub async fn trial_request_enabled(&self) -> Result<bool> {
        Ok(self
            .resolve(&[SettingKey::TrialRequestEnabled])
            .await?
            .trial_request_enabled)
    }

    pub async fn set_trial_request_enabled(&self, enabled: bool) -> Result<()> {
        self.store
            .put_setting(SettingKey::TrialRequestEnabled, &SettingValue::Bool(enabled))
            .await?;
        info!(enabled, "trial requests toggled");
        Ok(())
    }

    /// Length of a self-service trial in days. Default: 3.
    pub async fn trial_duration_days(&self) -> Result<u32> {
        Ok(self
            .resolve(&[SettingKey::TrialDurationDays])
            .await?
            .trial_duration_days)
    }

    /// Set the trial length. Values outside `[1, 365]` are rejected and the
    /// stored value is left untouched.
    pub async fn set_trial_duration_days(&self, days: i64) -> Result<u32> {
        let days = validate_trial_duration_days(days)?;
        self.store
            .put_setting(
                SettingKey::TrialDurationDays,
                &SettingValue::Integer(i64::from(days)),
            )
            .await?;
        info!(days, "trial duration updated");
        Ok(days)
    }

    /// Read every cell and resolve it against the defaults.
    pub async fn snapshot(&self) -> Result<SettingsSnapshot> {
        self.resolve(&SettingKey::ALL).await
    }

    /// Overlay the stored `keys` onto the defaults. Cells that were never
    /// written keep the default; unusable cells are logged and skipped.
    async fn resolve(&self, keys: &[SettingKey]) -> Result<SettingsSnapshot> {
        let mut snapshot = SettingsSnapshot::default();
        for &key in keys {
            let Some(value) = self.store.get_setting(key).await? else {
                continue;
            };
            if !snapshot.apply(key, &value) {
                warn!(key = %key, value = ?value, "ignoring unusable stored setting");
            }
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use entitle_core::ValidationError;
    use entitle_store::MemoryStore;

    fn settings() -> (Arc<MemoryStore>, GlobalSettings<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Arc::clone(&store), GlobalSettings::new(store))
    }

    #[tokio::test]
    async fn test_defaults_when_never_set() {
        let (_, settings) = settings();
        assert_eq!(settings.snapshot().await.unwrap(), SettingsSnapshot::default());
    }

    #[tokio::test]
    async fn test_flags_are_independent() {
        let (_, settings) = settings();
        settings.set_public_trail_enabled(true).await.unwrap();

        assert!(settings.public_trail_enabled().await.unwrap());
        assert!(!settings.trial_request_enabled().await.unwrap());

        settings.set_public_trail_enabled(false).await.unwrap();
        assert!(!settings.public_trail_enabled().await.unwrap());
    }

    #[tokio::test]
    async fn test_out_of_range_trial_duration_keeps_prior_value() {
        let (_, settings) = settings();

        let err = settings.set_trial_duration_days(400).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::TrialDurationOutOfRange { got: 400, .. })
        ));
        assert_eq!(settings.trial_duration_days().await.unwrap(), 3);

        settings.set_trial_duration_days(10).await.unwrap();
        assert!(settings.set_trial_duration_days(0).await.is_err());
        assert_eq!(settings.trial_duration_days().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_explicit_values_override_defaults() {
        let (_, settings) = settings();
        settings.set_trial_request_enabled(true).await.unwrap();
        settings.set_trial_request_enabled(false).await.unwrap();
        settings.set_trial_duration_days(365).await.unwrap();

        let snapshot = settings.snapshot().await.unwrap();
        assert!(!snapshot.trial_request_enabled);
        assert_eq!(snapshot.trial_duration_days, 365);
    }

    #[tokio::test]
    async fn test_wrong_typed_cell_falls_back_to_default() {
        let (store, settings) = settings();
        store
            .put_setting(SettingKey::PublicTrailEnabled, &SettingValue::Text("on".into()))
            .await
            .unwrap();
        store
            .put_setting(SettingKey::TrialDurationDays, &SettingValue::Integer(-4))
            .await
            .unwrap();

        assert!(!settings.public_trail_enabled().await.unwrap());
        assert_eq!(settings.trial_duration_days().await.unwrap(), 3);
    }
}
