//! # Entitle Core
//!
//! Pure primitives for the Entitle ledger: grant types, entitlement records,
//! duration tokens, expiry status and access evaluation.
//!
//! This crate contains no storage and no networking. Every function takes the
//! evaluation instant explicitly, so the same inputs always produce the same
//! answer.
//!
//! ## Key Types
//!
//! - [`PrincipalId`] - Case-sensitive identifier of the principal a record belongs to
//! - [`EntitlementRecord`] - One time-bounded grant for one principal
//! - [`GrantType`] - Closed set of grant categories (`premium`, `trial`, `trail`)
//! - [`TimeStatus`] - ACTIVE / EXPIRED / INVALID status of an expiry instant
//! - [`SettingsSnapshot`] - Process-wide flags, passed explicitly to the evaluator
//! - [`AccessResult`] - The answer to "does this principal have access right now?"
//!
//! ## Durations
//!
//! Duration tokens are `<int><unit>` where the unit is `d` (days), `h` (hours)
//! or `m` (30-day months). See [`duration`].

pub mod access;
pub mod clock;
pub mod duration;
pub mod error;
pub mod grant;
pub mod policy;
pub mod record;
pub mod settings;
pub mod status;
pub mod timestamp;
pub mod types;

pub use access::{evaluate_access, AccessResult};
pub use clock::{Clock, SystemClock};
pub use duration::{parse_duration, DurationUnit, GrantDuration, PERMANENT_GRANT_DAYS};
pub use error::{CoreError, ValidationError};
pub use grant::GrantType;
pub use policy::{check_give_trail, check_trial_request, TrialRejection};
pub use record::EntitlementRecord;
pub use settings::{
    validate_trial_duration_days, SettingKey, SettingValue, SettingsSnapshot,
    DEFAULT_TRIAL_DURATION_DAYS, MAX_TRIAL_DURATION_DAYS, MIN_TRIAL_DURATION_DAYS,
};
pub use status::{Remaining, TimeState, TimeStatus};
pub use timestamp::{Timestamp, TIMESTAMP_FORMAT};
pub use types::PrincipalId;
