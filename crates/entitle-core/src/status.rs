//! Expiry status computation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::timestamp::Timestamp;

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;

/// Coarse state of an expiry instant relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeState {
    Active,
    Expired,
    Invalid,
}

impl TimeState {
    /// Upper-case label used in listings.
    pub fn label(&self) -> &'static str {
        match self {
            TimeState::Active => "ACTIVE",
            TimeState::Expired => "EXPIRED",
            TimeState::Invalid => "INVALID",
        }
    }
}

impl fmt::Display for TimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Time left until expiry, broken into calendar units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl Remaining {
    /// Break a non-negative number of seconds into days / hours / minutes.
    /// Leftover seconds are dropped.
    pub fn from_seconds(seconds: i64) -> Self {
        let seconds = seconds.max(0);
        Self {
            days: seconds / SECS_PER_DAY,
            hours: (seconds % SECS_PER_DAY) / SECS_PER_HOUR,
            minutes: (seconds % SECS_PER_HOUR) / SECS_PER_MINUTE,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0
    }
}

/// Renders the two largest units: `2d 3h`, `3h 15m`, or `15m`.
impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days > 0 {
            write!(f, "{}d {}h", self.days, self.hours)
        } else if self.hours > 0 {
            write!(f, "{}h {}m", self.hours, self.minutes)
        } else {
            write!(f, "{}m", self.minutes)
        }
    }
}

/// Status of an expiry instant at a given evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeStatus {
    /// `now <= expires_at`.
    Active(Remaining),
    /// `now > expires_at`.
    Expired,
    /// The stored expiry did not parse.
    Invalid,
}

impl TimeStatus {
    /// Evaluate a well-formed expiry instant. Expired iff `now > expires_at`.
    pub fn evaluate(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now > expires_at {
            return TimeStatus::Expired;
        }
        let seconds = (expires_at - now).num_seconds();
        TimeStatus::Active(Remaining::from_seconds(seconds))
    }

    /// Evaluate a stored expiry, which may be malformed.
    pub fn evaluate_stored(expires_at: &Timestamp, now: DateTime<Utc>) -> Self {
        match expires_at {
            Timestamp::At(instant) => Self::evaluate(*instant, now),
            Timestamp::Malformed(_) => TimeStatus::Invalid,
        }
    }

    pub fn state(&self) -> TimeState {
        match self {
            TimeStatus::Active(_) => TimeState::Active,
            TimeStatus::Expired => TimeState::Expired,
            TimeStatus::Invalid => TimeState::Invalid,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TimeStatus::Active(_))
    }

    pub fn remaining(&self) -> Option<Remaining> {
        match self {
            TimeStatus::Active(remaining) => Some(*remaining),
            _ => None,
        }
    }

    /// Human-readable remaining time: the breakdown, `Expired`, or `Invalid`.
    pub fn remaining_text(&self) -> String {
        match self {
            TimeStatus::Active(remaining) => remaining.to_string(),
            TimeStatus::Expired => "Expired".to_string(),
            TimeStatus::Invalid => "Invalid".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_expired_is_strict() {
        let expiry = t0();
        assert!(TimeStatus::evaluate(expiry, expiry).is_active());
        assert_eq!(
            TimeStatus::evaluate(expiry, expiry + Duration::seconds(1)),
            TimeStatus::Expired
        );
    }

    #[test]
    fn test_zero_remaining_renders_zero_minutes() {
        let status = TimeStatus::evaluate(t0(), t0());
        assert_eq!(status.remaining_text(), "0m");
        assert!(status.remaining().unwrap().is_zero());
    }

    #[test]
    fn test_two_largest_units() {
        let now = t0();
        let cases = [
            (Duration::days(2) + Duration::hours(3) + Duration::minutes(15), "2d 3h"),
            (Duration::days(1), "1d 0h"),
            (Duration::hours(3) + Duration::minutes(15), "3h 15m"),
            (Duration::minutes(15) + Duration::seconds(59), "15m"),
            (Duration::seconds(59), "0m"),
        ];
        for (delta, expected) in cases {
            assert_eq!(
                TimeStatus::evaluate(now + delta, now).remaining_text(),
                expected
            );
        }
    }

    #[test]
    fn test_malformed_stored_expiry_is_invalid() {
        let status = TimeStatus::evaluate_stored(&Timestamp::parse("garbage"), t0());
        assert_eq!(status, TimeStatus::Invalid);
        assert_eq!(status.state().label(), "INVALID");
        assert_eq!(status.remaining_text(), "Invalid");
    }

    #[test]
    fn test_expired_text() {
        let status = TimeStatus::evaluate(t0() - Duration::days(1), t0());
        assert_eq!(status.state(), TimeState::Expired);
        assert_eq!(status.remaining_text(), "Expired");
        assert_eq!(status.remaining(), None);
    }

    proptest! {
        #[test]
        fn status_matches_ordering(expiry_secs in -1_000_000_000i64..1_000_000_000, offset in -10_000_000i64..10_000_000) {
            let base = t0();
            let expires_at = base + Duration::seconds(expiry_secs);
            let now = expires_at + Duration::seconds(offset);
            let status = TimeStatus::evaluate(expires_at, now);
            if now > expires_at {
                prop_assert_eq!(status, TimeStatus::Expired);
            } else {
                let remaining = status.remaining().unwrap();
                prop_assert!(remaining.days >= 0 && remaining.hours >= 0 && remaining.minutes >= 0);
                prop_assert!(remaining.hours < 24 && remaining.minutes < 60);
            }
        }
    }
}
