//! Compact duration tokens.
//!
//! A token is a decimal integer immediately followed by one unit letter,
//! case-insensitive:
//!
//! | unit | meaning            | example          |
//! |------|--------------------|------------------|
//! | `d`  | days               | `30d`            |
//! | `h`  | hours              | `12h`            |
//! | `m`  | 30-day months      | `6m` = 180 days  |
//!
//! `m` is months, not minutes. There is no upper bound on the number; callers
//! with a range (such as the trial duration setting) check it themselves.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Days in one `m` unit.
pub const DAYS_PER_MONTH: i64 = 30;

/// Length of a "permanent" grant: 100 years of days.
///
/// Permanent grants are ordinary records with a far-future expiry, so status
/// computation never special-cases them.
pub const PERMANENT_GRANT_DAYS: i64 = 36_500;

/// Unit letter of a duration token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationUnit {
    Days,
    Hours,
    Months,
}

impl DurationUnit {
    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'd' => Some(DurationUnit::Days),
            'h' => Some(DurationUnit::Hours),
            'm' => Some(DurationUnit::Months),
            _ => None,
        }
    }

    /// Canonical unit letter.
    pub fn letter(&self) -> char {
        match self {
            DurationUnit::Days => 'd',
            DurationUnit::Hours => 'h',
            DurationUnit::Months => 'm',
        }
    }
}

/// A parsed duration token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantDuration {
    pub value: i64,
    pub unit: DurationUnit,
}

impl GrantDuration {
    /// The 100-year duration used for grants without an explicit token.
    pub const fn permanent() -> Self {
        Self {
            value: PERMANENT_GRANT_DAYS,
            unit: DurationUnit::Days,
        }
    }

    /// A whole number of days.
    pub const fn days(value: i64) -> Self {
        Self {
            value,
            unit: DurationUnit::Days,
        }
    }

    /// Parse a token such as `30d`, `12H` or `6m`.
    pub fn parse(token: &str) -> Result<Self, CoreError> {
        let trimmed = token.trim();
        let invalid = || CoreError::InvalidDuration(token.to_string());

        let unit_char = trimmed.chars().last().ok_or_else(invalid)?;
        let unit = DurationUnit::from_char(unit_char).ok_or_else(invalid)?;
        let digits = &trimmed[..trimmed.len() - unit_char.len_utf8()];

        // `str::parse::<i64>` accepts a leading sign; tokens must not.
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let value = digits.parse::<i64>().map_err(|_| invalid())?;

        Ok(Self { value, unit })
    }

    /// Convert to a concrete duration.
    pub fn to_duration(&self) -> Result<Duration, CoreError> {
        let overflow = || CoreError::InvalidDuration(self.to_string());
        match self.unit {
            DurationUnit::Days => Duration::try_days(self.value).ok_or_else(overflow),
            DurationUnit::Hours => Duration::try_hours(self.value).ok_or_else(overflow),
            DurationUnit::Months => self
                .value
                .checked_mul(DAYS_PER_MONTH)
                .and_then(Duration::try_days)
                .ok_or_else(overflow),
        }
    }

    /// Whether the token denotes a zero-length duration.
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// The absolute expiry instant `now + self`.
    pub fn expiry_after(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, CoreError> {
        now.checked_add_signed(self.to_duration()?)
            .ok_or_else(|| CoreError::ExpiryOverflow(self.to_string()))
    }
}

impl fmt::Display for GrantDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.letter())
    }
}

impl FromStr for GrantDuration {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse a duration token straight into a [`Duration`].
pub fn parse_duration(token: &str) -> Result<Duration, CoreError> {
    GrantDuration::parse(token)?.to_duration()
}
