//! Stored timestamps.
//!
//! Timestamps are persisted as `YYYY-MM-DD HH:MM:SS` text in UTC, with second
//! precision. Other writers share the same document store, so a stored value
//! may fail to parse. Such values are kept as [`Timestamp::Malformed`] instead
//! of failing the read; status computation reports them as INVALID.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Text format of persisted timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// An instant as read from storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Timestamp {
    /// A well-formed instant, truncated to whole seconds.
    At(DateTime<Utc>),
    /// Stored text that does not parse as a timestamp.
    Malformed(String),
}

impl Timestamp {
    /// Create a timestamp from an instant, dropping sub-second precision.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Timestamp::At(instant.trunc_subsecs(0))
    }

    /// Parse stored text. Never fails: unparseable text becomes `Malformed`.
    pub fn parse(text: &str) -> Self {
        match NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT) {
            Ok(naive) => Timestamp::At(naive.and_utc()),
            Err(_) => Timestamp::Malformed(text.to_string()),
        }
    }

    /// The instant, if well-formed.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::At(instant) => Some(*instant),
            Timestamp::Malformed(_) => None,
        }
    }

    /// Whether the stored value parsed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Timestamp::At(_))
    }

    /// The persisted text form.
    pub fn to_stored(&self) -> String {
        match self {
            Timestamp::At(instant) => instant.format(TIMESTAMP_FORMAT).to_string(),
            Timestamp::Malformed(raw) => raw.clone(),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Timestamp::at(instant)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_stored())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_stored())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Timestamp::parse(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stored_text_roundtrip() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 9, 17, 5, 42).unwrap();
        let ts = Timestamp::at(instant);
        assert_eq!(ts.to_stored(), "2024-03-09 17:05:42");
        assert_eq!(Timestamp::parse("2024-03-09 17:05:42"), ts);
    }

    #[test]
    fn test_subsecond_precision_is_dropped() {
        let instant = Utc.timestamp_opt(1_700_000_000, 999_000_000).unwrap();
        assert_eq!(
            Timestamp::at(instant).instant().unwrap().timestamp_subsec_nanos(),
            0
        );
    }

    #[test]
    fn test_malformed_is_preserved() {
        let ts = Timestamp::parse("next tuesday");
        assert_eq!(ts, Timestamp::Malformed("next tuesday".to_string()));
        assert!(!ts.is_valid());
        assert_eq!(ts.to_stored(), "next tuesday");
    }

    #[test]
    fn test_deserialize_never_fails_on_bad_text() {
        let ts: Timestamp = serde_json::from_str("\"2024-13-40 99:99:99\"").unwrap();
        assert!(!ts.is_valid());
    }
}
