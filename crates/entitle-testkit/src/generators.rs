//! Proptest generators for property-based testing.

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;

use entitle_core::{DurationUnit, EntitlementRecord, GrantType, PrincipalId};

/// Generate a non-empty, case-sensitive principal id.
pub fn principal_id() -> impl Strategy<Value = PrincipalId> {
    "[A-Za-z0-9_@.-]{1,24}".prop_filter_map("empty principal", |s| PrincipalId::new(s).ok())
}

/// Generate a grant type.
pub fn grant_type() -> impl Strategy<Value = GrantType> {
    prop_oneof![
        Just(GrantType::Premium),
        Just(GrantType::Trial),
        Just(GrantType::Trail),
    ]
}

/// Generate a duration unit.
pub fn duration_unit() -> impl Strategy<Value = DurationUnit> {
    prop_oneof![
        Just(DurationUnit::Days),
        Just(DurationUnit::Hours),
        Just(DurationUnit::Months),
    ]
}

/// Generate a well-formed duration token together with its value and unit.
///
/// The unit letter is randomly upper- or lower-case.
pub fn duration_token() -> impl Strategy<Value = (String, i64, DurationUnit)> {
    (0i64..=10_000, duration_unit(), any::<bool>()).prop_map(|(value, unit, upper)| {
        let letter = if upper {
            unit.letter().to_ascii_uppercase()
        } else {
            unit.letter()
        };
        (format!("{value}{letter}"), value, unit)
    })
}

/// Generate a token that must not parse: a bad unit, a missing number, a
/// sign prefix or a fractional value.
pub fn malformed_token() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..1000, "[a-ce-gi-ln-zA-CE-GI-LN-Z]").prop_map(|(n, u)| format!("{n}{u}")),
        "[dhmDHM]".prop_map(String::from),
        (1u32..1000, "[dhm]").prop_map(|(n, u)| format!("-{n}{u}")),
        (1u32..1000, "[dhm]").prop_map(|(n, u)| format!("+{n}{u}")),
        (1u32..100, 1u32..10, "[dhm]").prop_map(|(n, f, u)| format!("{n}.{f}{u}")),
        Just(String::new()),
    ]
}

/// Generate an instant between 2000 and 2100, truncated to whole seconds.
pub fn instant() -> impl Strategy<Value = DateTime<Utc>> {
    (946_684_800i64..4_102_444_800).prop_filter_map("out of range", |secs| {
        DateTime::<Utc>::from_timestamp(secs, 0)
    })
}

/// Generate an offset of up to about a year in either direction.
pub fn offset() -> impl Strategy<Value = Duration> {
    (-31_536_000i64..=31_536_000).prop_map(Duration::seconds)
}

/// Parameters for generating a record relative to some instant.
#[derive(Debug, Clone)]
pub struct RecordParams {
    pub grant_type: GrantType,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Arbitrary for RecordParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (grant_type(), instant(), offset())
            .prop_map(|(grant_type, created_at, offset)| RecordParams {
                grant_type,
                created_at,
                expires_at: created_at + offset,
            })
            .boxed()
    }
}

/// Build a record from parameters.
pub fn record_from_params(params: &RecordParams) -> EntitlementRecord {
    EntitlementRecord::new(params.grant_type, params.created_at, params.expires_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use entitle_core::{parse_duration, GrantDuration};

    proptest! {
        #[test]
        fn test_generated_tokens_parse(token in duration_token()) {
            let (text, value, unit) = token;
            let parsed = GrantDuration::parse(&text).unwrap();
            prop_assert_eq!(parsed.value, value);
            prop_assert_eq!(parsed.unit, unit);
        }

        #[test]
        fn test_malformed_tokens_are_rejected(token in malformed_token()) {
            prop_assert!(parse_duration(&token).is_err());
        }

        #[test]
        fn test_record_from_params_keeps_instants(params: RecordParams) {
            let record = record_from_params(&params);
            prop_assert_eq!(record.expires_at.instant(), Some(params.expires_at));
            prop_assert_eq!(record.grant_type, params.grant_type);
        }
    }
}
