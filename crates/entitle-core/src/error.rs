//! Error types for the Entitle core.

use thiserror::Error;

/// Errors raised while interpreting caller input or stored values.
///
/// These are recoverable: callers surface them as a usage hint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid duration format: {0:?} (expected <number><d|h|m>, e.g. 30d, 12h, 6m)")]
    InvalidDuration(String),

    #[error("duration must be longer than zero: {0:?}")]
    EmptyDuration(String),

    #[error("unknown grant type: {0:?}")]
    UnknownGrantType(String),

    #[error("expiry out of range for duration {0:?}")]
    ExpiryOverflow(String),
}

/// Validation errors for configuration values.
///
/// A value rejected here is never written; the prior value stays in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("trial duration must be between {min} and {max} days, got {got}")]
    TrialDurationOutOfRange { min: u32, max: u32, got: i64 },

    #[error("principal id must not be empty")]
    EmptyPrincipal,
}
