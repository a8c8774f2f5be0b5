//! Error types for the command layer.

use entitle::LedgerError;
use thiserror::Error;

use crate::command::CommandKind;

/// Errors that can occur while handling commands or moving messages.
#[derive(Debug, Error)]
pub enum BotError {
    /// The caller is not an administrator. Raised before any read or write.
    #[error("not authorized")]
    NotAuthorized,

    /// The command's arguments have the wrong shape.
    #[error("usage error for /{}", .0.name())]
    Usage(CommandKind),

    /// Transport-level error. The supervisor reconnects after these.
    #[error("transport error: {0}")]
    Transport(String),

    /// Ledger operation failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for BotError {
    fn from(err: config::ConfigError) -> Self {
        BotError::Config(err.to_string())
    }
}

/// Result type for command-layer operations.
pub type Result<T> = std::result::Result<T, BotError>;
