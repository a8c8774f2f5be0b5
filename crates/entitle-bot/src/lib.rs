//! # Entitle Bot
//!
//! The command layer in front of the Entitle ledger.
//!
//! ## Overview
//!
//! - [`Command`] tokenizes `/name args...` messages
//! - [`Dispatcher`] authorizes, calls the [`Ledger`](entitle::Ledger) and renders replies
//! - [`MessageTransport`] abstracts where messages come from (channel, console)
//! - [`Supervisor`] runs the receive loop and restarts it after transport failures
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use entitle::{Ledger, LedgerConfig};
//! use entitle::store::SqliteStore;
//! use entitle_bot::transport::console::ConsoleTransport;
//! use entitle_bot::{Dispatcher, Supervisor};
//!
//! async fn example() {
//!     let ledger = Ledger::new(SqliteStore::open("entitle.db").unwrap(), LedgerConfig::default());
//!     let dispatcher = Dispatcher::new(Arc::new(ledger), []);
//!     let supervisor = Supervisor::new(Arc::new(ConsoleTransport::stdio()), Arc::new(dispatcher));
//!     supervisor.run().await;
//! }
//! ```

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod render;
pub mod supervisor;
pub mod transport;

pub use command::{Command, CommandKind};
pub use self::config::BotConfig;
pub use dispatch::Dispatcher;
pub use error::{BotError, Result};
pub use supervisor::{Supervisor, DEFAULT_RESTART_BACKOFF};
pub use transport::{InboundMessage, MessageTransport};
