//! # Entitle
//!
//! The unified API for the Entitle system: time-bounded access grants for
//! principals, process-wide overrides, and access evaluation.
//!
//! ## Overview
//!
//! The ledger answers one question for a command layer: does this principal
//! have access right now, and under which grant?
//!
//! - **Records**: At most one per principal, carrying a grant type and an expiry
//! - **Grants**: Administrative premium and trail grants, self-service trials
//! - **Settings**: Public trail, trial requests and trial length
//! - **Evaluation**: A deterministic function of record, settings and "now"
//!
//! ## Key Concepts
//!
//! - **Premium**: A paid grant with an explicit duration
//! - **Trial**: A self-service grant, at most one per principal lifetime
//! - **Trail**: A long-lived grant; also the name of the global override
//! - **Public trail**: When on, every principal has access regardless of records
//!
//! ## Usage
//!
//! ```rust,no_run
//! use entitle::{Ledger, LedgerConfig};
//! use entitle::core::PrincipalId;
//! use entitle::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("entitle.db").unwrap();
//!     let ledger = Ledger::new(store, LedgerConfig::default());
//!
//!     let principal = PrincipalId::new("5316048641").unwrap();
//!     ledger.grant(&principal, "30d", Some("admin")).await.unwrap();
//!
//!     let access = ledger.evaluate(&principal).await.unwrap();
//!     assert!(access.has_access());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `entitle::core` - Core primitives (records, durations, evaluation)
//! - `entitle::store` - Storage abstraction and SQLite

pub mod config;
pub mod error;
pub mod ledger;
pub mod settings;

pub use entitle_core as core;
pub use entitle_store as store;

pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use ledger::{GiveTrailOutcome, Ledger, LedgerEntry, LedgerStats, TrialOutcome};
pub use settings::GlobalSettings;

pub use entitle_core::{
    AccessResult, EntitlementRecord, GrantType, PrincipalId, TimeStatus, TrialRejection,
};
