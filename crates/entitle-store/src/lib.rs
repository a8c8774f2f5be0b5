//! # Entitle Store
//!
//! Storage abstraction for the Entitle ledger. Provides trait-based
//! interfaces for record and settings persistence with SQLite and in-memory
//! implementations.
//!
//! ## Key Types
//!
//! - [`EntitlementStore`] - put / get / delete / list for principal records
//! - [`SettingsStore`] - independent process-wide settings cells
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use entitle_store::{EntitlementStore, SqliteStore};
//! use entitle_core::PrincipalId;
//!
//! async fn example() {
//!     let store = SqliteStore::open("entitle.db").unwrap();
//!     let principal = PrincipalId::new("5316048641").unwrap();
//!     let record = store.get(&principal).await.unwrap();
//!     println!("{:?}", record);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Full replace**: `put` overwrites every field of an existing record
//! - **Absence is not an error**: `get` of an unknown principal is `Ok(None)`
//! - **Idempotent delete**: deleting an unknown principal returns `false`
//! - **Durable writes**: every mutation is committed before the call returns

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{EntitlementStore, LedgerStore, SettingsStore, UpsertResult};
