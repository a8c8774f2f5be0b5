//! # Entitle Testkit
//!
//! Testing utilities for the Entitle ledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Clock**: A [`ManualClock`] tests can move forward and back
//! - **Fixtures**: A ready-made in-memory ledger with a controllable clock
//! - **Generators**: Proptest strategies for tokens, principals and records
//! - **Fault injection**: A store wrapper that fails on demand
//!
//! ## Test Fixtures
//!
//! ```rust
//! use chrono::Duration;
//! use entitle_core::GrantType;
//! use entitle_testkit::fixtures::{principal, LedgerFixture};
//!
//! # tokio_test_block(async {
//! let fixture = LedgerFixture::new();
//! let alice = principal("alice");
//! fixture.seed(&alice, GrantType::Premium, Duration::days(1)).await;
//! fixture.advance(Duration::days(2));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(_: F) {}
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use entitle_testkit::generators::{record_from_params, RecordParams};
//!
//! proptest! {
//!     #[test]
//!     fn status_is_deterministic(params: RecordParams) {
//!         let record = record_from_params(&params);
//!         prop_assert_eq!(record.status_at(params.created_at), record.status_at(params.created_at));
//!     }
//! }
//! ```

pub mod clock;
pub mod faulty;
pub mod fixtures;
pub mod generators;

pub use clock::{default_epoch, ManualClock};
pub use faulty::FaultyStore;
pub use fixtures::{principal, principals, LedgerFixture};
pub use generators::{record_from_params, RecordParams};
