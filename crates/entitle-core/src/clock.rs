//! Source of "now".

use chrono::{DateTime, Utc};

/// Supplies the evaluation instant.
///
/// The ledger reads the clock once per operation and passes the instant down,
/// so every computation inside one operation sees the same "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
