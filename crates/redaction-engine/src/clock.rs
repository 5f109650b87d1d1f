//! # Clock
//!
//! Time-lock enforcement (§4.5/§4.6) needs a monotonic source of "now" the
//! engine can be tested against deterministically, so it is injected rather
//! than read from `SystemTime` directly inside `RedactionEngine`.

use parking_lot::Mutex;
use shared_types::Timestamp;
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of the current unix timestamp.
pub trait Clock: Send + Sync {
    /// Seconds since the unix epoch.
    fn now(&self) -> Timestamp;
}

/// The production clock: reads the OS wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// A clock whose reading is set explicitly, for deterministic time-lock
/// tests. Not gated behind `#[cfg(test)]` so integration tests in other
/// workspace crates can use it too.
#[derive(Debug, Default)]
pub struct FixedClock(Mutex<Timestamp>);

impl FixedClock {
    /// A clock starting at `ts`.
    #[must_use]
    pub fn new(ts: Timestamp) -> Self {
        Self(Mutex::new(ts))
    }

    /// Set the clock to `ts`.
    pub fn set(&self, ts: Timestamp) {
        *self.0.lock() = ts;
    }

    /// Move the clock forward by `secs`.
    pub fn advance(&self, secs: Timestamp) {
        *self.0.lock() += secs;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.0.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances_by_set_amount() {
        let clock = FixedClock::new(100);
        clock.advance(50);
        assert_eq!(clock.now(), 150);
    }

    #[test]
    fn system_clock_returns_nonzero_time() {
        assert!(SystemClock.now() > 0);
    }
}
