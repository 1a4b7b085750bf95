//! Ledger time sources
//!
//! Maturity is a plain comparison against `Clock::now`; nothing in the
//! engine waits or schedules.

use chrono::Utc;
use std::cell::Cell;
use types::numeric::{Duration, Timestamp};

pub trait Clock {
    /// Current ledger time in seconds.
    fn now(&self) -> Timestamp;
}

/// Wall-clock UTC seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // Pre-epoch clocks read as zero
        Timestamp::try_from(Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Manually driven clock for tests and replay.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}
