//! # Clock Abstraction
//!
//! The duress lock compares "now" against an absolute unlock time, and the
//! only honest way to test a time-based state machine is to own the clock.
//! Everything in the core that needs the current time goes through the
//! [`Clock`] trait; production code uses [`SystemClock`], tests drive a
//! [`ManualClock`] forward by hand.
//!
//! All times are unsigned milliseconds since the Unix epoch, matching the
//! timestamp unit the attestation service signs over.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// A source of current time in epoch milliseconds.
///
/// Implementations must be cheap and non-blocking; the core reads the clock
/// inside its atomic mutation sections.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Wall-clock time via `chrono`. The default for production use.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        // timestamp_millis() is negative only before 1970. We don't settle
        // transfers in the past.
        Utc::now().timestamp_millis().max(0) as u64
    }
}

/// A clock that only moves when told to. For tests and simulations.
///
/// Shared freely across threads; reads and writes are atomic.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    /// Creates a manual clock starting at the given time.
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
        }
    }

    /// Sets the clock to an absolute time.
    pub fn set(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }

    /// Advances the clock by the given number of milliseconds.
    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
