//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples driver logic from system time. Frame
//! timestamps are "now" at encode time, which would make every encode
//! non-deterministic if the codec read the clock itself; routing time
//! through this trait lets tests pin the clock and assert exact frames.
//!
//! # Invariants
//!
//! - Monotonicity: `env.now()` must never go backwards
//! - `unix_time()` is wall-clock and may jump (NTP); it feeds the wire
//!   timestamp only, never timeout arithmetic

use std::time::{Duration, Instant};

/// Abstract environment providing time to the driver.
///
/// Production uses the system clock; tests use a controllable clock so
/// encoding is deterministic and timeouts can be exercised without
/// wall-clock waits.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Returns the current monotonic time.
    ///
    /// Used for timeout arithmetic. Must never decrease within a single
    /// execution context.
    fn now(&self) -> Instant;

    /// Returns wall-clock seconds since the Unix epoch.
    ///
    /// This is the value signed into every command frame. The lock firmware
    /// compares it against its own clock, so it must be real wall time in
    /// production.
    fn unix_time(&self) -> u64;

    /// Sleeps for the specified duration.
    ///
    /// This is the only async method in the trait, and it should only be
    /// used by driver code (never by the state machine).
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}
