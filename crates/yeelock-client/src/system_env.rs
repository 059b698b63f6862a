//! Production Environment implementation using system clocks.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use yeelock_core::Environment;

/// Production environment backed by the system clocks.
///
/// - `Instant::now()` for monotonic time (timeout arithmetic)
/// - `SystemTime` for the wall-clock epoch seconds signed into frames
/// - `tokio::time::sleep()` for async sleeping
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn unix_time(&self) -> u64 {
        // A wall clock before the epoch means the host clock is broken; the
        // device will reject the frame and report desync, which recovers by
        // pushing a (still wrong) time. Nothing better is available here.
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_secs())
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
