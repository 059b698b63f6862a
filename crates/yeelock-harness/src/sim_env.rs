//! Controllable Environment implementation for tests.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use tokio::sync::Notify;
use yeelock_core::Environment;

/// Default unix base: 2023-11-14T22:13:20Z, an arbitrary fixed point so
/// frame assertions are byte-exact.
const DEFAULT_UNIX_BASE: u64 = 1_700_000_000;

/// Simulation environment with a manually advanced clock.
///
/// Clones share the same clock, so the environment handed to a device and
/// the one held by the test stay in lockstep.
#[derive(Debug, Clone)]
pub struct SimEnv {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    start: Instant,
    unix_base: u64,
    advanced: Mutex<Duration>,
    tick: Notify,
}

impl Inner {
    fn now(&self) -> Instant {
        self.start + *self.guard()
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, Duration> {
        self.advanced.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SimEnv {
    /// Environment starting at the default unix base.
    pub fn new() -> Self {
        Self::with_unix_time(DEFAULT_UNIX_BASE)
    }

    /// Environment starting at an explicit unix time.
    pub fn with_unix_time(unix_base: u64) -> Self {
        Self {
            inner: Arc::new(Inner {
                start: Instant::now(),
                unix_base,
                advanced: Mutex::new(Duration::ZERO),
                tick: Notify::new(),
            }),
        }
    }

    /// Move both clocks forward and wake expired sleepers.
    pub fn advance(&self, delta: Duration) {
        *self.inner.guard() += delta;
        self.inner.tick.notify_waiters();
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Instant {
        self.inner.now()
    }

    fn unix_time(&self) -> u64 {
        self.inner.unix_base + self.inner.guard().as_secs()
    }

    /// Virtual sleep: completes only once [`SimEnv::advance`] has moved the
    /// clock past the deadline, never by consuming wall time.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        let inner = Arc::clone(&self.inner);
        let deadline = self.now() + duration;
        async move {
            loop {
                let notified = inner.tick.notified();
                tokio::pin!(notified);
                // Register before checking, so an advance between the check
                // and the await cannot be missed.
                notified.as_mut().enable();
                if inner.now() >= deadline {
                    return;
                }
                notified.await;
            }
        }
    }
}
