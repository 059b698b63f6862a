//! Instrumented in-memory BLE transport.

use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;
use yeelock_core::{DeviceAddress, LockConnection, Transport, TransportError};

/// In-memory stand-in for a BLE stack plus the peripheral behind it.
///
/// Clones share state, so a test keeps one handle for instrumentation while
/// the device under test owns another.
#[derive(Debug, Clone, Default)]
pub struct FakeTransport {
    inner: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    connect_attempts: AtomicUsize,
    connect_delay: Mutex<Duration>,
    fail_next_connect: AtomicBool,
    fail_next_write: AtomicBool,
    link_up: AtomicBool,
    writes: Mutex<Vec<(Uuid, Vec<u8>)>>,
    notify_tx: Mutex<Option<mpsc::Sender<Vec<u8>>>>,
}

impl FakeTransport {
    /// A transport whose peripheral is reachable and healthy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every connect handshake take this long.
    pub fn set_connect_delay(&self, delay: Duration) {
        *lock(&self.inner.connect_delay) = delay;
    }

    /// The next connect fails as if the address did not resolve.
    pub fn fail_next_connect(&self) {
        self.inner.fail_next_connect.store(true, Ordering::SeqCst);
    }

    /// The next characteristic write fails at the BLE layer.
    pub fn fail_next_write(&self) {
        self.inner.fail_next_write.store(true, Ordering::SeqCst);
    }

    /// Kill the link out from under any open connection.
    pub fn drop_link(&self) {
        self.inner.link_up.store(false, Ordering::SeqCst);
    }

    /// How many physical connect attempts have been made.
    pub fn connect_attempts(&self) -> usize {
        self.inner.connect_attempts.load(Ordering::SeqCst)
    }

    /// Every characteristic write so far, in order.
    pub fn writes(&self) -> Vec<(Uuid, Vec<u8>)> {
        lock(&self.inner.writes).clone()
    }

    /// Push a notification payload to the current subscriber.
    ///
    /// Returns false if nothing is subscribed (or the subscriber is gone).
    pub async fn notify(&self, payload: Vec<u8>) -> bool {
        let sender = lock(&self.inner.notify_tx).clone();
        match sender {
            Some(tx) => tx.send(payload).await.is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    type Connection = FakeConnection;

    async fn connect(&self, address: &DeviceAddress) -> Result<FakeConnection, TransportError> {
        self.inner.connect_attempts.fetch_add(1, Ordering::SeqCst);

        let delay = *lock(&self.inner.connect_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.inner.fail_next_connect.swap(false, Ordering::SeqCst) {
            return Err(TransportError::DeviceNotFound { address: address.clone() });
        }

        self.inner.link_up.store(true, Ordering::SeqCst);
        Ok(FakeConnection { inner: Arc::clone(&self.inner) })
    }
}

/// Connection handle produced by [`FakeTransport`].
#[derive(Debug)]
pub struct FakeConnection {
    inner: Arc<Shared>,
}

#[async_trait]
impl LockConnection for FakeConnection {
    fn is_connected(&self) -> bool {
        self.inner.link_up.load(Ordering::SeqCst)
    }

    async fn write(&self, characteristic: Uuid, payload: &[u8]) -> Result<(), TransportError> {
        if self.inner.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(TransportError::Ble { reason: "injected write failure".to_string() });
        }
        lock(&self.inner.writes).push((characteristic, payload.to_vec()));
        Ok(())
    }

    async fn subscribe(
        &self,
        _characteristic: Uuid,
    ) -> Result<mpsc::Receiver<Vec<u8>>, TransportError> {
        let (tx, rx) = mpsc::channel(16);
        *lock(&self.inner.notify_tx) = Some(tx);
        Ok(rx)
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.inner.link_up.store(false, Ordering::SeqCst);
        // Dropping the sender closes the subscription channel.
        *lock(&self.inner.notify_tx) = None;
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
