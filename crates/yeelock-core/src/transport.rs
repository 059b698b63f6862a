//! Transport abstraction over an external BLE stack.
//!
//! This crate deliberately implements no BLE: the host supplies something
//! that can resolve an address to a connectable peripheral and speak GATT.
//! Production would back this with a real stack (btleplug, a platform
//! bluetooth proxy); tests use an instrumented in-memory fake.
//!
//! The shape mirrors GATT itself: a [`Transport`] resolves and connects,
//! a [`LockConnection`] exposes characteristic writes, a notification
//! subscription, and disconnect.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::identity::DeviceAddress;

/// Errors from the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The address does not resolve to a connectable peripheral.
    ///
    /// Fatal for the current call; the device may simply be out of radio
    /// range, so callers may retry later.
    #[error("no connectable device at {address}")]
    DeviceNotFound {
        /// Address that failed to resolve.
        address: DeviceAddress,
    },

    /// A connect or write failed at the BLE layer.
    #[error("BLE transport error: {reason}")]
    Ble {
        /// Description from the underlying stack.
        reason: String,
    },

    /// The peripheral does not expose an expected characteristic.
    #[error("characteristic {uuid} not found on device")]
    CharacteristicMissing {
        /// The characteristic that was looked up.
        uuid: Uuid,
    },
}

/// Resolves addresses and opens connections to BLE peripherals.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Live connection type produced by this transport.
    type Connection: LockConnection;

    /// Resolve `address` to a connectable peripheral and connect to it.
    ///
    /// Waits for the connect handshake to complete. This is the only
    /// operation in the driver with meaningful suspension, and the session
    /// layer guarantees it is never run twice concurrently for one device.
    async fn connect(&self, address: &DeviceAddress) -> Result<Self::Connection, TransportError>;
}

/// A live GATT connection to a lock.
#[async_trait]
pub trait LockConnection: Send + Sync + 'static {
    /// Last known transport-layer health of this handle.
    fn is_connected(&self) -> bool;

    /// Write `payload` to the given characteristic.
    async fn write(&self, characteristic: Uuid, payload: &[u8]) -> Result<(), TransportError>;

    /// Subscribe to notifications on the given characteristic.
    ///
    /// Notification payloads are delivered through the returned channel in
    /// arrival order. Dropping the receiver ends delivery.
    async fn subscribe(
        &self,
        characteristic: Uuid,
    ) -> Result<mpsc::Receiver<Vec<u8>>, TransportError>;

    /// Close the connection. Idempotent.
    async fn disconnect(&self) -> Result<(), TransportError>;
}
