//! Yeelock device client.
//!
//! Composes the codec, the session layer, and the lock state machine into
//! the four operations a host exposes for a lock: [`YeelockDevice::lock`],
//! [`YeelockDevice::unlock`], [`YeelockDevice::quick_unlock`], and
//! [`YeelockDevice::time_sync`].
//!
//! # Architecture
//!
//! The device facade is the driver for the pure state machine in
//! `yeelock-core`: it applies optimistic transitions, encodes frames with a
//! fresh timestamp, writes them through the session layer, and executes the
//! actions the machine returns when notifications arrive, including the
//! time-sync-and-replay recovery commands.
//!
//! State reaches observers through a `watch` channel
//! ([`YeelockDevice::state_changes`]); no component assumes a single
//! hardcoded observer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod device;
mod error;
mod system_env;

pub use device::YeelockDevice;
pub use error::DeviceError;
pub use system_env::SystemEnv;
pub use yeelock_core::{
    DeviceAddress, DeviceIdentity, Environment, LockConnection, LockState, MachineConfig,
    Transport, TransportError,
};
pub use yeelock_proto::{ProtocolError, SigningKey};
