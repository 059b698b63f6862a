//! Core abstractions for the Yeelock BLE driver.
//!
//! This crate holds everything with real protocol behavior that is not the
//! wire codec itself:
//!
//! - [`env::Environment`]: injectable time, so frame timestamps and command
//!   timeouts are deterministic under test
//! - [`transport`]: the boundary to an externally supplied BLE stack
//!   (connect / write / subscribe / disconnect over GATT)
//! - [`identity`]: immutable per-device configuration
//! - [`machine`]: the notification-driven lock state machine, including the
//!   time-sync-and-replay recovery protocol
//!
//! The state machine is pure and action-based: it performs no I/O, takes
//! time as a parameter, and returns actions for a driver to execute. The
//! driver lives in `yeelock-client`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod env;
pub mod identity;
pub mod machine;
pub mod transport;

pub use env::Environment;
pub use identity::{DeviceAddress, DeviceIdentity};
pub use machine::{LockMachine, LockState, MachineAction, MachineConfig};
pub use transport::{LockConnection, Transport, TransportError};
