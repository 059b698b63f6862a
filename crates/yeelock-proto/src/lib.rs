//! Wire format for the Yeelock BLE command protocol.
//!
//! Every command frame is exactly 20 bytes: a short literal prefix (opcode,
//! identification mode, big-endian epoch timestamp, and for unlock-family
//! commands a mode byte) followed by a truncated HMAC-SHA1 signature over
//! that prefix. The split between prefix and signature differs per command
//! kind (7+13 bytes for unlock-family, 6+14 for time sync), a firmware
//! quirk, not a derivable rule, so it is encoded as per-variant constants
//! on [`Command`].
//!
//! All functions in this crate are pure: no I/O, no clock. The timestamp is
//! supplied by the caller, which keeps encoding deterministic under test.
//!
//! # Security
//!
//! The signature proves the frame originates from a holder of the shared
//! signing key; it is truncated, not encrypted, and the timestamp is the
//! only replay defence the firmware applies. [`SigningKey`] redacts its
//! bytes from `Debug` output so keys never leak into logs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod command;
pub mod errors;
pub mod key;
pub mod status;
pub mod uuids;

pub use command::{Command, FRAME_LEN};
pub use errors::ProtocolError;
pub use key::{KEY_LEN, SigningKey};
pub use status::{Status, decode_notification};
pub use uuids::{BATTERY_LEVEL_CHARACTERISTIC, COMMAND_CHARACTERISTIC, NOTIFY_CHARACTERISTIC};
