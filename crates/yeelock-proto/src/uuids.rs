//! GATT characteristic identifiers for the Yeelock service.
//!
//! Configuration constants, not protocol logic: two fixed characteristics
//! carry the whole protocol (one-way command writes, one-way notification
//! delivery), plus the standard Battery Service level characteristic the
//! device also exposes.

use uuid::Uuid;

/// Outbound command frames are written here.
pub const COMMAND_CHARACTERISTIC: Uuid = Uuid::from_u128(0x58af_3dca_6fc0_4fa3_9464_7466_2f04_3a3b);

/// Inbound status notifications arrive here.
pub const NOTIFY_CHARACTERISTIC: Uuid = Uuid::from_u128(0x58af_3dca_6fc0_4fa3_9464_7466_2f04_3a3a);

/// Standard Battery Service battery level (read-only percentage).
pub const BATTERY_LEVEL_CHARACTERISTIC: Uuid =
    Uuid::from_u128(0x0000_2a19_0000_1000_8000_0080_5f9b_34fb);
