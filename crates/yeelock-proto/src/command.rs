//! Command frame encoding.

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::{errors::ProtocolError, key::SigningKey};

/// Every command frame is exactly this long on the wire.
pub const FRAME_LEN: usize = 20;

type HmacSha1 = Hmac<Sha1>;

/// A command the host can issue to the lock.
///
/// The wire layout differences between variants (opcode, identification
/// mode, presence of a mode byte, and the 13-vs-14-byte signature split)
/// are firmware facts and live here as per-variant constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Throw the bolt.
    Lock,
    /// Withdraw the bolt.
    Unlock,
    /// Withdraw the bolt; the device relocks itself shortly after.
    QuickUnlock,
    /// Push the host's wall clock to the device.
    TimeSync,
}

impl Command {
    /// First wire byte.
    pub const fn opcode(self) -> u8 {
        match self {
            Self::Lock | Self::Unlock | Self::QuickUnlock => 0x01,
            Self::TimeSync => 0x08,
        }
    }

    /// Second wire byte, the admin identification mode.
    pub const fn identification_mode(self) -> u8 {
        match self {
            Self::Lock | Self::Unlock | Self::QuickUnlock => 0x50,
            Self::TimeSync => 0x40,
        }
    }

    /// Mode byte following the timestamp, absent for time sync.
    pub const fn mode_byte(self) -> Option<u8> {
        match self {
            Self::Lock => Some(0x02),
            Self::Unlock => Some(0x01),
            Self::QuickUnlock => Some(0x00),
            Self::TimeSync => None,
        }
    }

    /// How many leading bytes of the frame are covered by the signature.
    pub const fn signed_prefix_len(self) -> usize {
        match self {
            Self::Lock | Self::Unlock | Self::QuickUnlock => 7,
            Self::TimeSync => 6,
        }
    }

    /// How many bytes of the HMAC-SHA1 tag are appended.
    pub const fn signature_len(self) -> usize {
        FRAME_LEN - self.signed_prefix_len()
    }

    /// Build the signed 20-byte frame for this command.
    ///
    /// `unix_time` is epoch seconds at encode time; only the low 32 bits go
    /// on the wire. Frames are produced fresh per call and never cached;
    /// the timestamp is the firmware's replay defence.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidKey`] if the key is rejected by the
    /// signature algorithm. With a validated [`SigningKey`] this cannot
    /// happen in practice.
    pub fn encode(self, key: &SigningKey, unix_time: u64) -> Result<[u8; FRAME_LEN], ProtocolError> {
        let mut frame = [0u8; FRAME_LEN];
        frame[0] = self.opcode();
        frame[1] = self.identification_mode();
        frame[2..6].copy_from_slice(&wire_timestamp(unix_time).to_be_bytes());
        if let Some(mode) = self.mode_byte() {
            frame[6] = mode;
        }

        let prefix_len = self.signed_prefix_len();
        let tag = hmac_sha1(key.as_bytes(), &frame[..prefix_len])?;
        frame[prefix_len..].copy_from_slice(&tag[..self.signature_len()]);
        Ok(frame)
    }
}

/// Truncate epoch seconds to the 4-byte wire timestamp.
const fn wire_timestamp(unix_time: u64) -> u32 {
    (unix_time & u32::MAX as u64) as u32
}

/// Full (untruncated) HMAC-SHA1 tag over `message`.
fn hmac_sha1(key: &[u8], message: &[u8]) -> Result<[u8; 20], ProtocolError> {
    let mut mac = HmacSha1::new_from_slice(key)
        .map_err(|e| ProtocolError::InvalidKey { reason: e.to_string() })?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().into())
}
