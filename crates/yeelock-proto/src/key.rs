//! Shared signing key for command authentication.

use std::fmt;

use crate::errors::ProtocolError;

/// Length of a Yeelock signing key in bytes.
///
/// The vendor cloud hands out 32 hex characters per device.
pub const KEY_LEN: usize = 16;

/// The per-device shared secret used to sign command frames.
///
/// Constructed once at configuration time and never mutated. Both
/// constructors validate length up front so encoding can assume a
/// well-formed key.
///
/// # Security
///
/// The `Debug` impl redacts the key material to prevent accidental logging
/// of credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey([u8; KEY_LEN]);

impl SigningKey {
    /// Create a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidKey`] if `bytes` is not exactly
    /// [`KEY_LEN`] bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let raw: [u8; KEY_LEN] = bytes.try_into().map_err(|_| ProtocolError::InvalidKey {
            reason: format!("expected {KEY_LEN} bytes, got {}", bytes.len()),
        })?;
        Ok(Self(raw))
    }

    /// Create a key from the hex string delivered by the vendor cloud.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidKey`] if the string is not valid hex
    /// or decodes to the wrong length.
    pub fn from_hex(hex_key: &str) -> Result<Self, ProtocolError> {
        let bytes = hex::decode(hex_key)
            .map_err(|e| ProtocolError::InvalidKey { reason: format!("invalid hex: {e}") })?;
        Self::from_bytes(&bytes)
    }

    /// Raw key bytes, for signing only.
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey(<redacted {KEY_LEN} bytes>)")
    }
}
