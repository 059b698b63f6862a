//! Notification status decoding.

/// Device status carried in the first byte of a notification.
///
/// Only the first byte of a notification is semantically meaningful; the
/// rest of the payload is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Bolt is withdrawing (0x02).
    Unlocking,
    /// Bolt fully withdrawn (0x03).
    Unlocked,
    /// Bolt is throwing (0x04).
    Locking,
    /// Bolt fully thrown (0x05).
    Locked,
    /// Device rejected the frame because its clock is out of sync (0x09).
    /// Recoverable: push a time sync and replay the command.
    ClockDesync,
    /// Device rejected the signature (0xFF). Replaying cannot succeed.
    KeyRejected,
    /// Anything else, including an empty payload.
    Unknown,
}

/// Decode a notification payload into a [`Status`].
///
/// Never fails: the peripheral must not be able to put the coordinator into
/// an unhandled error state, so unrecognized and empty input both map to
/// [`Status::Unknown`].
pub fn decode_notification(payload: &[u8]) -> Status {
    match payload.first().copied() {
        Some(0x02) => Status::Unlocking,
        Some(0x03) => Status::Unlocked,
        Some(0x04) => Status::Locking,
        Some(0x05) => Status::Locked,
        Some(0x09) => Status::ClockDesync,
        Some(0xFF) => Status::KeyRejected,
        _ => Status::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_status_bytes() {
        assert_eq!(decode_notification(&[0x02]), Status::Unlocking);
        assert_eq!(decode_notification(&[0x03]), Status::Unlocked);
        assert_eq!(decode_notification(&[0x04]), Status::Locking);
        assert_eq!(decode_notification(&[0x05]), Status::Locked);
        assert_eq!(decode_notification(&[0x09]), Status::ClockDesync);
        assert_eq!(decode_notification(&[0xFF]), Status::KeyRejected);
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        assert_eq!(decode_notification(&[0x05, 0xDE, 0xAD]), Status::Locked);
    }

    #[test]
    fn empty_payload_is_unknown() {
        assert_eq!(decode_notification(&[]), Status::Unknown);
    }

    #[test]
    fn unrecognized_byte_is_unknown() {
        assert_eq!(decode_notification(&[0x42]), Status::Unknown);
    }
}
