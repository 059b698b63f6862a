//! Device error types.

use thiserror::Error;
use yeelock_core::TransportError;
use yeelock_proto::ProtocolError;

/// Errors from device facade operations.
///
/// Per-command write failures never appear here: they are contained in the
/// session layer and expressed as connection state plus a log record, so a
/// failed lock/unlock cannot crash the caller. What does surface is
/// connect-phase trouble (the caller may retry later) and configuration
/// problems (the caller should abort configuration).
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Connecting or subscribing failed at the transport boundary.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The signing key is unusable.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl DeviceError {
    /// Returns true if this error is fatal (unrecoverable by retrying).
    ///
    /// A malformed signing key can never start working; it should abort
    /// configuration. Transport failures are transient; the lock may just
    /// be out of radio range.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Protocol(ProtocolError::InvalidKey { .. }) => true,
            Self::Transport(_) => false,
        }
    }
}
