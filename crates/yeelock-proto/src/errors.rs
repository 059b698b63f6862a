//! Protocol error types.

use thiserror::Error;

/// Errors from codec operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The signing key is not well-formed key material.
    ///
    /// This is a configuration-time failure: a device configured with a bad
    /// key can never produce a frame the firmware accepts, so callers should
    /// abort configuration rather than retry.
    #[error("invalid signing key: {reason}")]
    InvalidKey {
        /// Description of what is wrong with the key.
        reason: String,
    },
}
