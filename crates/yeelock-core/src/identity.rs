//! Immutable per-device configuration.

use std::fmt;

use yeelock_proto::SigningKey;

/// MAC-style network address of a lock.
///
/// Opaque to this crate beyond display and comparison; the transport is
/// responsible for resolving it to a peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceAddress(String);

impl DeviceAddress {
    /// Wrap an address string as reported by the configuration layer.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the configuration collaborator knows about one lock.
///
/// Created at configuration time, never mutated. Owned by the device facade
/// and shared with every component that needs to address or sign for this
/// specific lock.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    /// Network address used for connection.
    pub address: DeviceAddress,
    /// Display name for logging and the entity layer.
    pub name: String,
    /// Model string.
    pub model: String,
    /// Manufacturer string.
    pub manufacturer: String,
    /// Shared secret used to sign every command frame.
    pub key: SigningKey,
}

impl DeviceIdentity {
    /// Build an identity with the stock model and manufacturer strings.
    pub fn new(address: DeviceAddress, name: impl Into<String>, key: SigningKey) -> Self {
        Self {
            address,
            name: name.into(),
            model: "Yeelock".to_string(),
            manufacturer: "Xiaomi".to_string(),
            key,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn identity_defaults() {
        let key = SigningKey::from_bytes(&[0x42; 16]).unwrap();
        let identity =
            DeviceIdentity::new(DeviceAddress::new("F8:24:41:C5:98:8B"), "Front door", key);
        assert_eq!(identity.model, "Yeelock");
        assert_eq!(identity.manufacturer, "Xiaomi");
        assert_eq!(identity.address.as_str(), "F8:24:41:C5:98:8B");
    }

    #[test]
    fn identity_debug_does_not_leak_key() {
        let key = SigningKey::from_bytes(&[0x42; 16]).unwrap();
        let identity = DeviceIdentity::new(DeviceAddress::new("AA:BB"), "Door", key);
        assert!(format!("{identity:?}").contains("redacted"));
    }
}
