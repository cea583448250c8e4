//! Device snapshot types shared between the registry and the controller

use chrono::{DateTime, Utc};
use std::fmt;

/// Transport address of a known peripheral (e.g. "AA:BB:CC:DD:EE:FF")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a device identifier from its transport address
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(addr: &str) -> Self {
        Self(addr.to_string())
    }
}

/// Read snapshot of one known peripheral.
///
/// Owned by the registry; the controller only holds the list returned by the
/// most recent query.
#[derive(Debug, Clone)]
pub struct DeviceSummary {
    pub id: DeviceId,
    /// Display name (alias preferred over the baked-in name)
    pub name: String,
    /// Last time the device was seen, when the registry can provide it
    pub last_seen: Option<DateTime<Utc>>,
    pub connected: bool,
}

/// The single connection-change request currently outstanding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlightOperation {
    pub id: DeviceId,
    /// Desired connection state: true = connect, false = disconnect
    pub desired: bool,
}
