//! Bluetooth backend error types

use crate::core::device::DeviceId;
use thiserror::Error;

/// Errors from the BlueZ registry backend
#[derive(Debug, Error)]
pub enum RegistryError {
    /// D-Bus transport or BlueZ method failure
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    /// No usable adapter object on the bus
    #[error("no Bluetooth adapter found")]
    NoAdapter,

    /// The addressed device is not known to BlueZ
    #[error("unknown device {0}")]
    UnknownDevice(DeviceId),

    /// Query did not complete within the configured timeout
    #[error("D-Bus request timed out")]
    Timeout,
}

impl From<zbus::fdo::Error> for RegistryError {
    fn from(err: zbus::fdo::Error) -> Self {
        RegistryError::Dbus(zbus::Error::from(err))
    }
}
