//! Display mode derivation from adapter and device-list state

/// What the device list currently presents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Adapter powered, at least one known device
    Connection,
    /// Adapter reports powered-off; a single synthetic "enable adapter" row is shown
    BluetoothDisabled,
    /// Adapter powered but no known devices
    EmptyList,
}

/// Derive the display mode from adapter power state and device count.
///
/// Adapter-off wins over an empty list: an empty list is usually a
/// consequence of the adapter being off, so the user is steered towards
/// enabling the adapter first.
pub fn resolve_mode(adapter_powered: bool, device_count: usize) -> DisplayMode {
    if !adapter_powered {
        DisplayMode::BluetoothDisabled
    } else if device_count == 0 {
        DisplayMode::EmptyList
    } else {
        DisplayMode::Connection
    }
}
