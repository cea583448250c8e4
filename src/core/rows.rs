//! Row indexing for the effective row set
//!
//! The presentation index and the device-list index are distinct types: in
//! `BluetoothDisabled` mode the single visible row is a synthetic "enable
//! adapter" row that maps to no device, so conflating the two invites
//! off-by-one lookups.

use super::mode::DisplayMode;

/// Index into the effective (visible and selectable) row set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowIndex(pub usize);

/// Index into the device list returned by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIndex(pub usize);

/// Number of selectable rows for the given mode
pub fn effective_row_count(mode: DisplayMode, device_count: usize) -> usize {
    match mode {
        DisplayMode::BluetoothDisabled => 1,
        DisplayMode::EmptyList => 0,
        DisplayMode::Connection => device_count,
    }
}

/// Map a presentation row to a device-list index, if the row is a device row
pub fn device_index(mode: DisplayMode, row: RowIndex) -> Option<DeviceIndex> {
    match mode {
        DisplayMode::Connection => Some(DeviceIndex(row.0)),
        DisplayMode::BluetoothDisabled | DisplayMode::EmptyList => None,
    }
}

/// Re-validate a selection against a new effective row count.
///
/// Out-of-range selections clamp to the first row; an empty row set clears
/// the selection.
pub fn clamp_selection(selection: Option<RowIndex>, row_count: usize) -> Option<RowIndex> {
    match selection {
        _ if row_count == 0 => None,
        None => None,
        Some(row) if row.0 < row_count => Some(row),
        Some(_) => Some(RowIndex(0)),
    }
}
