//! UI module - presentation seam and the plain console front end

mod console;
mod format;
pub mod keys;

pub use console::ConsoleView;
pub use format::ago;

use crate::core::device::{DeviceId, DeviceSummary};
use crate::core::mode::DisplayMode;
use crate::core::rows::RowIndex;

/// Rendering surface consumed by the controller.
///
/// All methods are called from the thread that owns the controller;
/// implementations that render elsewhere marshal internally.
pub trait PresentationSink {
    /// Redraw with the given mode, device snapshot, and selection
    fn refreshed(&self, mode: DisplayMode, devices: &[DeviceSummary], selection: Option<RowIndex>);

    /// Show a per-row progress indicator for the device
    fn operation_started(&self, id: &DeviceId);

    /// Clear the per-row progress indicator
    fn operation_finished(&self, id: &DeviceId);

    /// Close the owning window or view
    fn close_requested(&self);
}
