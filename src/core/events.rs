//! Application event definitions
//!
//! All mutation of controller state happens on the thread that drains this
//! channel; every other context (D-Bus completions, the signal watcher, the
//! input reader) communicates by sending events into it.

use super::device::DeviceId;
use super::rows::RowIndex;
use tokio::sync::mpsc;

/// Sender half of the application event channel
pub type EventSender = mpsc::UnboundedSender<AppEvent>;

/// Receiver half of the application event channel
pub type EventReceiver = mpsc::UnboundedReceiver<AppEvent>;

/// Create the application event channel
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Connection-state change that did not originate from this controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalEvent {
    Connected,
    Disconnected,
}

/// Application-wide events feeding the controller
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Row selection change from the presentation layer
    SelectRow(RowIndex),

    /// Activation of the current selection (double-click or Enter)
    Activate,

    /// Raw key press forwarded from the presentation layer
    KeyPressed(u16),

    /// Close request (Escape or window control)
    CloseRequested,

    /// Re-query the registry and redraw
    Refresh,

    /// Connect/disconnect observed outside the controller
    Device(ExternalEvent),

    /// Completion of an issued connection-change request
    OperationFinished {
        id: DeviceId,
        desired: bool,
        success: bool,
    },
}
