//! Notify module - user-facing connection notifications

use tracing::{debug, warn};

/// Notification summary line
const SUMMARY: &str = "Bluetooth Connection";

/// Delivers a user-visible message when a connection attempt begins.
///
/// Fired once per user-initiated toggle; adapter power changes and
/// externally observed events produce no notification.
pub trait NotificationSink {
    /// Announce a toggle for the named device; `connecting` distinguishes
    /// connect from disconnect attempts.
    fn connection_attempt(&self, device_name: &str, connecting: bool);
}

/// Body text for a connection attempt
pub fn connection_message(device_name: &str, connecting: bool) -> String {
    let state = if connecting {
        "Connecting"
    } else {
        "Disconnecting"
    };
    let name = if device_name.is_empty() {
        "a bluetooth device"
    } else {
        device_name
    };
    format!("{state} {name}")
}

/// Desktop notifications via the session notification service
pub struct DesktopNotifier {
    enabled: bool,
}

impl DesktopNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl NotificationSink for DesktopNotifier {
    fn connection_attempt(&self, device_name: &str, connecting: bool) {
        if !self.enabled {
            return;
        }

        let body = connection_message(device_name, connecting);
        debug!("Showing notification: {}", body);
        if let Err(e) = notify_rust::Notification::new()
            .summary(SUMMARY)
            .body(&body)
            .show()
        {
            warn!("Failed to show notification: {}", e);
        }
    }
}

/// Silent sink for embedders that surface progress themselves
pub struct NullNotifier;

impl NotificationSink for NullNotifier {
    fn connection_attempt(&self, _device_name: &str, _connecting: bool) {}
}
