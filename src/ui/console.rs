//! Plain stdout presentation for the device list
//!
//! Demo surface for the binary: renders the effective row set as a numbered
//! table and exposes the close request as a flag the event loop polls. Any
//! richer front end replaces this by implementing `PresentationSink`.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use super::{ago, PresentationSink};
use crate::core::device::{DeviceId, DeviceSummary};
use crate::core::mode::DisplayMode;
use crate::core::rows::RowIndex;

pub struct ConsoleView {
    /// Device currently showing a progress indicator
    working: Mutex<Option<DeviceId>>,
    /// Set once close has been requested; polled by the event loop
    closed: Arc<AtomicBool>,
}

impl ConsoleView {
    pub fn new(closed: Arc<AtomicBool>) -> Self {
        Self {
            working: Mutex::new(None),
            closed,
        }
    }

    fn render(
        &self,
        mode: DisplayMode,
        devices: &[DeviceSummary],
        selection: Option<RowIndex>,
    ) -> String {
        let mut lines = Vec::new();

        match mode {
            DisplayMode::BluetoothDisabled => {
                lines.push("Bluetooth is off.".to_string());
                let marker = if selection == Some(RowIndex(0)) { '>' } else { ' ' };
                lines.push(format!("{marker} 1. [ Enable Bluetooth ]"));
            }
            DisplayMode::EmptyList => {
                lines.push("No paired devices.".to_string());
            }
            DisplayMode::Connection => {
                let working = self.working.lock().clone();
                let now = Utc::now();
                for (i, device) in devices.iter().enumerate() {
                    let marker = if selection == Some(RowIndex(i)) { '>' } else { ' ' };
                    let state = if working.as_ref() == Some(&device.id) {
                        '…'
                    } else if device.connected {
                        '●'
                    } else {
                        '○'
                    };
                    let seen = device
                        .last_seen
                        .map(|when| format!("  ({})", ago(when, now)))
                        .unwrap_or_default();
                    lines.push(format!("{marker} {}. {state} {}{seen}", i + 1, device.name));
                }
            }
        }

        lines.join("\n")
    }
}

impl PresentationSink for ConsoleView {
    fn refreshed(
        &self,
        mode: DisplayMode,
        devices: &[DeviceSummary],
        selection: Option<RowIndex>,
    ) {
        let table = self.render(mode, devices, selection);
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "\n{table}");
    }

    fn operation_started(&self, id: &DeviceId) {
        *self.working.lock() = Some(id.clone());
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "  working on {id}…");
    }

    fn operation_finished(&self, id: &DeviceId) {
        let mut working = self.working.lock();
        if working.as_ref() == Some(id) {
            *working = None;
        }
    }

    fn close_requested(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
