//! The connection-state controller
//!
//! Owns the current display mode, the row selection, and the single
//! in-flight connect/disconnect operation. All mutation happens on the
//! thread that drains the event channel; asynchronous completions are
//! marshalled back through that channel, so the controller never sees
//! concurrent access.

use tracing::{debug, info, warn};

use super::device::{DeviceId, DeviceSummary, InFlightOperation};
use super::events::{AppEvent, EventSender, ExternalEvent};
use super::mode::{resolve_mode, DisplayMode};
use super::registry::DeviceRegistry;
use super::rows::{clamp_selection, device_index, effective_row_count, RowIndex};
use crate::notify::NotificationSink;
use crate::ui::keys::{key_action, KeyAction};
use crate::ui::PresentationSink;

/// Stateful core orchestrating refreshes and connection toggles
pub struct ConnectionController<R, P, N> {
    registry: R,
    presentation: P,
    notifier: N,
    /// Used to marshal completion callbacks back onto the owning thread
    event_tx: EventSender,
    mode: DisplayMode,
    devices: Vec<DeviceSummary>,
    selection: Option<RowIndex>,
    in_flight: Option<InFlightOperation>,
}

impl<R, P, N> ConnectionController<R, P, N>
where
    R: DeviceRegistry,
    P: PresentationSink,
    N: NotificationSink,
{
    /// Create a controller with its collaborators.
    ///
    /// The first row starts out selected so that Enter acts immediately once
    /// the initial refresh has run; an empty row set clears it again.
    pub fn new(registry: R, presentation: P, notifier: N, event_tx: EventSender) -> Self {
        Self {
            registry,
            presentation,
            notifier,
            event_tx,
            mode: DisplayMode::EmptyList,
            devices: Vec::new(),
            selection: Some(RowIndex(0)),
            in_flight: None,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn selection(&self) -> Option<RowIndex> {
        self.selection
    }

    pub fn devices(&self) -> &[DeviceSummary] {
        &self.devices
    }

    pub fn in_flight(&self) -> Option<&InFlightOperation> {
        self.in_flight.as_ref()
    }

    /// Single entry point for the owning event loop
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SelectRow(row) => {
                self.select_row(row);
            }
            AppEvent::Activate => self.activate_selection(),
            AppEvent::KeyPressed(keycode) => self.handle_key(keycode),
            AppEvent::CloseRequested => self.close_requested(),
            AppEvent::Refresh => self.refresh(),
            AppEvent::Device(event) => self.handle_external_event(event),
            AppEvent::OperationFinished {
                id,
                desired,
                success,
            } => self.finish_operation(id, desired, success),
        }
    }

    /// Dispatch a raw key code from the presentation layer
    pub fn handle_key(&mut self, keycode: u16) {
        match key_action(keycode) {
            Some(KeyAction::Activate) => self.activate_selection(),
            Some(KeyAction::Close) => self.close_requested(),
            None => {}
        }
    }

    /// Re-query the registry, recompute the display mode, re-validate the
    /// selection, and redraw.
    ///
    /// A registry failure degrades to "adapter off, no devices" instead of
    /// surfacing an error.
    pub fn refresh(&mut self) {
        let (powered, devices) = match self.query_registry() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!("Registry query failed, treating adapter as off: {:#}", e);
                (false, Vec::new())
            }
        };

        self.devices = devices;
        self.mode = resolve_mode(powered, self.devices.len());

        let rows = effective_row_count(self.mode, self.devices.len());
        self.selection = clamp_selection(self.selection, rows);
        if self.mode == DisplayMode::BluetoothDisabled {
            // The synthetic adapter row is the only actionable row
            self.selection = Some(RowIndex(0));
        }

        self.presentation
            .refreshed(self.mode, &self.devices, self.selection);
    }

    fn query_registry(&self) -> anyhow::Result<(bool, Vec<DeviceSummary>)> {
        let powered = self.registry.adapter_powered()?;
        let devices = self.registry.devices()?;
        Ok((powered, devices))
    }

    /// Update the selection if the row is selectable in the current mode.
    ///
    /// In `BluetoothDisabled` mode the effective row set contains only the
    /// adapter row, so any other index is rejected and the selection stays
    /// unchanged. Returns whether the request was accepted.
    pub fn select_row(&mut self, row: RowIndex) -> bool {
        if row.0 >= effective_row_count(self.mode, self.devices.len()) {
            return false;
        }
        self.selection = Some(row);
        true
    }

    /// Toggle the connection state of the selected row.
    ///
    /// On the adapter row this powers the adapter on; on a device row it
    /// issues a connect or disconnect request. Repeated activation while a
    /// request is outstanding issues no second request.
    pub fn activate_selection(&mut self) {
        let Some(row) = self.selection else {
            return;
        };

        if self.mode == DisplayMode::BluetoothDisabled {
            if row == RowIndex(0) {
                info!("Enabling Bluetooth adapter");
                self.registry.set_adapter_powered(true);
                self.refresh();
            }
            return;
        }

        let Some(idx) = device_index(self.mode, row) else {
            // EmptyList has no device rows
            return;
        };
        let Some(device) = self.devices.get(idx.0).cloned() else {
            return;
        };

        // The adapter-power action above is exempt from this rule; device
        // toggles are serialized to at most one outstanding request.
        if let Some(op) = &self.in_flight {
            if op.id == device.id {
                debug!("Ignoring repeated activation for {}", device.id);
            } else {
                debug!(
                    "Request for {} still outstanding, ignoring activation for {}",
                    op.id, device.id
                );
            }
            return;
        }

        let desired = !device.connected;
        self.in_flight = Some(InFlightOperation {
            id: device.id.clone(),
            desired,
        });
        info!(
            "{} {}",
            if desired { "Connecting" } else { "Disconnecting" },
            device.name
        );

        self.notifier.connection_attempt(&device.name, desired);
        self.presentation.operation_started(&device.id);

        let tx = self.event_tx.clone();
        let id = device.id.clone();
        self.registry.request_connection_change(
            device.id,
            desired,
            Box::new(move |success| {
                // If the owner is already gone the send fails silently and
                // the completion becomes a no-op.
                let _ = tx.send(AppEvent::OperationFinished { id, desired, success });
            }),
        );
    }

    /// Completion of a connection-change request, marshalled back from the
    /// registry's execution context.
    ///
    /// A successful connect dismisses the modal once the new state has been
    /// redrawn; failures and disconnects keep it open.
    fn finish_operation(&mut self, id: DeviceId, desired: bool, success: bool) {
        if self.in_flight.take().is_none() {
            warn!("Completion for {} with no request outstanding", id);
        }
        debug!(
            "{} {} {}",
            if desired { "Connect" } else { "Disconnect" },
            id,
            if success { "succeeded" } else { "failed" }
        );

        self.presentation.operation_finished(&id);
        self.refresh();

        if success && desired {
            self.presentation.close_requested();
        }
    }

    /// A connect or disconnect happened outside this controller.
    ///
    /// The in-flight bookkeeping is untouched; the completion of any request
    /// we issued still decides its own outcome.
    pub fn handle_external_event(&mut self, event: ExternalEvent) {
        debug!("External device event: {:?}", event);
        self.refresh();
    }

    /// Escape or window-close input. Outstanding requests are left to
    /// complete on their own.
    pub fn close_requested(&self) {
        self.presentation.close_requested();
    }
}
