//! Controller scenario tests
//!
//! Drives the controller with recording collaborators and fires completions
//! through the real event channel, exercising the same marshalling path the
//! BlueZ backend uses.

use std::sync::{Arc, Mutex};

use blueswitch::core::controller::ConnectionController;
use blueswitch::core::device::{DeviceId, DeviceSummary};
use blueswitch::core::events::{self, AppEvent, EventReceiver, ExternalEvent};
use blueswitch::core::mode::DisplayMode;
use blueswitch::core::registry::{Completion, DeviceRegistry};
use blueswitch::core::rows::RowIndex;
use blueswitch::notify::NotificationSink;
use blueswitch::ui::keys::{KEY_ENTER, KEY_ESCAPE, KEY_RETURN};
use blueswitch::ui::PresentationSink;

#[derive(Default)]
struct RegistryState {
    powered: bool,
    devices: Vec<DeviceSummary>,
    requests: Vec<(DeviceId, bool)>,
    power_requests: Vec<bool>,
    completions: Vec<(DeviceId, bool, Completion)>,
}

/// Registry double that records requests and captures completion callbacks
/// so tests decide when and how each operation finishes.
#[derive(Clone, Default)]
struct MockRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl MockRegistry {
    fn set_powered(&self, powered: bool) {
        self.state.lock().unwrap().powered = powered;
    }

    fn set_devices(&self, devices: Vec<DeviceSummary>) {
        self.state.lock().unwrap().devices = devices;
    }

    fn mark_connected(&self, id: &DeviceId, connected: bool) {
        let mut state = self.state.lock().unwrap();
        for device in &mut state.devices {
            if &device.id == id {
                device.connected = connected;
            }
        }
    }

    fn requests(&self) -> Vec<(DeviceId, bool)> {
        self.state.lock().unwrap().requests.clone()
    }

    fn power_requests(&self) -> Vec<bool> {
        self.state.lock().unwrap().power_requests.clone()
    }

    fn take_completion(&self) -> (DeviceId, bool, Completion) {
        let mut state = self.state.lock().unwrap();
        assert!(!state.completions.is_empty(), "no completion captured");
        state.completions.remove(0)
    }
}

impl DeviceRegistry for MockRegistry {
    fn adapter_powered(&self) -> anyhow::Result<bool> {
        Ok(self.state.lock().unwrap().powered)
    }

    fn devices(&self) -> anyhow::Result<Vec<DeviceSummary>> {
        Ok(self.state.lock().unwrap().devices.clone())
    }

    fn set_adapter_powered(&self, powered: bool) {
        let mut state = self.state.lock().unwrap();
        state.power_requests.push(powered);
        state.powered = powered;
    }

    fn request_connection_change(&self, id: DeviceId, desired: bool, done: Completion) {
        let mut state = self.state.lock().unwrap();
        state.requests.push((id.clone(), desired));
        state.completions.push((id, desired, done));
    }
}

#[derive(Debug, PartialEq)]
enum ViewEvent {
    Refreshed {
        mode: DisplayMode,
        rows: usize,
        selection: Option<RowIndex>,
    },
    Started(DeviceId),
    Finished(DeviceId),
    CloseRequested,
}

#[derive(Clone, Default)]
struct MockView {
    events: Arc<Mutex<Vec<ViewEvent>>>,
}

impl MockView {
    fn take(&self) -> Vec<ViewEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    fn refresh_count(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, ViewEvent::Refreshed { .. }))
            .count()
    }

    fn close_count(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, ViewEvent::CloseRequested))
            .count()
    }
}

impl PresentationSink for MockView {
    fn refreshed(
        &self,
        mode: DisplayMode,
        devices: &[DeviceSummary],
        selection: Option<RowIndex>,
    ) {
        self.events.lock().unwrap().push(ViewEvent::Refreshed {
            mode,
            rows: devices.len(),
            selection,
        });
    }

    fn operation_started(&self, id: &DeviceId) {
        self.events.lock().unwrap().push(ViewEvent::Started(id.clone()));
    }

    fn operation_finished(&self, id: &DeviceId) {
        self.events.lock().unwrap().push(ViewEvent::Finished(id.clone()));
    }

    fn close_requested(&self) {
        self.events.lock().unwrap().push(ViewEvent::CloseRequested);
    }
}

#[derive(Clone, Default)]
struct MockNotifier {
    attempts: Arc<Mutex<Vec<(String, bool)>>>,
}

impl MockNotifier {
    fn attempts(&self) -> Vec<(String, bool)> {
        self.attempts.lock().unwrap().clone()
    }
}

impl NotificationSink for MockNotifier {
    fn connection_attempt(&self, device_name: &str, connecting: bool) {
        self.attempts
            .lock()
            .unwrap()
            .push((device_name.to_string(), connecting));
    }
}

struct Harness {
    registry: MockRegistry,
    view: MockView,
    notifier: MockNotifier,
    rx: EventReceiver,
    controller: ConnectionController<MockRegistry, MockView, MockNotifier>,
}

fn harness() -> Harness {
    let (tx, rx) = events::channel();
    let registry = MockRegistry::default();
    let view = MockView::default();
    let notifier = MockNotifier::default();
    let controller =
        ConnectionController::new(registry.clone(), view.clone(), notifier.clone(), tx);

    Harness {
        registry,
        view,
        notifier,
        rx,
        controller,
    }
}

impl Harness {
    /// Fire the oldest captured completion and pump the marshalled event
    fn complete(&mut self, success: bool) {
        let (_, _, done) = self.registry.take_completion();
        done(success);

        let event = self.rx.try_recv().expect("completion should produce an event");
        self.controller.handle_event(event);
    }
}

fn device(addr: &str, name: &str, connected: bool) -> DeviceSummary {
    DeviceSummary {
        id: DeviceId::from(addr),
        name: name.to_string(),
        last_seen: None,
        connected,
    }
}

#[test]
fn test_adapter_off_shows_adapter_row_only() {
    let mut h = harness();
    h.registry.set_powered(false);
    h.registry
        .set_devices(vec![device("aa", "Keyboard", false), device("bb", "Mouse", true)]);

    h.controller.refresh();

    assert_eq!(h.controller.mode(), DisplayMode::BluetoothDisabled);
    assert_eq!(h.controller.selection(), Some(RowIndex(0)));
    assert!(!h.controller.select_row(RowIndex(1)));
    assert!(h.controller.select_row(RowIndex(0)));
}

#[test]
fn test_empty_list_activation_is_a_no_op() {
    let mut h = harness();
    h.registry.set_powered(true);

    h.controller.refresh();

    assert_eq!(h.controller.mode(), DisplayMode::EmptyList);
    assert_eq!(h.controller.selection(), None);

    h.controller.handle_event(AppEvent::Activate);
    assert!(h.registry.requests().is_empty());
    assert!(h.notifier.attempts().is_empty());
}

#[test]
fn test_connect_success_closes_after_redraw() {
    let mut h = harness();
    h.registry.set_powered(true);
    h.registry.set_devices(vec![device("aa", "Headset", false)]);

    h.controller.refresh();
    h.controller.handle_event(AppEvent::SelectRow(RowIndex(0)));
    h.view.take();

    h.controller.handle_event(AppEvent::Activate);

    let op = h.controller.in_flight().expect("operation should be in flight");
    assert_eq!(op.id, DeviceId::from("aa"));
    assert!(op.desired);
    assert_eq!(h.requests_for("aa"), vec![true]);
    assert_eq!(h.notifier.attempts(), vec![("Headset".to_string(), true)]);

    // Registry reports the new state before the completion lands
    h.registry.mark_connected(&DeviceId::from("aa"), true);
    h.complete(true);

    assert!(h.controller.in_flight().is_none());
    let events = h.view.take();
    assert_eq!(
        events,
        vec![
            ViewEvent::Started(DeviceId::from("aa")),
            ViewEvent::Finished(DeviceId::from("aa")),
            ViewEvent::Refreshed {
                mode: DisplayMode::Connection,
                rows: 1,
                selection: Some(RowIndex(0)),
            },
            ViewEvent::CloseRequested,
        ]
    );
}

#[test]
fn test_connect_failure_keeps_window_open() {
    let mut h = harness();
    h.registry.set_powered(true);
    h.registry.set_devices(vec![device("aa", "Headset", false)]);

    h.controller.refresh();
    h.controller.handle_event(AppEvent::SelectRow(RowIndex(0)));
    h.controller.handle_event(AppEvent::Activate);
    h.view.take();

    h.complete(false);

    assert!(h.controller.in_flight().is_none());
    assert_eq!(h.view.refresh_count(), 1);
    assert_eq!(h.view.close_count(), 0);
}

#[test]
fn test_disconnect_success_keeps_window_open() {
    let mut h = harness();
    h.registry.set_powered(true);
    h.registry.set_devices(vec![device("aa", "Headset", true)]);

    h.controller.refresh();
    h.controller.handle_event(AppEvent::SelectRow(RowIndex(0)));
    h.controller.handle_event(AppEvent::Activate);

    assert_eq!(h.requests_for("aa"), vec![false]);

    h.registry.mark_connected(&DeviceId::from("aa"), false);
    h.view.take();
    h.complete(true);

    assert!(h.controller.in_flight().is_none());
    assert_eq!(h.view.close_count(), 0);
}

#[test]
fn test_repeated_activation_issues_one_request() {
    let mut h = harness();
    h.registry.set_powered(true);
    h.registry.set_devices(vec![device("aa", "Headset", false)]);

    h.controller.refresh();
    h.controller.handle_event(AppEvent::SelectRow(RowIndex(0)));
    h.controller.handle_event(AppEvent::Activate);
    h.controller.handle_event(AppEvent::Activate);

    assert_eq!(h.registry.requests().len(), 1);
    assert_eq!(h.notifier.attempts().len(), 1);
}

#[test]
fn test_external_event_refreshes_without_touching_in_flight() {
    let mut h = harness();
    h.registry.set_powered(true);
    h.registry.set_devices(vec![device("aa", "Headset", false)]);

    h.controller.refresh();
    h.controller.handle_event(AppEvent::SelectRow(RowIndex(0)));
    h.controller.handle_event(AppEvent::Activate);
    h.view.take();

    h.controller
        .handle_event(AppEvent::Device(ExternalEvent::Disconnected));

    assert_eq!(h.view.refresh_count(), 1);
    let op = h.controller.in_flight().expect("operation should survive");
    assert_eq!(op.id, DeviceId::from("aa"));
}

#[test]
fn test_external_events_produce_no_notifications() {
    let mut h = harness();
    h.registry.set_powered(true);
    h.registry.set_devices(vec![device("aa", "Headset", false)]);

    h.controller.refresh();
    h.controller
        .handle_event(AppEvent::Device(ExternalEvent::Connected));
    h.controller
        .handle_event(AppEvent::Device(ExternalEvent::Disconnected));

    assert!(h.notifier.attempts().is_empty());
}

#[test]
fn test_adapter_row_activation_notifies_nothing() {
    let mut h = harness();
    h.registry.set_powered(false);
    h.registry.set_devices(vec![device("aa", "Headset", false)]);

    h.controller.refresh();
    h.controller.handle_event(AppEvent::Activate);

    assert_eq!(h.registry.power_requests(), vec![true]);
    assert!(h.notifier.attempts().is_empty());
    assert!(h.registry.requests().is_empty());
}

#[test]
fn test_selection_survives_refresh() {
    let mut h = harness();
    h.registry.set_powered(true);
    h.registry.set_devices(vec![
        device("aa", "Keyboard", false),
        device("bb", "Mouse", false),
        device("cc", "Headset", false),
    ]);

    h.controller.refresh();
    h.controller.handle_event(AppEvent::SelectRow(RowIndex(2)));
    h.controller.handle_event(AppEvent::Refresh);

    assert_eq!(h.controller.selection(), Some(RowIndex(2)));
}

#[test]
fn test_enter_keycodes_activate_and_escape_closes() {
    let mut h = harness();
    h.registry.set_powered(true);
    h.registry.set_devices(vec![device("aa", "Headset", false)]);

    h.controller.refresh();
    h.controller.handle_event(AppEvent::SelectRow(RowIndex(0)));

    h.controller.handle_event(AppEvent::KeyPressed(KEY_RETURN));
    assert_eq!(h.registry.requests().len(), 1);

    // Still in flight, keypad Enter must not launch a second attempt
    h.controller.handle_event(AppEvent::KeyPressed(KEY_ENTER));
    assert_eq!(h.registry.requests().len(), 1);

    h.view.take();
    h.controller.handle_event(AppEvent::KeyPressed(KEY_ESCAPE));
    assert_eq!(h.view.close_count(), 1);
    // Escape leaves the outstanding request alone
    assert!(h.controller.in_flight().is_some());
}

#[test]
fn test_completion_after_teardown_is_a_no_op() {
    let h = harness();
    let Harness {
        registry,
        rx,
        mut controller,
        ..
    } = h;

    registry.set_powered(true);
    registry.set_devices(vec![device("aa", "Headset", false)]);

    controller.refresh();
    controller.handle_event(AppEvent::SelectRow(RowIndex(0)));
    controller.handle_event(AppEvent::Activate);

    // Tear down the owner while the request is outstanding
    drop(controller);
    drop(rx);

    let (_, _, done) = registry.take_completion();
    done(true);
}

impl Harness {
    fn requests_for(&self, addr: &str) -> Vec<bool> {
        self.registry
            .requests()
            .into_iter()
            .filter(|(id, _)| id == &DeviceId::from(addr))
            .map(|(_, desired)| desired)
            .collect()
    }
}
