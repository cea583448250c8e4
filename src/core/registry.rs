//! Registry seam between the controller and the device backend

use super::device::{DeviceId, DeviceSummary};
use anyhow::Result;

/// Completion callback for an asynchronous connection-change request.
///
/// May be invoked from any thread; implementations forward the outcome into
/// the owning event channel rather than touching controller state directly.
pub type Completion = Box<dyn FnOnce(bool) + Send + 'static>;

/// Adapter power and known-device state, owned outside the core.
pub trait DeviceRegistry {
    /// Current adapter power state
    fn adapter_powered(&self) -> Result<bool>;

    /// Known (previously paired) devices, connected ones first
    fn devices(&self) -> Result<Vec<DeviceSummary>>;

    /// Request an adapter power change; fire-and-forget
    fn set_adapter_powered(&self, powered: bool);

    /// Request a connection-state change for one device.
    ///
    /// `done` is called exactly once with the outcome, on whatever execution
    /// context the backend uses.
    fn request_connection_change(&self, id: DeviceId, desired: bool, done: Completion);
}
