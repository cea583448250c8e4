//! Bluetooth module - BlueZ D-Bus registry backend and event bridge

mod error;
mod registry;
mod watcher;

pub use error::RegistryError;
pub use registry::BluezRegistry;
pub use watcher::ConnectionWatcher;
