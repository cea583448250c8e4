//! Blueswitch
//!
//! Connect/disconnect switcher for paired Bluetooth peripherals.
//!
//! # Features
//! - Derives a display mode from adapter power state and the known-device list
//! - Preserves row selection across refreshes
//! - Serializes a single in-flight connect/disconnect request per device
//! - Reflects connect/disconnect events that happen outside the app
//! - Talks to BlueZ over the system D-Bus
//! - Desktop notification when a connection attempt starts
//!
//! The controller core is rendering-agnostic: the registry, notification,
//! and presentation collaborators are traits, constructed by the embedder
//! and injected at startup.

pub mod bluetooth;
pub mod core;
pub mod notify;
pub mod ui;

pub use self::bluetooth::{BluezRegistry, ConnectionWatcher};
pub use self::core::config::Config;
pub use self::core::controller::ConnectionController;
pub use self::core::device::{DeviceId, DeviceSummary, InFlightOperation};
pub use self::core::events::{AppEvent, EventSender, ExternalEvent};
pub use self::core::mode::{resolve_mode, DisplayMode};
pub use self::core::registry::DeviceRegistry;
pub use self::core::rows::RowIndex;
