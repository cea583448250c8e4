//! BlueZ-backed device registry
//!
//! Talks to org.bluez over the system D-Bus. Queries run to completion on
//! the shared tokio runtime and block the caller briefly; connection-change
//! requests are spawned and report through their completion callback.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use zbus::fdo::{ObjectManagerProxy, PropertiesProxy};
use zbus::names::InterfaceName;
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};
use zbus::{Connection, Proxy};

use super::error::RegistryError;
use crate::core::config::BluetoothConfig;
use crate::core::device::{DeviceId, DeviceSummary};
use crate::core::registry::{Completion, DeviceRegistry};

pub(crate) const BLUEZ_SERVICE: &str = "org.bluez";
pub(crate) const ADAPTER_IFACE: &str = "org.bluez.Adapter1";
pub(crate) const DEVICE_IFACE: &str = "org.bluez.Device1";

/// Device registry backed by the BlueZ system bus service
pub struct BluezRegistry {
    conn: Connection,
    rt: Handle,
    config: BluetoothConfig,
}

impl BluezRegistry {
    /// Connect to the system bus
    pub fn new(rt: Handle, config: BluetoothConfig) -> Result<Self> {
        let conn = rt
            .block_on(Connection::system())
            .context("Failed to connect to the system D-Bus")?;
        info!("Connected to the system D-Bus");

        Ok(Self { conn, rt, config })
    }

    /// The underlying bus connection, shared with the signal watcher
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run a registry query on the runtime, bounded by the configured timeout
    fn block_on_query<F, T>(&self, fut: F) -> Result<T, RegistryError>
    where
        F: Future<Output = Result<T, RegistryError>>,
    {
        let timeout = Duration::from_millis(self.config.request_timeout_ms);
        self.rt.block_on(async move {
            tokio::time::timeout(timeout, fut)
                .await
                .map_err(|_| RegistryError::Timeout)?
        })
    }

    async fn adapter_path(
        conn: &Connection,
        config: &BluetoothConfig,
    ) -> Result<OwnedObjectPath, RegistryError> {
        if !config.adapter.is_empty() {
            let path = format!("/org/bluez/{}", config.adapter);
            return OwnedObjectPath::try_from(path)
                .map_err(|e| RegistryError::Dbus(zbus::Error::from(e)));
        }

        let om = ObjectManagerProxy::builder(conn)
            .destination(BLUEZ_SERVICE)?
            .path("/")?
            .build()
            .await?;

        let objects = om.get_managed_objects().await?;
        for (path, ifaces) in objects {
            if ifaces.contains_key(ADAPTER_IFACE) {
                return Ok(path);
            }
        }

        Err(RegistryError::NoAdapter)
    }

    async fn query_adapter_powered(
        conn: &Connection,
        config: &BluetoothConfig,
    ) -> Result<bool, RegistryError> {
        let path = Self::adapter_path(conn, config).await?;

        let props = PropertiesProxy::builder(conn)
            .destination(BLUEZ_SERVICE)?
            .path(path)?
            .build()
            .await?;

        let iface = InterfaceName::try_from(ADAPTER_IFACE).map_err(zbus::Error::from)?;
        let value = props.get(iface, "Powered").await?;

        bool::try_from(value)
            .map_err(|_| RegistryError::Dbus(zbus::Error::Failure("Invalid Powered property".into())))
    }

    async fn power_adapter(
        conn: &Connection,
        config: &BluetoothConfig,
        powered: bool,
    ) -> Result<(), RegistryError> {
        let path = Self::adapter_path(conn, config).await?;

        let props = PropertiesProxy::builder(conn)
            .destination(BLUEZ_SERVICE)?
            .path(path)?
            .build()
            .await?;

        let iface = InterfaceName::try_from(ADAPTER_IFACE).map_err(zbus::Error::from)?;
        props.set(iface, "Powered", Value::from(powered)).await?;
        Ok(())
    }

    async fn query_devices(conn: &Connection) -> Result<Vec<DeviceSummary>, RegistryError> {
        let om = ObjectManagerProxy::builder(conn)
            .destination(BLUEZ_SERVICE)?
            .path("/")?
            .build()
            .await?;

        let objects = om.get_managed_objects().await?;
        let mut devices = Vec::new();

        for (_path, ifaces) in objects {
            let Some(dev) = ifaces.get(DEVICE_IFACE) else {
                continue;
            };

            // Known devices only; unpaired discovery results are not listed
            if !get_bool(dev, "Paired").unwrap_or(false) {
                continue;
            }

            let addr = get_string(dev, "Address").unwrap_or_else(|| "<unknown>".into());
            let name = get_string(dev, "Alias")
                .or_else(|| get_string(dev, "Name"))
                .unwrap_or_else(|| addr.clone());
            let connected = get_bool(dev, "Connected").unwrap_or(false);

            devices.push(DeviceSummary {
                id: DeviceId::new(addr),
                name,
                // BlueZ keeps no last-use timestamp for paired devices
                last_seen: None,
                connected,
            });
        }

        // Connected devices first, then by name
        devices.sort_by(|a, b| {
            (!a.connected, a.name.to_lowercase()).cmp(&(!b.connected, b.name.to_lowercase()))
        });

        Ok(devices)
    }

    async fn find_device_path(
        conn: &Connection,
        id: &DeviceId,
    ) -> Result<Option<OwnedObjectPath>, RegistryError> {
        let om = ObjectManagerProxy::builder(conn)
            .destination(BLUEZ_SERVICE)?
            .path("/")?
            .build()
            .await?;

        let objects = om.get_managed_objects().await?;
        for (path, ifaces) in objects {
            let Some(dev) = ifaces.get(DEVICE_IFACE) else {
                continue;
            };

            let addr = get_string(dev, "Address").unwrap_or_default();
            if addr.eq_ignore_ascii_case(id.as_str()) {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    async fn change_connection(
        conn: &Connection,
        id: &DeviceId,
        desired: bool,
    ) -> Result<(), RegistryError> {
        let Some(path) = Self::find_device_path(conn, id).await? else {
            return Err(RegistryError::UnknownDevice(id.clone()));
        };

        let dev = Proxy::new(conn, BLUEZ_SERVICE, path, DEVICE_IFACE).await?;
        let method = if desired { "Connect" } else { "Disconnect" };
        dev.call_method(method, &()).await?;
        Ok(())
    }
}

impl DeviceRegistry for BluezRegistry {
    fn adapter_powered(&self) -> Result<bool> {
        let conn = self.conn.clone();
        let config = self.config.clone();
        let powered =
            self.block_on_query(async move { Self::query_adapter_powered(&conn, &config).await })?;
        Ok(powered)
    }

    fn devices(&self) -> Result<Vec<DeviceSummary>> {
        let conn = self.conn.clone();
        let devices = self.block_on_query(async move { Self::query_devices(&conn).await })?;
        Ok(devices)
    }

    fn set_adapter_powered(&self, powered: bool) {
        let conn = self.conn.clone();
        let config = self.config.clone();

        self.rt.spawn(async move {
            match Self::power_adapter(&conn, &config, powered).await {
                Ok(()) => info!("Adapter power set to {}", powered),
                Err(e) => warn!("Failed to set adapter power: {}", e),
            }
        });
    }

    fn request_connection_change(&self, id: DeviceId, desired: bool, done: Completion) {
        let conn = self.conn.clone();
        debug!(
            "Requesting {} for {}",
            if desired { "connect" } else { "disconnect" },
            id
        );

        self.rt.spawn(async move {
            let success = match Self::change_connection(&conn, &id, desired).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Connection change for {} failed: {}", id, e);
                    false
                }
            };
            done(success);
        });
    }
}

fn get_bool(props: &HashMap<String, OwnedValue>, key: &str) -> Option<bool> {
    props.get(key).cloned().and_then(|v| v.try_into().ok())
}

fn get_string(props: &HashMap<String, OwnedValue>, key: &str) -> Option<String> {
    props.get(key).cloned().and_then(|v| v.try_into().ok())
}
