//! Event bridge for connection changes the controller did not initiate
//!
//! Subscribes to PropertiesChanged signals from BlueZ and forwards device
//! connection transitions into the application event channel. No coalescing
//! is done here; rapid bursts collapse into one refreshed view on the
//! receiving side.

use std::collections::HashMap;

use anyhow::{Context, Result};
use futures::StreamExt;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use zbus::zvariant::OwnedValue;
use zbus::{Connection, MatchRule, MessageStream};

use super::registry::{ADAPTER_IFACE, BLUEZ_SERVICE, DEVICE_IFACE};
use crate::core::events::{AppEvent, EventSender, ExternalEvent};

/// Signal body of org.freedesktop.DBus.Properties.PropertiesChanged
type PropertiesChangedBody = (String, HashMap<String, OwnedValue>, Vec<String>);

/// Watches BlueZ for connect/disconnect events and adapter power flips
pub struct ConnectionWatcher {
    task: JoinHandle<()>,
}

impl ConnectionWatcher {
    /// Subscribe to BlueZ property-change signals and start forwarding
    pub fn spawn(rt: &Handle, conn: Connection, event_tx: EventSender) -> Result<Self> {
        let rule = MatchRule::builder()
            .msg_type(zbus::message::Type::Signal)
            .sender(BLUEZ_SERVICE)
            .context("Invalid signal sender")?
            .interface("org.freedesktop.DBus.Properties")
            .context("Invalid signal interface")?
            .member("PropertiesChanged")
            .context("Invalid signal member")?
            .build();

        let stream = rt
            .block_on(MessageStream::for_match_rule(rule, &conn, None))
            .context("Failed to subscribe to BlueZ property changes")?;

        let task = rt.spawn(Self::run(stream, event_tx));
        Ok(Self { task })
    }

    async fn run(mut stream: MessageStream, event_tx: EventSender) {
        while let Some(msg) = stream.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    warn!("D-Bus signal stream error: {}", e);
                    continue;
                }
            };

            let body = msg.body();
            let Ok((iface, changed, _invalidated)) = body.deserialize::<PropertiesChangedBody>()
            else {
                continue;
            };

            match iface.as_str() {
                DEVICE_IFACE => {
                    let Some(connected) = changed
                        .get("Connected")
                        .cloned()
                        .and_then(|v| bool::try_from(v).ok())
                    else {
                        continue;
                    };

                    let event = if connected {
                        ExternalEvent::Connected
                    } else {
                        ExternalEvent::Disconnected
                    };
                    debug!("Device {:?} reported {:?}", msg.header().path(), event);

                    if event_tx.send(AppEvent::Device(event)).is_err() {
                        break;
                    }
                }
                ADAPTER_IFACE => {
                    // Power flips change the display mode; a plain refresh
                    // picks up the new state.
                    if changed.contains_key("Powered") {
                        debug!("Adapter power state changed");
                        if event_tx.send(AppEvent::Refresh).is_err() {
                            break;
                        }
                    }
                }
                _ => {}
            }
        }

        debug!("Connection watcher stream ended");
    }
}

impl Drop for ConnectionWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
