//! Blueswitch - Entry Point
//!
//! Wires the BlueZ registry, the connection watcher, the desktop notifier,
//! and a console view into the controller event loop. The thread running
//! `main` owns the controller; everything else reaches it through the event
//! channel.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use blueswitch::bluetooth::{BluezRegistry, ConnectionWatcher};
use blueswitch::core::config::Config;
use blueswitch::core::controller::ConnectionController;
use blueswitch::core::events::{self, AppEvent, EventSender};
use blueswitch::core::rows::RowIndex;
use blueswitch::notify::DesktopNotifier;
use blueswitch::ui::ConsoleView;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting blueswitch");

    // Load configuration
    let config = Config::load()?;

    // Runtime for the D-Bus backend; the controller itself stays on this thread
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    // Create event channel
    let (event_tx, mut event_rx) = events::channel();

    let registry = BluezRegistry::new(runtime.handle().clone(), config.bluetooth.clone())?;
    let _watcher = ConnectionWatcher::spawn(
        runtime.handle(),
        registry.connection().clone(),
        event_tx.clone(),
    )?;

    let notifier = DesktopNotifier::new(config.notifications.enabled);
    let closed = Arc::new(AtomicBool::new(false));
    let view = ConsoleView::new(Arc::clone(&closed));

    let mut controller = ConnectionController::new(registry, view, notifier, event_tx.clone());
    controller.refresh();

    spawn_input_reader(event_tx);

    info!("Ready: row number selects, Enter toggles, r refreshes, q quits");

    // Run event loop
    while let Some(event) = event_rx.blocking_recv() {
        controller.handle_event(event);
        if closed.load(Ordering::SeqCst) {
            break;
        }
    }

    info!("Shutting down");
    Ok(())
}

/// Forward stdin lines as controller events.
///
/// The reader never touches controller state; like every other input source
/// it goes through the channel.
fn spawn_input_reader(event_tx: EventSender) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };

            let event = match line.trim() {
                "" => AppEvent::Activate,
                "q" | "Q" => AppEvent::CloseRequested,
                "r" | "R" => AppEvent::Refresh,
                other => match other.parse::<usize>() {
                    Ok(n) if n >= 1 => AppEvent::SelectRow(RowIndex(n - 1)),
                    _ => {
                        warn!("Unrecognized input: {:?}", other);
                        continue;
                    }
                },
            };

            if event_tx.send(event).is_err() {
                break;
            }
        }
    });
}
