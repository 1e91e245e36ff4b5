//! Background dispatch thread for notifications
//!
//! Spawns a thread with its own tokio runtime that delivers posted
//! notifications to registered handlers, while exposing a sync API to the
//! parent `NotificationCenter`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::event::{Notification, NotificationKind};
use crate::notify::{HandlerId, NotificationHandler};

/// Handlers registered per notification kind, in registration order
pub(crate) type HandlerTable =
    Arc<RwLock<HashMap<NotificationKind, Vec<(HandlerId, NotificationHandler)>>>>;

/// Commands sent from the sync NotificationCenter to the dispatch thread
#[derive(Debug)]
pub(crate) enum Command {
    /// Deliver a notification now
    Post(Notification),
    /// Deliver a notification once the delay has elapsed
    PostAfter {
        notification: Notification,
        delay: Duration,
    },
    /// Stop the dispatch thread
    Shutdown,
}

/// Spawns the dispatch thread
///
/// The thread owns a single-threaded tokio runtime and:
/// - Delivers posted notifications in order
/// - Schedules delayed notifications on runtime timers
/// - Counts delivered handler invocations
pub(crate) fn spawn_dispatcher(
    handlers: HandlerTable,
    command_rx: mpsc::UnboundedReceiver<Command>,
    delivered: Arc<AtomicU64>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("notify-dispatch".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!("Failed to create tokio runtime for dispatcher: {}", e);
                    return;
                }
            };

            rt.block_on(run_dispatch_loop(handlers, command_rx, delivered));
        })
}

/// Main loop running inside the tokio runtime
async fn run_dispatch_loop(
    handlers: HandlerTable,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    delivered: Arc<AtomicU64>,
) {
    tracing::debug!("Notification dispatcher started");

    while let Some(cmd) = command_rx.recv().await {
        match cmd {
            Command::Post(notification) => {
                deliver(&handlers, &notification, &delivered);
            }
            Command::PostAfter {
                notification,
                delay,
            } => {
                let handlers = Arc::clone(&handlers);
                let delivered = Arc::clone(&delivered);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    deliver(&handlers, &notification, &delivered);
                });
            }
            Command::Shutdown => {
                tracing::debug!("Dispatcher received shutdown command");
                return;
            }
        }
    }

    tracing::debug!("Notification dispatcher shut down");
}

/// Invoke every handler registered for the notification's kind
///
/// Handlers are cloned out of the table first so a handler may
/// subscribe or unsubscribe without deadlocking.
pub(crate) fn deliver(handlers: &HandlerTable, notification: &Notification, delivered: &AtomicU64) {
    let targets: Vec<NotificationHandler> = handlers
        .read()
        .get(&notification.kind())
        .map(|regs| regs.iter().map(|(_, h)| Arc::clone(h)).collect())
        .unwrap_or_default();

    tracing::trace!(
        "Dispatching {:?} to {} handler(s)",
        notification,
        targets.len()
    );

    for handler in targets {
        (*handler)(notification);
        delivered.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NetworkStatus;

    #[test]
    fn test_command_debug() {
        let cmd = Command::Post(Notification::WifiStatus(NetworkStatus::StationUp));
        assert!(format!("{:?}", cmd).contains("Post"));
    }

    #[test]
    fn test_deliver_without_handlers_is_noop() {
        let handlers: HandlerTable = Arc::new(RwLock::new(HashMap::new()));
        let delivered = AtomicU64::new(0);
        deliver(
            &handlers,
            &Notification::SystemWillPowerOff,
            &delivered,
        );
        assert_eq!(delivered.load(Ordering::Relaxed), 0);
    }
}
