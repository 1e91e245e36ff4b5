//! Network status handler that releases the link wait

use std::sync::Arc;

use device_platform::{NetworkStatus, Notification, NotificationHandler};
use link_signal::LinkNotifier;

/// React to one network transition
///
/// Only `StationUp` touches the signal. Returns whether a token was stored.
pub fn on_network_status(status: NetworkStatus, notifier: &LinkNotifier) -> bool {
    match status {
        NetworkStatus::StationUp => notifier.notify(),
        NetworkStatus::StationDown
        | NetworkStatus::AccessPointUp
        | NetworkStatus::AccessPointDown => false,
    }
}

/// Build the handler registered for `WifiStatusChanged`
///
/// Runs on the dispatch thread; it never logs, allocates, or blocks.
pub fn link_up_handler(notifier: LinkNotifier) -> NotificationHandler {
    Arc::new(move |notification: &Notification| {
        if let Some(status) = notification.network_status() {
            on_network_status(status, &notifier);
        }
    })
}
