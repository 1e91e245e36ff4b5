//! Scoped teardown for a bring-up attempt
//!
//! `Teardown` collects what bring-up acquired (the notification
//! registration and the connectivity signal) and releases it exactly once,
//! either through an explicit [`Teardown::run`] or on drop.

use std::sync::Arc;

use device_platform::{HandlerId, NotificationKind, NotificationService};
use link_signal::ConnectivitySignal;
use serde::Serialize;

/// What a teardown pass released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TeardownReport {
    /// Number of times release logic actually ran (0 or 1)
    pub runs: u32,
    /// A handler registration was removed
    pub unsubscribed: bool,
    /// The connectivity signal was destroyed
    pub signal_destroyed: bool,
}

/// Guard that releases bring-up resources once
pub struct Teardown {
    notifications: Arc<dyn NotificationService>,
    subscription: Option<(NotificationKind, HandlerId)>,
    signal: Option<ConnectivitySignal>,
    report: Option<TeardownReport>,
}

impl Teardown {
    pub fn new(notifications: Arc<dyn NotificationService>) -> Self {
        Self {
            notifications,
            subscription: None,
            signal: None,
            report: None,
        }
    }

    /// Take ownership of the connectivity signal
    pub fn track_signal(&mut self, signal: ConnectivitySignal) {
        self.signal = Some(signal);
    }

    /// Remember a registration to remove later
    pub fn track_subscription(&mut self, kind: NotificationKind, id: HandlerId) {
        self.subscription = Some((kind, id));
    }

    /// The tracked signal, if allocation got that far and teardown has not run
    pub fn signal(&self) -> Option<&ConnectivitySignal> {
        self.signal.as_ref()
    }

    pub fn has_run(&self) -> bool {
        self.report.is_some()
    }

    /// Unsubscribe and destroy the signal
    ///
    /// Only the first call does anything; later calls return the first report.
    pub fn run(&mut self) -> TeardownReport {
        if let Some(report) = self.report {
            return report;
        }

        let unsubscribed = match self.subscription.take() {
            Some((kind, id)) => self.notifications.unsubscribe(kind, id),
            None => false,
        };

        let signal_destroyed = match self.signal.take() {
            Some(signal) => signal.destroy(),
            None => false,
        };

        let report = TeardownReport {
            runs: 1,
            unsubscribed,
            signal_destroyed,
        };
        tracing::debug!(
            "Teardown complete (unsubscribed: {}, signal destroyed: {})",
            unsubscribed,
            signal_destroyed
        );

        self.report = Some(report);
        report
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        if !self.has_run() {
            tracing::warn!("Bring-up teardown running from drop");
            self.run();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use device_platform::sim::SimPlatform;
    use device_platform::Notification;

    #[test]
    fn test_run_releases_everything_once() {
        let platform = SimPlatform::new().unwrap();
        let notifications = platform.notifications();

        let signal = ConnectivitySignal::new();
        let notifier = signal.notifier();
        let id = notifications
            .subscribe(
                NotificationKind::WifiStatusChanged,
                Arc::new(|_: &Notification| {}),
            )
            .unwrap();

        let mut teardown = Teardown::new(notifications.clone());
        teardown.track_signal(signal);
        teardown.track_subscription(NotificationKind::WifiStatusChanged, id);

        let first = teardown.run();
        assert_eq!(
            first,
            TeardownReport {
                runs: 1,
                unsubscribed: true,
                signal_destroyed: true
            }
        );

        assert_eq!(teardown.run(), first);
        assert_eq!(notifications.unsubscribe_calls(), 1);
        assert!(notifier.is_closed());
        assert_eq!(
            platform
                .center()
                .handler_count(NotificationKind::WifiStatusChanged),
            0
        );
    }

    #[test]
    fn test_run_with_nothing_tracked() {
        let platform = SimPlatform::new().unwrap();
        let mut teardown = Teardown::new(platform.notifications().clone());

        assert_eq!(
            teardown.run(),
            TeardownReport {
                runs: 1,
                unsubscribed: false,
                signal_destroyed: false
            }
        );
        assert_eq!(platform.notifications().unsubscribe_calls(), 0);
    }

    #[test]
    fn test_drop_runs_teardown() {
        let platform = SimPlatform::new().unwrap();
        let notifications = platform.notifications();
        let id = notifications
            .subscribe(
                NotificationKind::WifiStatusChanged,
                Arc::new(|_: &Notification| {}),
            )
            .unwrap();

        {
            let mut teardown = Teardown::new(notifications.clone());
            teardown.track_subscription(NotificationKind::WifiStatusChanged, id);
        }

        assert_eq!(notifications.unsubscribe_calls(), 1);
        assert_eq!(
            platform
                .center()
                .handler_count(NotificationKind::WifiStatusChanged),
            0
        );
    }
}
