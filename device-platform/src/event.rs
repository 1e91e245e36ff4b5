//! Platform notifications
//!
//! The platform reports system transitions as `Notification`s. Handlers
//! register per `NotificationKind` and receive every notification of that kind.

use std::fmt;

/// Class of notification a handler can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Station or access-point interface changed state
    WifiStatusChanged,
    /// Association with the configured network failed
    WifiConnectFailed,
    /// The system is about to power off
    SystemWillPowerOff,
}

/// Wi-Fi interface transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkStatus {
    /// Station joined a network and has an address
    StationUp,
    StationDown,
    AccessPointUp,
    AccessPointDown,
}

impl NetworkStatus {
    /// Whether this transition means the station link is usable
    pub fn is_link_up(&self) -> bool {
        matches!(self, NetworkStatus::StationUp)
    }
}

impl fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetworkStatus::StationUp => "station up",
            NetworkStatus::StationDown => "station down",
            NetworkStatus::AccessPointUp => "access point up",
            NetworkStatus::AccessPointDown => "access point down",
        };
        f.write_str(s)
    }
}

/// A notification delivered to subscribed handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    WifiStatus(NetworkStatus),
    /// Connect attempt failed with a platform error code
    WifiConnectFailed { code: i32 },
    SystemWillPowerOff,
}

impl Notification {
    /// The kind handlers subscribe to for this notification
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::WifiStatus(_) => NotificationKind::WifiStatusChanged,
            Notification::WifiConnectFailed { .. } => NotificationKind::WifiConnectFailed,
            Notification::SystemWillPowerOff => NotificationKind::SystemWillPowerOff,
        }
    }

    /// The network transition carried by this notification, if any
    pub fn network_status(&self) -> Option<NetworkStatus> {
        match self {
            Notification::WifiStatus(status) => Some(*status),
            _ => None,
        }
    }
}

impl From<NetworkStatus> for Notification {
    fn from(status: NetworkStatus) -> Self {
        Notification::WifiStatus(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_kind() {
        assert_eq!(
            Notification::from(NetworkStatus::StationDown).kind(),
            NotificationKind::WifiStatusChanged
        );
        assert_eq!(
            Notification::WifiConnectFailed { code: -3 }.kind(),
            NotificationKind::WifiConnectFailed
        );
    }

    #[test]
    fn test_only_station_up_is_link_up() {
        assert!(NetworkStatus::StationUp.is_link_up());
        assert!(!NetworkStatus::StationDown.is_link_up());
        assert!(!NetworkStatus::AccessPointUp.is_link_up());
        assert!(!NetworkStatus::AccessPointDown.is_link_up());
    }
}
