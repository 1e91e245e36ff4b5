//! Wait timeouts

use std::fmt;
use std::time::Duration;

/// How long [`ConnectivitySignal::wait`](crate::ConnectivitySignal::wait) may block
///
/// `Forever` is the normal bring-up mode: a device that never joins a network
/// stays parked until an external watchdog reboots it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitTimeout {
    /// Block until signaled or destroyed
    #[default]
    Forever,
    /// Block for at most the given duration
    After(Duration),
}

impl WaitTimeout {
    /// Build a timeout from milliseconds, where `0` means wait forever
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            WaitTimeout::Forever
        } else {
            WaitTimeout::After(Duration::from_millis(ms))
        }
    }

    /// Get the bounded duration, if any
    pub fn duration(&self) -> Option<Duration> {
        match self {
            WaitTimeout::Forever => None,
            WaitTimeout::After(d) => Some(*d),
        }
    }

    pub fn is_forever(&self) -> bool {
        matches!(self, WaitTimeout::Forever)
    }
}

impl From<Duration> for WaitTimeout {
    fn from(d: Duration) -> Self {
        WaitTimeout::After(d)
    }
}

impl fmt::Display for WaitTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitTimeout::Forever => write!(f, "forever"),
            WaitTimeout::After(d) => write!(f, "{}ms", d.as_millis()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_millis_zero_is_forever() {
        assert_eq!(WaitTimeout::from_millis(0), WaitTimeout::Forever);
        assert_eq!(
            WaitTimeout::from_millis(250),
            WaitTimeout::After(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(WaitTimeout::Forever.to_string(), "forever");
        assert_eq!(WaitTimeout::from_millis(1500).to_string(), "1500ms");
    }
}
