//! Single-slot signal with a blocking, consuming wait
//!
//! - `ConnectivitySignal`: owned by the waiter, supports `wait()` and `destroy()`
//! - `LinkNotifier`: cloneable producer handle that can only `notify()`

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use crate::error::{Result, SignalError};
use crate::timeout::WaitTimeout;

/// Maximum number of pending signals
pub const CAPACITY: u32 = 1;

// ============================================================================
// Shared slot
// ============================================================================

#[derive(Debug, Default)]
struct Slot {
    signaled: bool,
    destroyed: bool,
    accepted: u64,
    ignored: u64,
    consumed: u64,
}

#[derive(Debug, Default)]
struct Inner {
    slot: Mutex<Slot>,
    cond: Condvar,
}

impl Inner {
    fn signal(&self) -> bool {
        let mut slot = self.slot.lock();
        if slot.destroyed || slot.signaled {
            slot.ignored += 1;
            return false;
        }
        slot.signaled = true;
        slot.accepted += 1;
        drop(slot);
        self.cond.notify_one();
        true
    }
}

/// Counters describing what has happened to a signal so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalStats {
    /// Signals that moved the slot from unsignaled to signaled
    pub accepted: u64,
    /// Signals dropped because the slot was already full or destroyed
    pub ignored: u64,
    /// Successful waits
    pub consumed: u64,
}

// ============================================================================
// ConnectivitySignal
// ============================================================================

/// Binary semaphore the bring-up task parks on until the network link is up
///
/// The signal holds at most one pending token. Signaling a full slot is a
/// no-op, and a successful [`wait`](Self::wait) consumes the token.
///
/// Producers never hold the `ConnectivitySignal` itself. They get a
/// [`LinkNotifier`] via [`notifier`](Self::notifier), which keeps the owner
/// in sole control of waiting and destruction.
///
/// # Example
///
/// ```rust
/// use link_signal::{ConnectivitySignal, WaitTimeout};
///
/// let signal = ConnectivitySignal::new();
/// let notifier = signal.notifier();
///
/// std::thread::spawn(move || {
///     notifier.notify();
/// });
///
/// signal.wait(WaitTimeout::Forever).unwrap();
/// signal.destroy();
/// ```
pub struct ConnectivitySignal {
    inner: Arc<Inner>,
}

impl ConnectivitySignal {
    /// Create an unsignaled signal
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner::default()),
        }
    }

    /// Create a signal with an initial token count of 0 or 1
    ///
    /// Counts above [`CAPACITY`] are rejected.
    pub fn create(initial_count: u32) -> Result<Self> {
        if initial_count > CAPACITY {
            return Err(SignalError::CapacityExceeded {
                requested: initial_count,
                capacity: CAPACITY,
            });
        }

        let signal = Self::new();
        if initial_count == 1 {
            signal.inner.signal();
        }
        Ok(signal)
    }

    /// Get a producer handle for this signal
    pub fn notifier(&self) -> LinkNotifier {
        LinkNotifier {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Store a token; returns `false` if one was already pending or the signal is destroyed
    pub fn signal(&self) -> bool {
        self.inner.signal()
    }

    /// Block until a token is available, then consume it
    ///
    /// Returns [`SignalError::Destroyed`] if the signal is destroyed while
    /// waiting, or [`SignalError::TimedOut`] when a bounded timeout expires.
    pub fn wait(&self, timeout: WaitTimeout) -> Result<()> {
        // A deadline past the clock's range waits forever
        let deadline = timeout
            .duration()
            .and_then(|d| Instant::now().checked_add(d).map(|at| (d, at)));
        let mut slot = self.inner.slot.lock();

        loop {
            if slot.destroyed {
                return Err(SignalError::Destroyed);
            }
            if slot.signaled {
                slot.signaled = false;
                slot.consumed += 1;
                tracing::trace!("Connectivity signal consumed");
                return Ok(());
            }

            match deadline {
                None => self.inner.cond.wait(&mut slot),
                Some((limit, at)) => {
                    if self.inner.cond.wait_until(&mut slot, at).timed_out()
                        && !slot.signaled
                        && !slot.destroyed
                    {
                        return Err(SignalError::TimedOut(limit));
                    }
                }
            }
        }
    }

    /// Consume a pending token without blocking
    pub fn try_wait(&self) -> bool {
        let mut slot = self.inner.slot.lock();
        if slot.destroyed || !slot.signaled {
            return false;
        }
        slot.signaled = false;
        slot.consumed += 1;
        true
    }

    /// Check whether a token is pending
    pub fn is_signaled(&self) -> bool {
        self.inner.slot.lock().signaled
    }

    /// Release the signal and wake any waiter
    ///
    /// Idempotent: returns `true` only for the call that actually released it.
    pub fn destroy(&self) -> bool {
        let mut slot = self.inner.slot.lock();
        if slot.destroyed {
            return false;
        }
        slot.destroyed = true;
        slot.signaled = false;
        drop(slot);
        self.inner.cond.notify_all();
        tracing::trace!("Connectivity signal destroyed");
        true
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.slot.lock().destroyed
    }

    /// Snapshot of the signal's counters
    pub fn stats(&self) -> SignalStats {
        let slot = self.inner.slot.lock();
        SignalStats {
            accepted: slot.accepted,
            ignored: slot.ignored,
            consumed: slot.consumed,
        }
    }
}

impl Default for ConnectivitySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ConnectivitySignal {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for ConnectivitySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.inner.slot.lock();
        f.debug_struct("ConnectivitySignal")
            .field("signaled", &slot.signaled)
            .field("destroyed", &slot.destroyed)
            .finish()
    }
}

// ============================================================================
// LinkNotifier
// ============================================================================

/// Producer side of a [`ConnectivitySignal`]
///
/// Cheap to clone and safe to move into event handlers. Notifying never
/// blocks beyond the slot's short critical section and never allocates.
#[derive(Clone)]
pub struct LinkNotifier {
    inner: Arc<Inner>,
}

impl LinkNotifier {
    /// Store a token; returns `false` if the slot was already full or destroyed
    pub fn notify(&self) -> bool {
        self.inner.signal()
    }

    /// Check whether the owning signal has been destroyed
    pub fn is_closed(&self) -> bool {
        self.inner.slot.lock().destroyed
    }
}

impl fmt::Debug for LinkNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkNotifier")
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_new_signal_is_unsignaled() {
        let signal = ConnectivitySignal::new();
        assert!(!signal.is_signaled());
        assert!(!signal.is_destroyed());
        assert!(!signal.try_wait());
    }

    #[test]
    fn test_create_with_initial_count() {
        assert!(!ConnectivitySignal::create(0).unwrap().is_signaled());
        assert!(ConnectivitySignal::create(1).unwrap().is_signaled());

        let err = ConnectivitySignal::create(2).unwrap_err();
        assert_eq!(
            err,
            SignalError::CapacityExceeded {
                requested: 2,
                capacity: 1
            }
        );
    }

    #[test]
    fn test_second_signal_is_noop() {
        let signal = ConnectivitySignal::new();
        assert!(signal.signal());
        assert!(!signal.signal());
        assert!(signal.is_signaled());

        let stats = signal.stats();
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.ignored, 1);
    }

    #[test]
    fn test_wait_consumes_single_token() {
        let signal = ConnectivitySignal::new();
        signal.signal();
        signal.signal();

        signal.wait(WaitTimeout::Forever).unwrap();
        assert!(!signal.is_signaled());

        let result = signal.wait(WaitTimeout::After(Duration::from_millis(20)));
        assert_eq!(
            result,
            Err(SignalError::TimedOut(Duration::from_millis(20)))
        );
        assert_eq!(signal.stats().consumed, 1);
    }

    #[test]
    fn test_wait_blocks_until_notified_from_other_thread() {
        let signal = ConnectivitySignal::new();
        let notifier = signal.notifier();

        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            notifier.notify()
        });

        signal.wait(WaitTimeout::Forever).unwrap();
        assert!(producer.join().unwrap());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let signal = ConnectivitySignal::new();
        assert!(signal.destroy());
        assert!(!signal.destroy());
        assert!(signal.is_destroyed());
    }

    #[test]
    fn test_signal_after_destroy_is_ignored() {
        let signal = ConnectivitySignal::new();
        let notifier = signal.notifier();
        signal.destroy();

        assert!(notifier.is_closed());
        assert!(!notifier.notify());
        assert_eq!(signal.wait(WaitTimeout::Forever), Err(SignalError::Destroyed));
    }

    #[test]
    fn test_destroy_wakes_blocked_waiter() {
        let signal = Arc::new(ConnectivitySignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || signal.wait(WaitTimeout::Forever))
        };

        thread::sleep(Duration::from_millis(30));
        signal.destroy();

        assert_eq!(waiter.join().unwrap(), Err(SignalError::Destroyed));
    }

    #[test]
    fn test_drop_closes_notifier() {
        let notifier = {
            let signal = ConnectivitySignal::new();
            signal.notifier()
        };
        assert!(notifier.is_closed());
    }

    #[test]
    fn test_unbounded_duration_with_pending_token() {
        let signal = ConnectivitySignal::create(1).unwrap();
        assert_eq!(signal.wait(WaitTimeout::After(Duration::MAX)), Ok(()));
        assert_eq!(signal.stats().consumed, 1);
    }

    #[test]
    fn test_unbounded_duration_waits_for_notify() {
        let signal = ConnectivitySignal::new();
        let notifier = signal.notifier();
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            notifier.notify()
        });

        assert_eq!(signal.wait(WaitTimeout::After(Duration::MAX)), Ok(()));
        assert!(producer.join().unwrap());
    }
}
