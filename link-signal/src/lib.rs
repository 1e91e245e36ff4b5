//! Connectivity Signal
//!
//! A single-slot synchronization primitive for "wait until the link is up".
//!
//! # Features
//!
//! - **Binary semantics**: at most one pending token, extra signals are dropped
//! - **Consuming wait**: a successful `wait()` takes the token
//! - **Split ownership**: the owner waits and destroys, producers only notify
//! - **Explicit timeouts**: `WaitTimeout::Forever` or a bounded duration
//! - **Idempotent destroy**: safe to call any number of times, wakes waiters
//!
//! # Quick Start
//!
//! ```rust
//! use link_signal::{ConnectivitySignal, WaitTimeout};
//! use std::time::Duration;
//!
//! let signal = ConnectivitySignal::create(0).unwrap();
//! let notifier = signal.notifier();
//!
//! // Event handler side (never blocks)
//! assert!(notifier.notify());
//! assert!(!notifier.notify()); // already signaled
//!
//! // Waiter side
//! signal.wait(WaitTimeout::Forever).unwrap();
//! assert!(signal
//!     .wait(WaitTimeout::After(Duration::from_millis(10)))
//!     .is_err());
//! ```
//!
//! # Architecture
//!
//! ```text
//! ConnectivitySignal (owner)        LinkNotifier (clone per producer)
//!     │                                 │
//!     └──────── Arc<Inner> ─────────────┘
//!                   │
//!                   ├── slot: Mutex<Slot { signaled, destroyed, counters }>
//!                   └── cond: Condvar
//! ```

pub mod error;
pub mod signal;
pub mod timeout;

pub use error::{Result, SignalError};
pub use signal::{ConnectivitySignal, LinkNotifier, SignalStats, CAPACITY};
pub use timeout::WaitTimeout;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::SignalError;
    pub use crate::signal::{ConnectivitySignal, LinkNotifier};
    pub use crate::timeout::WaitTimeout;
}
