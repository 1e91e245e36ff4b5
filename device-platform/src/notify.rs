//! Sync notification center
//!
//! Handlers register per notification kind and are invoked on a background
//! dispatch thread. All methods on `NotificationCenter` are synchronous.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;

use crate::dispatch::{spawn_dispatcher, Command, HandlerTable};
use crate::error::{PlatformError, Result};
use crate::event::{Notification, NotificationKind};

/// Callback invoked on the dispatch thread
///
/// Handlers must return quickly: they share one thread with every other
/// handler and with delayed notifications.
pub type NotificationHandler = Arc<dyn Fn(&Notification) + Send + Sync>;

/// Identifies one handler registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl HandlerId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler-{}", self.0)
    }
}

/// Register and remove notification handlers
pub trait NotificationService: Send + Sync {
    /// Register `handler` for every notification of `kind`
    fn subscribe(&self, kind: NotificationKind, handler: NotificationHandler) -> Result<HandlerId>;

    /// Remove a registration
    ///
    /// Returns `false` when nothing matched; that is not an error.
    fn unsubscribe(&self, kind: NotificationKind, id: HandlerId) -> bool;
}

/// Notification registry with a background dispatch thread
///
/// # Example
///
/// ```rust,ignore
/// use device_platform::{NotificationCenter, NotificationKind, NotificationService, NetworkStatus};
/// use std::sync::Arc;
///
/// let center = NotificationCenter::new()?;
/// let id = center.subscribe(
///     NotificationKind::WifiStatusChanged,
///     Arc::new(|n| println!("{:?}", n)),
/// )?;
///
/// center.post(NetworkStatus::StationUp.into())?;
/// center.unsubscribe(NotificationKind::WifiStatusChanged, id);
/// ```
pub struct NotificationCenter {
    /// Send commands to the dispatch thread
    command_tx: mpsc::UnboundedSender<Command>,

    /// Registered handlers, shared with the dispatch thread
    handlers: HandlerTable,

    /// Next registration id
    next_id: AtomicU64,

    /// Handler invocations performed so far
    delivered: Arc<AtomicU64>,

    /// Dispatch thread handle
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl NotificationCenter {
    /// Create a notification center and start its dispatch thread
    pub fn new() -> Result<Self> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let handlers: HandlerTable = Arc::new(RwLock::new(HashMap::new()));
        let delivered = Arc::new(AtomicU64::new(0));

        let worker = spawn_dispatcher(Arc::clone(&handlers), command_rx, Arc::clone(&delivered))?;

        Ok(Self {
            command_tx,
            handlers,
            next_id: AtomicU64::new(1),
            delivered,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Queue a notification for delivery on the dispatch thread
    pub fn post(&self, notification: Notification) -> Result<()> {
        self.command_tx
            .send(Command::Post(notification))
            .map_err(|_| PlatformError::DispatcherStopped)
    }

    /// Queue a notification for delivery after `delay`
    pub fn post_after(&self, notification: Notification, delay: Duration) -> Result<()> {
        self.command_tx
            .send(Command::PostAfter {
                notification,
                delay,
            })
            .map_err(|_| PlatformError::DispatcherStopped)
    }

    /// Number of handlers registered for a kind
    pub fn handler_count(&self, kind: NotificationKind) -> usize {
        self.handlers.read().get(&kind).map_or(0, Vec::len)
    }

    /// Total handler invocations so far
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Stop the dispatch thread and wait for it to exit
    ///
    /// Called automatically on drop. Must not be called from a handler.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(Command::Shutdown);
        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                tracing::warn!("Notification dispatcher panicked");
            }
        }
    }
}

impl NotificationService for NotificationCenter {
    fn subscribe(&self, kind: NotificationKind, handler: NotificationHandler) -> Result<HandlerId> {
        if self.command_tx.is_closed() {
            return Err(PlatformError::DispatcherStopped);
        }

        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut handlers = self.handlers.write();
        let regs = handlers.entry(kind).or_default();
        regs.push((id, handler));

        tracing::debug!("Registered {} for {:?} ({} total)", id, kind, regs.len());
        Ok(id)
    }

    fn unsubscribe(&self, kind: NotificationKind, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write();
        let Some(regs) = handlers.get_mut(&kind) else {
            tracing::debug!("No handlers for {:?}, nothing to remove for {}", kind, id);
            return false;
        };

        let before = regs.len();
        regs.retain(|(existing, _)| *existing != id);
        let removed = regs.len() != before;

        if regs.is_empty() {
            handlers.remove(&kind);
        }

        if removed {
            tracing::debug!("Removed {} from {:?}", id, kind);
        } else {
            tracing::debug!("{} was not registered for {:?}", id, kind);
        }
        removed
    }
}

impl Drop for NotificationCenter {
    fn drop(&mut self) {
        tracing::debug!(
            "NotificationCenter dropping, {} handler kinds registered",
            self.handlers.read().len()
        );
        self.shutdown();
    }
}

impl fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("kinds", &self.handlers.read().len())
            .field("delivered", &self.delivered())
            .finish()
    }
}
