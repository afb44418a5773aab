//! Network reachability monitoring

use std::sync::Arc;
use tokio::sync::watch;

/// Current reachability plus change notifications.
///
/// The crate does not probe the network itself; the application feeds
/// reachability transitions in from whatever platform signal it has.
/// The resolution engine and the redispatch path read the current value
/// at decision time, and [`subscribe`](Self::subscribe) exposes the
/// change stream for app-driven triggers such as draining the retry
/// queue on reconnect.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    sender: Arc<watch::Sender<bool>>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (sender, _) = watch::channel(initially_online);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Monitor starting in the online state.
    pub fn online() -> Self {
        Self::new(true)
    }

    /// Monitor starting in the offline state.
    pub fn offline() -> Self {
        Self::new(false)
    }

    /// Current reachability.
    pub fn current(&self) -> bool {
        *self.sender.borrow()
    }

    /// Record a reachability transition. Unchanged values are dropped so
    /// subscribers only wake on real flips.
    pub fn set_online(&self, online: bool) {
        self.sender.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
    }

    /// Change stream; yields whenever reachability flips.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::online()
    }
}
