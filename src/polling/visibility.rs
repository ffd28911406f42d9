use std::sync::Arc;
use tokio::sync::watch;

/// Process-wide "is the application currently on-screen" flag.
///
/// A single observation point: the platform layer (or a test) mutates it
/// through [`set_visible`](Self::set_visible); any number of poll tasks
/// subscribe and react. Subscriptions end when the receiver is dropped, so
/// a task that goes away detaches itself.
#[derive(Clone, Debug)]
pub struct VisibilitySignal {
    tx: Arc<watch::Sender<bool>>,
}

impl VisibilitySignal {
    /// Starts out visible, matching a freshly foregrounded application.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(true);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_visible(&self) -> bool {
        *self.tx.borrow()
    }

    /// Redundant writes are dropped so subscribers only wake on an actual
    /// transition.
    pub fn set_visible(&self, visible: bool) {
        self.tx.send_if_modified(|current| {
            if *current == visible {
                false
            } else {
                *current = visible;
                true
            }
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for VisibilitySignal {
    fn default() -> Self {
        Self::new()
    }
}
