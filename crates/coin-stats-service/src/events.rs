//! Dataset lifecycle notifications.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// A change in the dataset held by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataEvent {
    /// The service was created.
    Initialized,
    /// A new dataset is about to replace the current one.
    Refreshing,
    /// A new dataset is in place.
    DataReady {
        /// Generation of the new snapshot.
        generation: u64,
        /// Number of records in it.
        records: usize,
    },
}

type Listener = Arc<dyn Fn(&DataEvent) + Send + Sync>;

/// Synchronous event bus; listeners run in subscription order.
///
/// Each publish works on the listeners registered when it started, so a callback may
/// subscribe further listeners; those hear from the next event on.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<Vec<Listener>>,
}

impl EventBus {
    /// Creates a bus without listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    pub fn subscribe(&self, listener: impl Fn(&DataEvent) + Send + Sync + 'static) {
        self.listeners.write().push(Arc::new(listener));
    }

    /// Calls every listener with `event`.
    pub fn publish(&self, event: &DataEvent) {
        let listeners = self.listeners.read().clone();
        for listener in &listeners {
            listener(event);
        }
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// Returns true if nobody listens.
    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.len())
            .finish()
    }
}
