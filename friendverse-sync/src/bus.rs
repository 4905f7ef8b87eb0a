//! Change notification bus.
//!
//! Feature contexts subscribe per collection and are called synchronously
//! whenever a change lands in the local store. Nothing is retained for late
//! subscribers; consumers read current state from the local store when they
//! attach.

use friendverse_types::{Collection, Stamp};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// Where a change originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// A mutation made on this device.
    Local,
    /// A change pulled in from the remote store.
    Remote,
}

/// A change notification for one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The collection that changed.
    pub collection: Collection,
    /// Where the change came from.
    pub origin: ChangeOrigin,
    /// Unix timestamp in milliseconds.
    pub at: u64,
}

impl ChangeEvent {
    /// Creates an event stamped with the current time.
    pub fn new(collection: Collection, origin: ChangeOrigin) -> Self {
        Self {
            collection,
            origin,
            at: Stamp::now().millis(),
        }
    }
}

type Handler = dyn Fn(&ChangeEvent) + Send + Sync;

/// Synchronous in-process publish/subscribe, keyed by collection.
///
/// Delivery happens on the publishing thread, in subscription order per
/// collection. Events are not replayed: a subscriber attached after a
/// publish will not see it.
pub struct ChangeBus {
    next_id: AtomicU64,
    handlers: RwLock<HashMap<Collection, Vec<(u64, Arc<Handler>)>>>,
}

impl ChangeBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a handler for one collection.
    ///
    /// The handler stays attached until the returned [`Subscription`] is
    /// dropped or explicitly unsubscribed.
    pub fn subscribe(
        self: &Arc<Self>,
        collection: Collection,
        handler: impl Fn(&ChangeEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers
            .write()
            .unwrap()
            .entry(collection)
            .or_default()
            .push((id, Arc::new(handler)));
        Subscription {
            bus: Arc::downgrade(self),
            collection,
            id,
        }
    }

    /// Delivers an event to every subscriber of its collection.
    pub fn publish(&self, event: ChangeEvent) {
        // Handlers run outside the lock so they can subscribe or
        // unsubscribe without deadlocking the registry.
        let subscribers: Vec<Arc<Handler>> = {
            let handlers = self.handlers.read().unwrap();
            match handlers.get(&event.collection) {
                Some(entries) => entries.iter().map(|(_, h)| Arc::clone(h)).collect(),
                None => return,
            }
        };
        for handler in subscribers {
            handler(&event);
        }
    }

    /// Number of live subscriptions for a collection.
    pub fn subscriber_count(&self, collection: Collection) -> usize {
        self.handlers
            .read()
            .unwrap()
            .get(&collection)
            .map_or(0, Vec::len)
    }

    fn remove(&self, collection: Collection, id: u64) {
        let mut handlers = self.handlers.write().unwrap();
        if let Some(entries) = handlers.get_mut(&collection) {
            entries.retain(|(entry_id, _)| *entry_id != id);
            if entries.is_empty() {
                handlers.remove(&collection);
            }
        }
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one registered handler. Dropping it detaches the handler.
pub struct Subscription {
    bus: Weak<ChangeBus>,
    collection: Collection,
    id: u64,
}

impl Subscription {
    /// Detaches the handler. Equivalent to dropping the subscription.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.collection, self.id);
        }
    }
}
