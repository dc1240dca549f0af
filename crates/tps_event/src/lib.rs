//! # tps_event - Synchronous Typed Event Bus
//!
//! Gameplay-wide publish/subscribe with:
//! - One channel per event type (keyed by `TypeId`)
//! - Synchronous delivery: `publish` returns after every handler ran
//! - Subscription order preserved (optionally grouped by priority)
//! - Subscriber ids for unsubscribing, `clear` for session restarts
//!
//! # Re-entrancy
//!
//! Handlers may publish further events; those are delivered depth-first
//! before the outer `publish` returns. The handler list of a channel is
//! snapshotted when dispatch starts, so a handler that subscribes or
//! unsubscribes during dispatch only affects the *next* publish of that
//! type. Handlers must not rely on seeing their own subscription changes
//! mid-dispatch.
//!
//! # Example
//!
//! ```ignore
//! use tps_event::prelude::*;
//!
//! struct AmmoChanged { current: u32, remaining: u32 }
//!
//! let bus = EventBus::new();
//! let id = bus.subscribe(|e: &AmmoChanged| println!("{}/{}", e.current, e.remaining));
//! bus.publish(AmmoChanged { current: 29, remaining: 90 });
//! bus.unsubscribe(id);
//! ```

use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trait for events
pub trait Event: Send + Sync + 'static {}

// Blanket implementation
impl<T: Send + Sync + 'static> Event for T {}

/// Delivery priority within one event type
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Low = 0,
    #[default]
    Normal = 1,
    High = 2,
}

/// Subscriber ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

/// Type-erased handler
type DynamicHandler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

struct Subscription {
    id: SubscriberId,
    priority: Priority,
    handler: DynamicHandler,
}

/// Event bus for publishing and subscribing to events
pub struct EventBus {
    /// Handlers per event type, highest priority first, then subscription order
    handlers: RwLock<BTreeMap<TypeId, Vec<Subscription>>>,
    /// Next subscriber ID
    next_subscriber_id: AtomicU64,
    /// Total events published
    published: AtomicU64,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(BTreeMap::new()),
            next_subscriber_id: AtomicU64::new(1),
            published: AtomicU64::new(0),
        }
    }

    /// Subscribe to an event type
    pub fn subscribe<E: Event, F>(&self, handler: F) -> SubscriberId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.subscribe_with_priority::<E, F>(handler, Priority::Normal)
    }

    /// Subscribe with priority. Within a priority, handlers run in
    /// subscription order.
    pub fn subscribe_with_priority<E: Event, F>(&self, handler: F, priority: Priority) -> SubscriberId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_subscriber_id.fetch_add(1, Ordering::Relaxed));

        let wrapped_handler: DynamicHandler = Arc::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                handler(event);
            }
        });

        let mut handlers = self.handlers.write();
        let list = handlers.entry(TypeId::of::<E>()).or_default();
        list.push(Subscription {
            id,
            priority,
            handler: wrapped_handler,
        });
        // Stable: equal priorities keep subscription order
        list.sort_by(|a, b| b.priority.cmp(&a.priority));

        log::trace!("subscriber {:?} added for {}", id, std::any::type_name::<E>());
        id
    }

    /// Unsubscribe. Returns false if the id was unknown.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut handlers = self.handlers.write();
        let mut removed = false;
        for list in handlers.values_mut() {
            let before = list.len();
            list.retain(|sub| sub.id != id);
            removed |= list.len() != before;
        }
        handlers.retain(|_, list| !list.is_empty());
        removed
    }

    /// Deliver an event to every current subscriber of its type, in order.
    /// Returns the number of handlers invoked.
    pub fn publish<E: Event>(&self, event: E) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);

        // Snapshot so handlers can publish/subscribe without deadlocking
        let snapshot: Vec<DynamicHandler> = {
            let handlers = self.handlers.read();
            match handlers.get(&TypeId::of::<E>()) {
                Some(list) => list.iter().map(|sub| Arc::clone(&sub.handler)).collect(),
                None => return 0,
            }
        };

        for handler in &snapshot {
            handler(&event as &dyn Any);
        }
        snapshot.len()
    }

    /// Number of subscribers for an event type
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.handlers
            .read()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Total events published since creation
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Drop every subscription
    pub fn clear(&self) {
        let mut handlers = self.handlers.write();
        let count: usize = handlers.values().map(Vec::len).sum();
        handlers.clear();
        log::debug!("event bus cleared ({} subscriptions)", count);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::{Event, EventBus, Priority, SubscriberId};
}
