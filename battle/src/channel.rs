//! Synchronous pub/sub channel keyed by event kind.
//!
//! Two kinds of subscriber share one ordered table:
//! - observers, boxed closures owned by the channel (presentation, logging);
//! - bindings, plain handler references that the owner of the channel
//!   resolves when it fires (ability effects). The channel never owns the
//!   handler itself, so handlers and channels cannot form a cycle.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;

use crate::effects::HandlerId;
use crate::events::Event;

/// Handle returned by every subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, TypeInfo)]
pub struct SubscriptionId(pub u32);

/// Reference from a channel subscription back to an effect handler binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingRef {
    pub handler: HandlerId,
    /// Index of the event specifier inside the handler's effect
    pub slot: usize,
}

/// What happened to a subscriber during delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// An observer ran
    Observed,
    /// A binding is due; the channel owner must run it
    Binding(BindingRef),
    /// The subscription is gone
    Gone,
}

type Observer<E> = Box<dyn FnMut(&E)>;

enum Subscriber<E> {
    Observer(Observer<E>),
    Binding(BindingRef),
}

pub struct EventChannel<E: Event> {
    topics: BTreeMap<E::Kind, Vec<SubscriptionId>>,
    wildcard: Vec<SubscriptionId>,
    subscribers: BTreeMap<SubscriptionId, Subscriber<E>>,
    next_id: u32,
}

impl<E: Event> Default for EventChannel<E> {
    fn default() -> Self {
        Self {
            topics: BTreeMap::new(),
            wildcard: Vec::new(),
            subscribers: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<E: Event> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("topics", &self.topics)
            .field("wildcard", &self.wildcard)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<E: Event> EventChannel<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe one kind of event
    pub fn subscribe<F>(&mut self, kind: E::Kind, observer: F) -> SubscriptionId
    where
        F: FnMut(&E) + 'static,
    {
        let id = self.allocate();
        self.subscribers
            .insert(id, Subscriber::Observer(Box::new(observer)));
        self.topics.entry(kind).or_default().push(id);
        id
    }

    /// Observe every event published on this channel.
    ///
    /// Wildcard observers run after the subscribers of the specific kind.
    pub fn subscribe_all<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&E) + 'static,
    {
        let id = self.allocate();
        self.subscribers
            .insert(id, Subscriber::Observer(Box::new(observer)));
        self.wildcard.push(id);
        id
    }

    /// Register a handler binding for one kind of event
    pub(crate) fn bind(&mut self, kind: E::Kind, binding: BindingRef) -> SubscriptionId {
        let id = self.allocate();
        self.subscribers.insert(id, Subscriber::Binding(binding));
        self.topics.entry(kind).or_default().push(id);
        id
    }

    /// Drop a subscription. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if self.subscribers.remove(&id).is_none() {
            return false;
        }
        for subscribers in self.topics.values_mut() {
            subscribers.retain(|s| *s != id);
        }
        self.wildcard.retain(|s| *s != id);
        true
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Number of handler bindings currently registered
    pub fn binding_count(&self) -> usize {
        self.subscribers
            .values()
            .filter(|s| matches!(s, Subscriber::Binding(_)))
            .count()
    }

    /// Subscribers of `kind` at this moment, in delivery order.
    ///
    /// Publishers walk this snapshot, so subscribing or unsubscribing while an
    /// event is being delivered never disturbs the walk in progress.
    pub(crate) fn snapshot(&self, kind: E::Kind) -> Vec<SubscriptionId> {
        let mut ids = self.topics.get(&kind).cloned().unwrap_or_default();
        ids.extend_from_slice(&self.wildcard);
        ids
    }

    /// Deliver `event` to a single subscriber from a snapshot
    pub(crate) fn deliver(&mut self, id: SubscriptionId, event: &E) -> Delivery {
        match self.subscribers.get_mut(&id) {
            Some(Subscriber::Observer(observer)) => {
                observer(event);
                Delivery::Observed
            }
            Some(Subscriber::Binding(binding)) => Delivery::Binding(*binding),
            None => Delivery::Gone,
        }
    }

    /// Deliver to every subscriber. Bindings are skipped, so this is only for
    /// channels whose owner has no handlers to resolve.
    pub fn publish(&mut self, event: &E) {
        for id in self.snapshot(event.kind()) {
            self.deliver(id, event);
        }
    }

    fn allocate(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        id
    }
}
