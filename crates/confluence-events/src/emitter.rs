//! The standard in-process event source.
//!
//! [`Emitter`] keeps a registry of handlers keyed by event name. Handlers for
//! one event fire in registration order, synchronously, on the thread that
//! calls [`Emitter::emit`].
//!
//! # Re-entrancy
//!
//! `emit` snapshots the handler list before calling anything, and no internal
//! borrow is held while a handler runs. A handler may therefore subscribe or
//! unsubscribe (on this emitter or any other) while it is being dispatched.
//! Changes made during dispatch take effect from the next `emit`.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::{Handler, ListenerId, Observable};

/// A registered handler and the handle that identifies it.
struct Slot<A: ?Sized> {
    id: ListenerId,
    handler: Handler<A>,
}

/// Keyed listener registry that emits named events.
///
/// `A` is the argument type delivered to every handler. An emitter is
/// usually shared as `Rc<Emitter<A>>` so it can be handed to a
/// multiplexer while its owner keeps emitting.
pub struct Emitter<A: ?Sized> {
    /// Handlers per event name. An event name is present only while it has
    /// at least one handler.
    listeners: RefCell<IndexMap<String, Vec<Slot<A>>>>,
}

impl<A: ?Sized> Emitter<A> {
    /// Create an emitter with no handlers.
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(IndexMap::new()),
        }
    }

    /// Call every handler registered for `event`, in registration order.
    ///
    /// Returns the number of handlers that were called. Emitting an event
    /// nobody listens to is not an error and returns 0.
    pub fn emit(&self, event: &str, args: &A) -> usize {
        let handlers: Vec<Handler<A>> = self
            .listeners
            .borrow()
            .get(event)
            .map(|slots| slots.iter().map(|slot| Rc::clone(&slot.handler)).collect())
            .unwrap_or_default();

        for handler in &handlers {
            handler(args);
        }

        tracing::trace!(event, listeners = handlers.len(), "Emitted event");
        handlers.len()
    }

    /// Return the number of handlers currently registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.borrow().get(event).map_or(0, Vec::len)
    }

    /// Return the event names that currently have handlers, in the order
    /// they first gained one.
    pub fn event_names(&self) -> Vec<String> {
        self.listeners.borrow().keys().cloned().collect()
    }

    /// Remove every handler registered for `event`.
    ///
    /// Returns how many handlers were removed.
    pub fn unsubscribe_all(&self, event: &str) -> usize {
        let removed = self
            .listeners
            .borrow_mut()
            .shift_remove(event)
            .map_or(0, |slots| slots.len());
        tracing::trace!(event, removed, "Removed all handlers");
        removed
    }
}

impl<A: ?Sized> Observable<A> for Emitter<A> {
    fn subscribe(&self, event: &str, handler: Handler<A>) -> ListenerId {
        let id = ListenerId::new();
        self.listeners
            .borrow_mut()
            .entry(event.to_owned())
            .or_default()
            .push(Slot { id, handler });
        tracing::trace!(event, %id, "Subscribed handler");
        id
    }

    fn unsubscribe(&self, event: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let Some(slots) = listeners.get_mut(event) else {
            return false;
        };
        let Some(position) = slots.iter().position(|slot| slot.id == id) else {
            return false;
        };
        slots.remove(position);
        if slots.is_empty() {
            listeners.shift_remove(event);
        }
        tracing::trace!(event, %id, "Unsubscribed handler");
        true
    }
}

impl<A: ?Sized> Default for Emitter<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> core::fmt::Debug for Emitter<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let listeners = self.listeners.borrow();
        f.debug_map()
            .entries(listeners.iter().map(|(event, slots)| (event, slots.len())))
            .finish()
    }
}
