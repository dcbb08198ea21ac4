//! The event multiplexer: one subscription point over many sources.
//!
//! The [`Multiplexer`] struct owns three pieces of state:
//!
//! - the **source registry**, an insertion-ordered set of sources keyed by
//!   `Rc` identity, each carrying the relay handles attached to it;
//! - the **relay table**, the event names that currently have a relay
//!   attached to every source;
//! - two **listener registries**, one for relayed events and one for the
//!   [`Lifecycle`] notifications.
//!
//! # Invariants
//!
//! - A relay for event E exists iff the multiplexer has at least one
//!   subscriber for E.
//! - Every registered source has the relay for E attached iff the relay for
//!   E exists, and holds exactly one handle for it.
//! - Removing a source, or dropping the last multiplexer handle, detaches
//!   every relay attached to that source.
//!
//! Internal state is never borrowed while a handler runs, so handlers may
//! call back into the multiplexer. A handler stored on the multiplexer should
//! capture a [`WeakMultiplexer`] from [`Multiplexer::downgrade`] rather than a
//! clone: a strong handle inside the multiplexer's own registry keeps it
//! alive, and its relays stay attached after every other handle is gone.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::{IndexMap, IndexSet};

use confluence_events::{Emitter, Handler, ListenerId, Observable};

use crate::{Lifecycle, Relayed, Sources};

// ---------------------------------------------------------------------------
// Source registry
// ---------------------------------------------------------------------------

/// Identity of a source: the address of its `Rc` allocation.
///
/// The registry holds a strong reference to every registered source, so an
/// address cannot be reused while its key is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SourceKey(usize);

impl SourceKey {
    fn of<S: ?Sized>(source: &Rc<S>) -> Self {
        Self(Rc::as_ptr(source).cast::<()>().addr())
    }
}

/// A registered source and the relays attached to it.
struct SourceEntry<S: ?Sized> {
    source: Rc<S>,
    /// Relay handle per event name, as returned by the source's `subscribe`,
    /// in the order the relays were attached.
    relays: IndexMap<String, ListenerId>,
}

impl<S: ?Sized> SourceEntry<S> {
    /// Detach every relay from this source.
    fn detach_all<A>(&mut self)
    where
        S: Observable<A>,
    {
        for (event, id) in self.relays.drain(..) {
            self.source.unsubscribe(&event, id);
        }
    }
}

struct State<S: ?Sized> {
    sources: IndexMap<SourceKey, SourceEntry<S>>,
    /// Event names with an active relay.
    relays: IndexSet<String>,
}

struct Inner<S: Observable<A> + ?Sized, A> {
    state: RefCell<State<S>>,
    listeners: Emitter<Relayed<S, A>>,
    lifecycle: Emitter<Rc<S>>,
}

impl<S: Observable<A> + ?Sized, A> Drop for Inner<S, A> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        for entry in state.sources.values_mut() {
            entry.detach_all::<A>();
        }
    }
}

// ---------------------------------------------------------------------------
// Multiplexer
// ---------------------------------------------------------------------------

/// Aggregates a dynamic set of sources into a single observable.
///
/// `S` is the source type and `A` the argument type its events carry. The
/// multiplexer is itself [`Observable`] over [`Relayed<S, A>`], so it can be
/// handed to anything that accepts a source, including another multiplexer.
///
/// Cloning a `Multiplexer` yields another handle to the same state. When the
/// last handle is dropped every relay is detached from every source. Use
/// [`downgrade`](Self::downgrade) for handles that must not keep it alive.
pub struct Multiplexer<S: Observable<A> + ?Sized, A> {
    inner: Rc<Inner<S, A>>,
}

impl<S, A> Multiplexer<S, A>
where
    S: Observable<A> + ?Sized + 'static,
    A: Clone + 'static,
{
    /// Create a multiplexer with no sources and no subscribers.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(State {
                    sources: IndexMap::new(),
                    relays: IndexSet::new(),
                }),
                listeners: Emitter::new(),
                lifecycle: Emitter::new(),
            }),
        }
    }

    /// Create a handle that does not keep the multiplexer alive.
    pub fn downgrade(&self) -> WeakMultiplexer<S, A> {
        WeakMultiplexer {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // -- Source set ---------------------------------------------------------

    /// Start observing `source`.
    ///
    /// Every active relay is attached to the source, then
    /// [`Lifecycle::ObjectAdded`] is emitted. Adding a source that is already
    /// registered does nothing and returns `false`.
    pub fn add(&self, source: &Rc<S>) -> bool {
        let key = SourceKey::of(source);
        let relay_count = {
            let mut state = self.inner.state.borrow_mut();
            if state.sources.contains_key(&key) {
                tracing::trace!("Source already registered, add ignored");
                return false;
            }

            let relays: IndexMap<String, ListenerId> = state
                .relays
                .iter()
                .map(|event| {
                    let id = source.subscribe(event, self.relay(source, event));
                    (event.clone(), id)
                })
                .collect();
            let relay_count = relays.len();
            state.sources.insert(
                key,
                SourceEntry {
                    source: Rc::clone(source),
                    relays,
                },
            );
            relay_count
        };

        tracing::debug!(
            relays = relay_count,
            sources = self.len(),
            "Source added"
        );
        self.inner
            .lifecycle
            .emit(Lifecycle::ObjectAdded.as_str(), source);
        true
    }

    /// Start observing every source in `sources`, in order.
    ///
    /// Each source is evaluated independently, so a duplicate within the
    /// same call is added once. Returns how many sources were newly added.
    pub fn add_many<'a, I>(&self, sources: I) -> usize
    where
        I: IntoIterator<Item = &'a Rc<S>>,
    {
        sources
            .into_iter()
            .filter(|source| self.add(source))
            .count()
    }

    /// Stop observing `source`.
    ///
    /// Every relay attached to the source is detached, then
    /// [`Lifecycle::ObjectRemoved`] is emitted. Removing a source that is not
    /// registered does nothing and returns `false`.
    pub fn remove(&self, source: &Rc<S>) -> bool {
        let entry = {
            let mut state = self.inner.state.borrow_mut();
            let Some(mut entry) = state.sources.shift_remove(&SourceKey::of(source)) else {
                tracing::trace!("Source not registered, remove ignored");
                return false;
            };
            let relay_count = entry.relays.len();
            entry.detach_all::<A>();
            tracing::debug!(
                relays = relay_count,
                sources = state.sources.len(),
                "Source removed"
            );
            entry
        };

        self.inner
            .lifecycle
            .emit(Lifecycle::ObjectRemoved.as_str(), &entry.source);
        true
    }

    /// Stop observing every source in `sources`, in order.
    ///
    /// Returns how many sources were actually removed.
    pub fn remove_many<'a, I>(&self, sources: I) -> usize
    where
        I: IntoIterator<Item = &'a Rc<S>>,
    {
        sources
            .into_iter()
            .filter(|source| self.remove(source))
            .count()
    }

    /// Return whether `source` is currently registered.
    pub fn has(&self, source: &Rc<S>) -> bool {
        self.inner
            .state
            .borrow()
            .sources
            .contains_key(&SourceKey::of(source))
    }

    /// Return a snapshot of the registered sources, in insertion order.
    pub fn values(&self) -> Sources<S> {
        let snapshot = self
            .inner
            .state
            .borrow()
            .sources
            .values()
            .map(|entry| Rc::clone(&entry.source))
            .collect();
        Sources::new(snapshot)
    }

    /// Return the number of registered sources.
    pub fn len(&self) -> usize {
        self.inner.state.borrow().sources.len()
    }

    /// Return whether no source is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.state.borrow().sources.is_empty()
    }

    // -- Subscriptions ------------------------------------------------------

    /// Register `handler` for events named `event` from any source.
    ///
    /// The first subscriber for an event name attaches a relay for it to
    /// every registered source. Later subscribers share that relay.
    pub fn subscribe(&self, event: &str, handler: Handler<Relayed<S, A>>) -> ListenerId {
        let id = self.inner.listeners.subscribe(event, handler);
        self.attach_relay(event);
        id
    }

    /// Register a plain closure for events named `event` from any source.
    pub fn subscribe_fn<F>(&self, event: &str, handler: F) -> ListenerId
    where
        F: Fn(&Relayed<S, A>) + 'static,
    {
        self.subscribe(event, Rc::new(handler))
    }

    /// Unregister the handler identified by `id` from `event`.
    ///
    /// When the last subscriber for `event` leaves, its relay is detached
    /// from every source. Returns `false` if no such handler was registered.
    pub fn unsubscribe(&self, event: &str, id: ListenerId) -> bool {
        if !self.inner.listeners.unsubscribe(event, id) {
            return false;
        }
        if self.inner.listeners.listener_count(event) == 0 {
            self.detach_relay(event);
        }
        true
    }

    /// Unregister every handler for `event` and detach its relay.
    ///
    /// Returns how many handlers were removed.
    pub fn unsubscribe_all(&self, event: &str) -> usize {
        let removed = self.inner.listeners.unsubscribe_all(event);
        self.detach_relay(event);
        removed
    }

    /// Return the number of handlers registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.inner.listeners.listener_count(event)
    }

    /// Return the event names that currently have a relay attached, in the
    /// order the relays were created.
    pub fn event_names(&self) -> Vec<String> {
        self.inner.state.borrow().relays.iter().cloned().collect()
    }

    /// Register `handler` for a membership notification.
    pub fn subscribe_lifecycle(&self, kind: Lifecycle, handler: Handler<Rc<S>>) -> ListenerId {
        self.inner.lifecycle.subscribe(kind.as_str(), handler)
    }

    /// Register a plain closure for a membership notification.
    pub fn subscribe_lifecycle_fn<F>(&self, kind: Lifecycle, handler: F) -> ListenerId
    where
        F: Fn(&Rc<S>) + 'static,
    {
        self.subscribe_lifecycle(kind, Rc::new(handler))
    }

    /// Unregister a membership notification handler.
    pub fn unsubscribe_lifecycle(&self, kind: Lifecycle, id: ListenerId) -> bool {
        self.inner.lifecycle.unsubscribe(kind.as_str(), id)
    }

    // -- Relays -------------------------------------------------------------

    /// Build the relay forwarding `event` from `source` to this multiplexer.
    ///
    /// The relay holds weak references only: a source never keeps the
    /// multiplexer alive, and the multiplexer's own strong reference to the
    /// source does not become a cycle.
    fn relay(&self, source: &Rc<S>, event: &str) -> Handler<A> {
        let inner: Weak<Inner<S, A>> = Rc::downgrade(&self.inner);
        let origin: Weak<S> = Rc::downgrade(source);
        let event = event.to_owned();
        Rc::new(move |args: &A| {
            let (Some(inner), Some(source)) = (inner.upgrade(), origin.upgrade()) else {
                return;
            };
            inner.listeners.emit(
                &event,
                &Relayed {
                    source,
                    args: args.clone(),
                },
            );
        })
    }

    /// Attach a relay for `event` to every source, unless one already exists.
    fn attach_relay(&self, event: &str) {
        let mut state = self.inner.state.borrow_mut();
        if !state.relays.insert(event.to_owned()) {
            return;
        }
        for entry in state.sources.values_mut() {
            let id = entry
                .source
                .subscribe(event, self.relay(&entry.source, event));
            entry.relays.insert(event.to_owned(), id);
        }
        tracing::debug!(event, sources = state.sources.len(), "Relay attached");
    }

    /// Detach the relay for `event` from every source, if one exists.
    fn detach_relay(&self, event: &str) {
        let mut state = self.inner.state.borrow_mut();
        if !state.relays.shift_remove(event) {
            return;
        }
        let detached = state
            .sources
            .values_mut()
            .filter_map(|entry| {
                let id = entry.relays.shift_remove(event)?;
                Some(entry.source.unsubscribe(event, id))
            })
            .count();
        tracing::debug!(event, sources = detached, "Relay detached");
    }
}

impl<S, A> Observable<Relayed<S, A>> for Multiplexer<S, A>
where
    S: Observable<A> + ?Sized + 'static,
    A: Clone + 'static,
{
    fn subscribe(&self, event: &str, handler: Handler<Relayed<S, A>>) -> ListenerId {
        Self::subscribe(self, event, handler)
    }

    fn unsubscribe(&self, event: &str, id: ListenerId) -> bool {
        Self::unsubscribe(self, event, id)
    }
}

impl<S, A> Default for Multiplexer<S, A>
where
    S: Observable<A> + ?Sized + 'static,
    A: Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Observable<A> + ?Sized, A> Clone for Multiplexer<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

// ---------------------------------------------------------------------------
// Weak handle
// ---------------------------------------------------------------------------

/// A non-owning handle to a [`Multiplexer`].
///
/// Handlers registered on a multiplexer capture this instead of a clone, so
/// that dropping the last [`Multiplexer`] still detaches every relay.
pub struct WeakMultiplexer<S: Observable<A> + ?Sized, A> {
    inner: Weak<Inner<S, A>>,
}

impl<S: Observable<A> + ?Sized, A> WeakMultiplexer<S, A> {
    /// Return a strong handle, or `None` if the multiplexer has been dropped.
    pub fn upgrade(&self) -> Option<Multiplexer<S, A>> {
        self.inner.upgrade().map(|inner| Multiplexer { inner })
    }
}

impl<S: Observable<A> + ?Sized, A> Clone for WeakMultiplexer<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S: Observable<A> + ?Sized, A> core::fmt::Debug for WeakMultiplexer<S, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WeakMultiplexer")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl<S: Observable<A> + ?Sized, A> core::fmt::Debug for Multiplexer<S, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Multiplexer")
            .field("sources", &state.sources.len())
            .field("relays", &state.relays)
            .field("listeners", &self.inner.listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    type Mux = Multiplexer<Emitter<u32>, u32>;

    fn source() -> Rc<Emitter<u32>> {
        Rc::new(Emitter::new())
    }

    /// Convenience: a shared hit counter and a handler that bumps it.
    fn counter() -> (Rc<Cell<usize>>, impl Fn(&Relayed<Emitter<u32>, u32>) + 'static) {
        let hits = Rc::new(Cell::new(0_usize));
        let bump = Rc::clone(&hits);
        (hits, move |_: &Relayed<Emitter<u32>, u32>| bump.set(bump.get() + 1))
    }

    // ---------------------------------------------------------------------
    // Membership
    // ---------------------------------------------------------------------

    #[test]
    fn new_multiplexer_is_empty() {
        let mux = Mux::new();
        assert!(mux.is_empty());
        assert_eq!(mux.len(), 0);
        assert!(mux.event_names().is_empty());
    }

    #[test]
    fn add_is_idempotent() {
        let mux = Mux::new();
        let a = source();

        assert!(mux.add(&a));
        assert!(!mux.add(&a));
        assert_eq!(mux.len(), 1);
        assert!(mux.has(&a));
    }

    #[test]
    fn add_many_counts_duplicates_once() {
        let mux = Mux::new();
        let a = source();
        let b = source();

        assert_eq!(mux.add_many([&a, &b, &a]), 2);
        assert_eq!(mux.len(), 2);
    }

    #[test]
    fn remove_unregistered_is_noop() {
        let mux = Mux::new();
        let a = source();

        assert!(!mux.remove(&a));
        mux.add(&a);
        assert!(mux.remove(&a));
        assert!(!mux.remove(&a));
        assert!(!mux.has(&a));
    }

    #[test]
    fn values_preserves_insertion_order_after_removal() {
        let mux = Mux::new();
        let (a, b, c) = (source(), source(), source());
        mux.add_many([&a, &b, &c]);
        mux.remove(&b);

        let values: Vec<_> = mux.values().collect();
        assert_eq!(values.len(), 2);
        assert!(values.first().is_some_and(|first| Rc::ptr_eq(first, &a)));
        assert!(values.get(1).is_some_and(|second| Rc::ptr_eq(second, &c)));
    }

    #[test]
    fn values_is_a_snapshot() {
        let mux = Mux::new();
        let a = source();
        mux.add(&a);

        let snapshot = mux.values();
        mux.add(&source());

        assert_eq!(snapshot.len(), 1);
        assert_eq!(mux.values().len(), 2);
    }

    #[test]
    fn equal_sources_are_distinct_members() {
        let mux = Multiplexer::<Emitter<u32>, u32>::new();
        let a = source();
        let twin = source();

        mux.add(&a);
        assert!(!mux.has(&twin));
        assert!(mux.has(&Rc::clone(&a)));
    }

    // ---------------------------------------------------------------------
    // Relay bookkeeping
    // ---------------------------------------------------------------------

    #[test]
    fn one_relay_per_source_regardless_of_subscribers() {
        let mux = Mux::new();
        let (a, b) = (source(), source());
        mux.add_many([&a, &b]);
        assert_eq!(a.listener_count("EVENT") + b.listener_count("EVENT"), 0);

        mux.subscribe_fn("EVENT", |_| {});
        assert_eq!(a.listener_count("EVENT") + b.listener_count("EVENT"), 2);

        mux.subscribe_fn("EVENT", |_| {});
        assert_eq!(a.listener_count("EVENT") + b.listener_count("EVENT"), 2);
        assert_eq!(mux.event_names(), vec!["EVENT".to_owned()]);
    }

    #[test]
    fn late_source_gets_existing_relays() {
        let mux = Mux::new();
        mux.subscribe_fn("x", |_| {});
        mux.subscribe_fn("y", |_| {});

        let a = source();
        mux.add(&a);

        assert_eq!(a.listener_count("x"), 1);
        assert_eq!(a.listener_count("y"), 1);
    }

    #[test]
    fn last_unsubscribe_detaches_relay() {
        let mux = Mux::new();
        let a = source();
        mux.add(&a);

        let first = mux.subscribe_fn("EVENT", |_| {});
        let second = mux.subscribe_fn("EVENT", |_| {});

        assert!(mux.unsubscribe("EVENT", first));
        assert_eq!(a.listener_count("EVENT"), 1);

        assert!(mux.unsubscribe("EVENT", second));
        assert_eq!(a.listener_count("EVENT"), 0);
        assert!(mux.event_names().is_empty());
    }

    #[test]
    fn unsubscribe_unknown_keeps_relay() {
        let mux = Mux::new();
        let a = source();
        mux.add(&a);
        let id = mux.subscribe_fn("EVENT", |_| {});

        assert!(!mux.unsubscribe("EVENT", ListenerId::new()));
        assert!(!mux.unsubscribe("OTHER", id));
        assert_eq!(a.listener_count("EVENT"), 1);
    }

    #[test]
    fn unsubscribe_all_detaches_relay() {
        let mux = Mux::new();
        let a = source();
        mux.add(&a);
        mux.subscribe_fn("EVENT", |_| {});
        mux.subscribe_fn("EVENT", |_| {});

        assert_eq!(mux.unsubscribe_all("EVENT"), 2);
        assert_eq!(a.listener_count("EVENT"), 0);
        assert_eq!(mux.listener_count("EVENT"), 0);
    }

    #[test]
    fn remove_detaches_every_relay() {
        let mux = Mux::new();
        let a = source();
        mux.add(&a);
        mux.subscribe_fn("x", |_| {});
        mux.subscribe_fn("y", |_| {});

        mux.remove(&a);

        assert_eq!(a.listener_count("x"), 0);
        assert_eq!(a.listener_count("y"), 0);
        assert!(a.event_names().is_empty());
    }

    #[test]
    fn source_baseline_listeners_are_untouched() {
        let mux = Mux::new();
        let a = source();
        a.subscribe_fn("EVENT", |_| {});
        mux.add(&a);

        let id = mux.subscribe_fn("EVENT", |_| {});
        assert_eq!(a.listener_count("EVENT"), 2);

        mux.unsubscribe("EVENT", id);
        assert_eq!(a.listener_count("EVENT"), 1);
    }

    #[test]
    fn dropping_multiplexer_detaches_relays() {
        let a = source();
        {
            let mux = Mux::new();
            mux.add(&a);
            mux.subscribe_fn("EVENT", |_| {});
            assert_eq!(a.listener_count("EVENT"), 1);
        }
        assert_eq!(a.listener_count("EVENT"), 0);
    }

    #[test]
    fn calling_back_through_weak_handle_still_detaches_on_drop() {
        let a = source();
        let seen = Rc::new(Cell::new(0_usize));
        let weak = {
            let mux = Mux::new();
            mux.add(&a);
            let handle = mux.downgrade();
            let seen = Rc::clone(&seen);
            mux.subscribe_fn("EVENT", move |relayed| {
                if handle.upgrade().is_some_and(|mux| mux.has(&relayed.source)) {
                    seen.set(seen.get() + 1);
                }
            });

            a.emit("EVENT", &1);
            assert_eq!(a.listener_count("EVENT"), 1);
            mux.downgrade()
        };

        assert_eq!(seen.get(), 1);
        assert_eq!(a.listener_count("EVENT"), 0);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn upgrade_yields_a_shared_handle() {
        let mux = Mux::new();
        let a = source();
        let weak = mux.downgrade();

        assert!(weak.upgrade().is_some_and(|handle| handle.add(&a)));
        assert!(mux.has(&a));
    }

    /// A source that records the event name of every relay detached from it.
    #[derive(Default)]
    struct Recording {
        events: Emitter<u32>,
        detached: RefCell<Vec<String>>,
    }

    impl Observable<u32> for Recording {
        fn subscribe(&self, event: &str, handler: Handler<u32>) -> ListenerId {
            self.events.subscribe(event, handler)
        }

        fn unsubscribe(&self, event: &str, id: ListenerId) -> bool {
            self.detached.borrow_mut().push(event.to_owned());
            self.events.unsubscribe(event, id)
        }
    }

    #[test]
    fn remove_detaches_relays_in_attach_order() {
        let mux = Multiplexer::<Recording, u32>::new();
        let a = Rc::new(Recording::default());
        mux.add(&a);
        for event in ["x", "y", "z"] {
            mux.subscribe_fn(event, |_| {});
        }
        mux.unsubscribe_all("y");
        mux.subscribe_fn("y", |_| {});
        a.detached.borrow_mut().clear();

        mux.remove(&a);

        assert_eq!(*a.detached.borrow(), vec!["x", "z", "y"]);
        assert!(a.events.event_names().is_empty());
    }

    #[test]
    fn clones_share_state() {
        let mux = Mux::new();
        let handle = mux.clone();
        let a = source();

        handle.add(&a);
        assert!(mux.has(&a));

        drop(handle);
        mux.subscribe_fn("EVENT", |_| {});
        assert_eq!(a.listener_count("EVENT"), 1);
    }

    // ---------------------------------------------------------------------
    // Forwarding
    // ---------------------------------------------------------------------

    #[test]
    fn relayed_event_carries_source_and_args() {
        let mux = Mux::new();
        let (a, b) = (source(), source());
        mux.add_many([&a, &b]);

        let seen: Rc<RefCell<Vec<(bool, u32)>>> = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = Rc::clone(&seen);
            let a = Rc::clone(&a);
            mux.subscribe_fn("EVENT", move |relayed| {
                seen.borrow_mut().push((relayed.is_from(&a), relayed.args));
            });
        }

        a.emit("EVENT", &7);
        b.emit("EVENT", &8);

        assert_eq!(*seen.borrow(), vec![(true, 7), (false, 8)]);
    }

    #[test]
    fn removed_source_no_longer_forwards() {
        let mux = Mux::new();
        let a = source();
        mux.add(&a);
        let (hits, handler) = counter();
        mux.subscribe_fn("EVENT", handler);

        a.emit("EVENT", &1);
        mux.remove(&a);
        a.emit("EVENT", &1);

        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn other_event_names_are_not_forwarded() {
        let mux = Mux::new();
        let a = source();
        mux.add(&a);
        let (hits, handler) = counter();
        mux.subscribe_fn("EVENT", handler);

        a.emit("OTHER", &1);

        assert_eq!(hits.get(), 0);
        assert_eq!(a.listener_count("OTHER"), 0);
    }

    #[test]
    fn handler_may_remove_the_emitting_source() {
        let mux = Mux::new();
        let a = source();
        mux.add(&a);
        let (hits, handler) = counter();
        mux.subscribe_fn("EVENT", handler);
        {
            let handle = mux.downgrade();
            mux.subscribe_fn("EVENT", move |relayed| {
                if let Some(mux) = handle.upgrade() {
                    mux.remove(&relayed.source);
                }
            });
        }

        a.emit("EVENT", &1);
        a.emit("EVENT", &1);

        assert_eq!(hits.get(), 1);
        assert!(!mux.has(&a));
    }

    // ---------------------------------------------------------------------
    // Lifecycle notifications
    // ---------------------------------------------------------------------

    #[test]
    fn lifecycle_fires_only_on_real_changes() {
        let mux = Mux::new();
        let a = source();
        let added = Rc::new(Cell::new(0_usize));
        let removed = Rc::new(Cell::new(0_usize));
        {
            let added = Rc::clone(&added);
            let target = Rc::clone(&a);
            mux.subscribe_lifecycle_fn(Lifecycle::ObjectAdded, move |source| {
                assert!(Rc::ptr_eq(source, &target));
                added.set(added.get() + 1);
            });
        }
        {
            let removed = Rc::clone(&removed);
            mux.subscribe_lifecycle_fn(Lifecycle::ObjectRemoved, move |_| {
                removed.set(removed.get() + 1);
            });
        }

        mux.add(&a);
        mux.add(&a);
        mux.remove(&a);
        mux.remove(&a);

        assert_eq!(added.get(), 1);
        assert_eq!(removed.get(), 1);
    }

    #[test]
    fn lifecycle_handlers_do_not_create_relays() {
        let mux = Mux::new();
        let a = source();
        mux.add(&a);

        let id = mux.subscribe_lifecycle_fn(Lifecycle::ObjectAdded, |_| {});

        assert!(mux.event_names().is_empty());
        assert!(a.event_names().is_empty());
        assert!(mux.unsubscribe_lifecycle(Lifecycle::ObjectAdded, id));
        assert!(!mux.unsubscribe_lifecycle(Lifecycle::ObjectRemoved, id));
    }

    #[test]
    fn added_notification_sees_source_registered() {
        let mux = Mux::new();
        let a = source();
        let registered = Rc::new(Cell::new(false));
        {
            let handle = mux.downgrade();
            let registered = Rc::clone(&registered);
            mux.subscribe_lifecycle_fn(Lifecycle::ObjectAdded, move |source| {
                registered.set(handle.upgrade().is_some_and(|mux| mux.has(source)));
            });
        }

        mux.add(&a);
        assert!(registered.get());
    }
}
