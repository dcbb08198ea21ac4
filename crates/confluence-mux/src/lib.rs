//! Event multiplexing over a dynamic set of observable sources.
//!
//! A [`Multiplexer`] observes any number of sources that implement
//! [`Observable`](confluence_events::Observable) and exposes a single
//! subscription point over all of them. Every event a source emits is
//! re-emitted on the multiplexer under the same name, as a [`Relayed`]
//! value carrying the originating source and the original arguments.
//!
//! # Architecture
//!
//! The crate provides two modules:
//!
//! - [`multiplexer`] -- The [`Multiplexer`] struct: source registry, relay
//!   bookkeeping and the multiplexer's own listener registry.
//! - [`sources`] -- The [`Sources`] snapshot iterator returned by
//!   [`Multiplexer::values`].
//!
//! # Relays
//!
//! Relays are attached lazily. The multiplexer attaches exactly one relay per
//! (source, event name) while it has at least one subscriber for that event
//! name, and detaches it when the last subscriber leaves or the source is
//! removed:
//!
//! | Operation | Effect on relays |
//! |-----------|------------------|
//! | first `subscribe(E)` | attach relay for E to every source |
//! | later `subscribe(E)` | none |
//! | last `unsubscribe(E)` | detach relay for E from every source |
//! | `add(s)` | attach every active relay to `s` |
//! | `remove(s)` | detach every relay from `s` |
//!
//! Membership changes are announced through the two [`Lifecycle`]
//! notifications, which are kept apart from relay accounting.
//!
//! # Usage
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use confluence_events::Emitter;
//! use confluence_mux::Multiplexer;
//!
//! let mux = Multiplexer::<Emitter<u32>, u32>::new();
//! let a = Rc::new(Emitter::new());
//! let b = Rc::new(Emitter::new());
//! mux.add_many([&a, &b]);
//!
//! let total = Rc::new(Cell::new(0_u32));
//! let sum = Rc::clone(&total);
//! mux.subscribe_fn("add", move |relayed| sum.set(sum.get() + relayed.args));
//!
//! a.emit("add", &2);
//! b.emit("add", &3);
//! assert_eq!(total.get(), 5);
//! ```

pub mod multiplexer;
pub mod sources;

// Re-export primary types at crate root.
pub use multiplexer::{Multiplexer, WeakMultiplexer};
pub use sources::Sources;

use std::rc::Rc;

// ---------------------------------------------------------------------------
// Relayed events
// ---------------------------------------------------------------------------

/// An event re-emitted by a [`Multiplexer`] on behalf of one of its sources.
///
/// The source comes first, followed by the arguments exactly as the source
/// emitted them.
pub struct Relayed<S: ?Sized, A> {
    /// The source that emitted the event.
    pub source: Rc<S>,
    /// The arguments the source emitted.
    pub args: A,
}

impl<S: ?Sized, A> Relayed<S, A> {
    /// Return whether this event was emitted by `source` (identity, not
    /// equality).
    pub fn is_from(&self, source: &Rc<S>) -> bool {
        Rc::ptr_eq(&self.source, source)
    }
}

impl<S: ?Sized, A: Clone> Clone for Relayed<S, A> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
            args: self.args.clone(),
        }
    }
}

impl<S: ?Sized, A: core::fmt::Debug> core::fmt::Debug for Relayed<S, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Relayed")
            .field("source", &Rc::as_ptr(&self.source).cast::<()>())
            .field("args", &self.args)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Lifecycle notifications
// ---------------------------------------------------------------------------

/// The two reserved notifications announcing source-set membership changes.
///
/// Each delivers the affected source as its only argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// A source joined the set.
    ObjectAdded,
    /// A source left the set.
    ObjectRemoved,
}

impl Lifecycle {
    /// Return the notification name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ObjectAdded => "OBJECT_ADDED",
            Self::ObjectRemoved => "OBJECT_REMOVED",
        }
    }
}

impl core::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
