//! Named-event observers for the Confluence workspace.
//!
//! Anything that can register and unregister handlers for named events is an
//! [`Observable`]. This crate defines that capability, the [`ListenerId`]
//! handle every subscription returns, and [`Emitter`], the standard
//! in-process implementation.
//!
//! # Model
//!
//! - Events are identified by name (`&str`).
//! - Every handler of an observable receives the same argument type `A`.
//! - Dispatch is synchronous and single-threaded: handlers run to completion
//!   on the emitting thread, in registration order.
//! - Handlers are shared closures (`Rc<dyn Fn(&A)>`), so observables are
//!   deliberately `!Send`.
//!
//! # Usage
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use confluence_events::{Emitter, Observable};
//!
//! let emitter = Emitter::<u32>::new();
//! let total = Rc::new(Cell::new(0_u32));
//!
//! let sum = Rc::clone(&total);
//! let id = emitter.subscribe_fn("add", move |n| sum.set(sum.get() + n));
//!
//! emitter.emit("add", &2);
//! emitter.emit("add", &3);
//! assert_eq!(total.get(), 5);
//!
//! assert!(emitter.unsubscribe("add", id));
//! assert_eq!(emitter.emit("add", &4), 0);
//! ```

pub mod emitter;
pub mod ids;

use std::rc::Rc;

// Re-export primary types at crate root.
pub use emitter::Emitter;
pub use ids::ListenerId;

/// A shared event handler receiving the event arguments by reference.
pub type Handler<A> = Rc<dyn Fn(&A)>;

/// The capability to register and unregister handlers for named events.
///
/// Implementations must not call back into whoever is subscribing from
/// inside `subscribe` or `unsubscribe`; handlers are only ever invoked when
/// the observable emits.
pub trait Observable<A: ?Sized> {
    /// Register `handler` for `event` and return the handle identifying it.
    fn subscribe(&self, event: &str, handler: Handler<A>) -> ListenerId;

    /// Unregister the handler identified by `id` from `event`.
    ///
    /// Returns `false` if no such handler was registered for `event`.
    fn unsubscribe(&self, event: &str, id: ListenerId) -> bool;

    /// Register a plain closure for `event`.
    fn subscribe_fn<F>(&self, event: &str, handler: F) -> ListenerId
    where
        F: Fn(&A) + 'static,
        Self: Sized,
    {
        self.subscribe(event, Rc::new(handler))
    }
}
