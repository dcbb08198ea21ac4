//! Type-safe listener handles wrapping [`Uuid`].
//!
//! Closures cannot be compared for equality, so every subscription is
//! identified by the handle returned when it was registered. Handles use
//! UUID v7, which is unique within the process and time-ordered.

use uuid::Uuid;

/// Handle identifying one registered handler on one observable.
///
/// Returned by [`Observable::subscribe`](crate::Observable::subscribe) and
/// passed back to [`Observable::unsubscribe`](crate::Observable::unsubscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Create a new listener handle using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ListenerId> for Uuid {
    fn from(id: ListenerId) -> Self {
        id.0
    }
}
