//! Snapshot iteration over a multiplexer's sources.

use std::rc::Rc;

/// Iterator over the sources registered with a
/// [`Multiplexer`](crate::Multiplexer) at the time
/// [`values`](crate::Multiplexer::values) was called, in insertion order.
///
/// Later `add`/`remove` calls do not affect an existing iterator. Clone it to
/// restart from the current position.
pub struct Sources<S: ?Sized> {
    snapshot: std::vec::IntoIter<Rc<S>>,
}

impl<S: ?Sized> Sources<S> {
    pub(crate) fn new(snapshot: Vec<Rc<S>>) -> Self {
        Self {
            snapshot: snapshot.into_iter(),
        }
    }
}

impl<S: ?Sized> Iterator for Sources<S> {
    type Item = Rc<S>;

    fn next(&mut self) -> Option<Self::Item> {
        self.snapshot.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.snapshot.size_hint()
    }
}

impl<S: ?Sized> ExactSizeIterator for Sources<S> {}

impl<S: ?Sized> DoubleEndedIterator for Sources<S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.snapshot.next_back()
    }
}

impl<S: ?Sized> Clone for Sources<S> {
    fn clone(&self) -> Self {
        Self {
            snapshot: self.snapshot.clone(),
        }
    }
}

impl<S: ?Sized> core::fmt::Debug for Sources<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sources")
            .field("remaining", &self.snapshot.len())
            .finish()
    }
}
