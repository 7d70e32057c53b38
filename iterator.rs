//! Cursor-style iteration over a database's contents.

use crate::error::StoreError;
use crate::value::Entry;

/// An iterator over a database's entries.
///
/// Ordering is fixed at creation time via the `ordered` argument passed to
/// [`Database::iterator`](crate::Database::iterator): unordered iterators may
/// emit in whatever order is cheapest for the backend (insertion order, hash
/// order, ...), ordered iterators emit ascending by unsigned byte comparison
/// of the key.
///
/// Teardown is `Drop`: any entries a backend pre-fetched but the caller never
/// consumed are dropped along with the iterator, which runs their `Value`
/// release hooks. No explicit close call is needed or provided.
pub trait DbIterator: Iterator<Item = Result<Entry, StoreError>> {}

impl<T> DbIterator for T where T: Iterator<Item = Result<Entry, StoreError>> {}
