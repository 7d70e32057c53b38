//! Point-in-time, read-only freezes of a database.

use std::fmt::Debug;

use crate::error::StoreError;
use crate::iterator::DbIterator;

/// A frozen view of a database's contents as of the moment it was created.
///
/// Mutations on the source database after the snapshot was taken are
/// invisible through it. Teardown is `Drop`; no explicit close call exists.
pub trait Snapshot: Debug {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    fn contains(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// Iteration over a snapshot is optional; backends that don't support it
    /// (or haven't implemented it yet) return `Unsupported`.
    fn iterator(&self, _ordered: bool) -> Result<Box<dyn DbIterator + '_>, StoreError> {
        Err(StoreError::unsupported("snapshot iteration"))
    }
}
