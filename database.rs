//! The uniform database contract every backend implements.

use std::fmt::Debug;

use crate::error::StoreError;
use crate::flags::{ReadFlags, WriteFlags};
use crate::iterator::DbIterator;
use crate::metrics::Metric;
use crate::partition::PartitionName;
use crate::snapshot::Snapshot;
use crate::sorted_view::SortedView;
use crate::value::Value;

/// The value half of a `put`: either a value to store, or an explicit
/// tombstone. Kept distinct from an empty value: `PutValue::Value(vec![])`
/// stores zero bytes under the key, `PutValue::Delete` removes it.
#[derive(Debug, Clone)]
pub enum PutValue {
    Value(Vec<u8>),
    Delete,
}

impl From<Vec<u8>> for PutValue {
    fn from(bytes: Vec<u8>) -> Self {
        PutValue::Value(bytes)
    }
}

impl From<&[u8]> for PutValue {
    fn from(bytes: &[u8]) -> Self {
        PutValue::Value(bytes.to_vec())
    }
}

/// A single queued mutation, shared by [`WriteBatch`](crate::WriteBatch) and
/// a backend's atomic batch primitive.
#[derive(Debug, Clone)]
pub enum WriteOpRef<'a> {
    Put(&'a [u8], &'a [u8]),
    Delete(&'a [u8]),
    Merge(&'a [u8], &'a [u8]),
}

/// This trait is the single uniform contract every storage backend in this
/// crate implements: a logically partitioned key-value store with optional
/// capabilities (write batching, merge, multi-get, sorted views) discovered
/// at runtime via the `supports_*` predicates rather than assumed.
///
/// Every method here is synchronous and completes before returning; there
/// are no suspension points. Implementations are `Send + Sync` so handles
/// may be shared across threads, but nothing about the contract itself
/// serializes concurrent callers; a backend that needs that provides its
/// own internal locking.
pub trait Database: Debug + Send + Sync {
    /// Identity of this partition.
    fn name(&self) -> PartitionName;

    /// Reads a single key. Returns `Ok(None)` for absence — never an error.
    fn get(&self, key: &[u8], flags: ReadFlags) -> Result<Option<Value>, StoreError>;

    /// Parallel-shape lookup: `result[i]` corresponds to `keys[i]`.
    ///
    /// The default implementation performs sequential `get` calls; a backend
    /// with a native batched read primitive overrides this and also flips
    /// [`Database::supports_multi_get`].
    fn multi_get(
        &self,
        keys: &[&[u8]],
        flags: ReadFlags,
    ) -> Result<Vec<Option<Value>>, StoreError> {
        keys.iter().map(|k| self.get(k, flags)).collect()
    }

    /// Stores `value`, or deletes `key` if `value` is `PutValue::Delete`.
    fn put(&self, key: &[u8], value: PutValue, flags: WriteFlags) -> Result<(), StoreError>;

    /// Explicit remove; a no-op if `key` is already absent.
    fn delete(&self, key: &[u8], flags: WriteFlags) -> Result<(), StoreError> {
        self.put(key, PutValue::Delete, flags)
    }

    /// Existence check. Counts as a read.
    fn contains(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.get(key, ReadFlags::NONE)?.is_some())
    }

    /// Creates an iterator over every entry. `ordered` selects ascending
    /// lexicographic key order (§4.3); unordered may emit in whatever order
    /// is cheapest for this backend.
    fn iterator(&self, ordered: bool) -> Result<Box<dyn DbIterator + '_>, StoreError>;

    /// Freezes the current contents into an independent, read-only view.
    fn snapshot(&self) -> Result<Box<dyn Snapshot + '_>, StoreError>;

    /// Durability barrier. May be a no-op for backends with nothing to flush.
    fn flush(&self, only_wal: bool) -> Result<(), StoreError>;

    /// Wipes every entry. May be unsupported.
    fn clear(&self) -> Result<(), StoreError>;

    /// Reorganization hint. May be a no-op.
    fn compact(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Diagnostics snapshot; see [`Metric`].
    fn gather_metric(&self) -> Metric;

    // --- optional capabilities -------------------------------------------
    //
    // Each of these is paired with a `supports_*` discovery predicate. The
    // predicate defaults to `false` and the operation defaults to
    // `Unsupported`; a capable backend overrides both together.

    fn supports_write_batch(&self) -> bool {
        false
    }

    /// Applies a sequence of put/delete/merge operations atomically.
    fn write_batch(&self, _ops: &[WriteOpRef<'_>]) -> Result<(), StoreError> {
        Err(StoreError::unsupported("write_batch"))
    }

    fn supports_merge(&self) -> bool {
        false
    }

    /// Engine-level read-modify-write; operator semantics are backend-defined
    /// and must be documented alongside whichever backend advertises this.
    fn merge(&self, _key: &[u8], _value: &[u8], _flags: WriteFlags) -> Result<(), StoreError> {
        Err(StoreError::unsupported("merge"))
    }

    fn supports_multi_get(&self) -> bool {
        false
    }

    fn supports_sorted_view(&self) -> bool {
        false
    }

    fn first_key(&self) -> Result<Option<Value>, StoreError> {
        Err(StoreError::unsupported("first_key"))
    }

    fn last_key(&self) -> Result<Option<Value>, StoreError> {
        Err(StoreError::unsupported("last_key"))
    }

    fn get_view_between(
        &self,
        _inclusive_low: &[u8],
        _exclusive_high: &[u8],
    ) -> Result<SortedView, StoreError> {
        Err(StoreError::unsupported("get_view_between"))
    }
}
