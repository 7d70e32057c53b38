//! Deferred, ordered write operations committed as one logical unit.

use tracing::{debug, warn};

use crate::database::{Database, PutValue, WriteOpRef};
use crate::error::StoreError;
use crate::flags::WriteFlags;

/// An owned, queued mutation. Keys and values are copied out of the caller's
/// buffers the moment they're queued, so the caller can reuse or drop its
/// own buffers immediately.
#[derive(Debug, Clone)]
pub enum WriteOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
    Merge(Vec<u8>, Vec<u8>),
}

impl WriteOp {
    fn as_ref(&self) -> WriteOpRef<'_> {
        match self {
            WriteOp::Put(k, v) => WriteOpRef::Put(k, v),
            WriteOp::Delete(k) => WriteOpRef::Delete(k),
            WriteOp::Merge(k, v) => WriteOpRef::Merge(k, v),
        }
    }
}

/// Accumulates an ordered list of put/delete/merge operations against a
/// specific target database, committing them as a single logical unit.
///
/// If the target advertises [`Database::supports_write_batch`], `commit`
/// calls the backend's atomic primitive: all-or-nothing. Otherwise `commit`
/// falls back to applying operations one at a time; on the first failure,
/// already-applied operations are **not** undone, and the *entire original
/// queue* is retained as-is for inspection or retry — callers that want to
/// skip re-applying ops that already landed must do so themselves before
/// retrying `commit`.
///
/// Teardown is `Drop`: whether or not `commit` was ever called, the queued
/// op buffer is freed when the batch goes out of scope.
pub struct WriteBatch<'db> {
    target: &'db dyn Database,
    ops: Vec<WriteOp>,
}

impl<'db> WriteBatch<'db> {
    pub fn new(target: &'db dyn Database) -> Self {
        WriteBatch {
            target,
            ops: Vec::new(),
        }
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.try_reserve_one()?;
        self.ops.push(WriteOp::Put(key.to_vec(), value.to_vec()));
        Ok(())
    }

    pub fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.try_reserve_one()?;
        self.ops.push(WriteOp::Delete(key.to_vec()));
        Ok(())
    }

    pub fn merge(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.try_reserve_one()?;
        self.ops.push(WriteOp::Merge(key.to_vec(), value.to_vec()));
        Ok(())
    }

    /// Number of queued, not-yet-committed operations.
    pub fn pending(&self) -> usize {
        self.ops.len()
    }

    /// Drops every queued op and frees the backing allocation; the batch
    /// remains usable afterward. Repeated `clear` + enqueue cycles must not
    /// grow the allocation unboundedly, so this replaces the `Vec` rather
    /// than just truncating it.
    pub fn clear(&mut self) {
        self.ops = Vec::new();
    }

    pub fn commit(&mut self) -> Result<(), StoreError> {
        let pending = self.ops.len();
        if self.target.supports_write_batch() {
            let refs: Vec<WriteOpRef<'_>> = self.ops.iter().map(WriteOp::as_ref).collect();
            self.target.write_batch(&refs)?;
            debug!(pending, "committed write batch atomically");
            self.ops.clear();
            return Ok(());
        }

        let mut applied = 0;
        for op in &self.ops {
            let result = match op {
                WriteOp::Put(k, v) => {
                    self.target
                        .put(k, PutValue::Value(v.clone()), WriteFlags::NONE)
                }
                WriteOp::Delete(k) => self.target.delete(k, WriteFlags::NONE),
                WriteOp::Merge(k, v) => self.target.merge(k, v, WriteFlags::NONE),
            };
            match result {
                Ok(()) => applied += 1,
                Err(err) => {
                    warn!(
                        applied,
                        pending,
                        "sequential write batch fallback stopped on error; retaining full queue"
                    );
                    // The queue is left untouched: already-applied ops are
                    // not rolled back, but they also aren't dropped from the
                    // queue here. A caller retrying `commit` re-applies them
                    // (puts and deletes are idempotent; a re-applied merge
                    // is the caller's responsibility to reason about).
                    return Err(err);
                }
            }
        }
        debug!(pending, "committed write batch sequentially");
        self.ops.clear();
        Ok(())
    }

    fn try_reserve_one(&mut self) -> Result<(), StoreError> {
        self.ops
            .try_reserve(1)
            .map_err(|_| StoreError::AllocationFailure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::InMemoryBackend;
    use crate::flags::ReadFlags;
    use crate::partition::PartitionName;

    #[test]
    fn atomic_commit_clears_queue() {
        let db = InMemoryBackend::new(PartitionName::State);
        let mut batch = WriteBatch::new(&db);
        batch.put(b"a", b"1").unwrap();
        batch.put(b"b", b"2").unwrap();
        assert_eq!(batch.pending(), 2);
        batch.commit().unwrap();
        assert_eq!(batch.pending(), 0);
        assert_eq!(
            db.get(b"a", ReadFlags::NONE).unwrap().unwrap().as_bytes(),
            b"1"
        );
    }

    #[test]
    fn clear_drops_queued_ops() {
        let db = InMemoryBackend::new(PartitionName::State);
        let mut batch = WriteBatch::new(&db);
        batch.put(b"a", b"1").unwrap();
        batch.clear();
        assert_eq!(batch.pending(), 0);
        batch.commit().unwrap();
        assert!(db.get(b"a", ReadFlags::NONE).unwrap().is_none());
    }
}
