//! In-memory backend.
//!
//! One partition's table: a `BTreeMap<Vec<u8>, Vec<u8>>` guarded by a
//! `RwLock`. Keeping the table a `BTreeMap` rather than a `HashMap` means
//! ordered iteration, `first_key`/`last_key`, and range views all fall out
//! of the standard library for free instead of requiring a separate sort
//! pass.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::sync::{RwLock, RwLockReadGuard};

use tracing::{debug, trace};

use crate::database::{Database, PutValue, WriteOpRef};
use crate::error::StoreError;
use crate::flags::{ReadFlags, WriteFlags};
use crate::iterator::DbIterator;
use crate::metrics::{Metric, MetricCounters};
use crate::partition::PartitionName;
use crate::snapshot::Snapshot;
use crate::sorted_view::SortedView;
use crate::value::{Entry, Value};

type Table = BTreeMap<Vec<u8>, Vec<u8>>;

pub struct InMemoryBackend {
    name: PartitionName,
    table: RwLock<Table>,
    metrics: MetricCounters,
}

impl InMemoryBackend {
    pub fn new(name: PartitionName) -> Self {
        debug!(partition = %name, "opening in-memory backend");
        InMemoryBackend {
            name,
            table: RwLock::new(Table::new()),
            metrics: MetricCounters::new(),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Table>, StoreError> {
        self.table.read().map_err(|_| StoreError::LockPoisoned)
    }
}

impl fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("name", &self.name)
            .finish()
    }
}

impl Database for InMemoryBackend {
    fn name(&self) -> PartitionName {
        self.name
    }

    fn get(&self, key: &[u8], _flags: ReadFlags) -> Result<Option<Value>, StoreError> {
        self.metrics.record_read();
        let table = self.read()?;
        Ok(table.get(key).map(|v| Value::inert(v.clone())))
    }

    fn multi_get(
        &self,
        keys: &[&[u8]],
        _flags: ReadFlags,
    ) -> Result<Vec<Option<Value>>, StoreError> {
        self.metrics.record_reads(keys.len() as u64);
        let table = self.read()?;
        Ok(keys
            .iter()
            .map(|k| table.get(*k).map(|v| Value::inert(v.clone())))
            .collect())
    }

    fn put(&self, key: &[u8], value: PutValue, _flags: WriteFlags) -> Result<(), StoreError> {
        self.metrics.record_write();
        let mut table = self.table.write().map_err(|_| StoreError::LockPoisoned)?;
        match value {
            PutValue::Value(bytes) => {
                table.insert(key.to_vec(), bytes);
            }
            PutValue::Delete => {
                table.remove(key);
            }
        }
        self.metrics.set_size(table.len() as u64);
        Ok(())
    }

    fn contains(&self, key: &[u8]) -> Result<bool, StoreError> {
        self.metrics.record_read();
        Ok(self.read()?.contains_key(key))
    }

    fn iterator(&self, _ordered: bool) -> Result<Box<dyn DbIterator + '_>, StoreError> {
        // `BTreeMap` already iterates in ascending key order, which
        // satisfies both the `ordered` and `unordered` contracts (the latter
        // only requires *some* order, not a specific one). Materialized at
        // creation time: later mutations are not observed.
        let entries: Vec<(Vec<u8>, Vec<u8>)> = self
            .read()?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Box::new(MemoryIterator {
            inner: entries.into_iter(),
        }))
    }

    fn snapshot(&self) -> Result<Box<dyn Snapshot + '_>, StoreError> {
        let copy = self.read()?.clone();
        trace!(partition = %self.name, entries = copy.len(), "took in-memory snapshot");
        Ok(Box::new(MemorySnapshot { table: copy }))
    }

    fn flush(&self, _only_wal: bool) -> Result<(), StoreError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut table = self.table.write().map_err(|_| StoreError::LockPoisoned)?;
        debug!(partition = %self.name, entries = table.len(), "clearing in-memory backend");
        table.clear();
        // `clear` resets diagnostic counters along with the data, diverging
        // from engines that preserve them across a wipe. See DESIGN.md.
        self.metrics.reset();
        Ok(())
    }

    fn gather_metric(&self) -> Metric {
        self.metrics.snapshot()
    }

    fn supports_write_batch(&self) -> bool {
        true
    }

    fn write_batch(&self, ops: &[WriteOpRef<'_>]) -> Result<(), StoreError> {
        // All-or-nothing: validate first (so a rejected merge never partially
        // applies), then apply under a single write lock.
        if ops.iter().any(|op| matches!(op, WriteOpRef::Merge(..))) {
            return Err(StoreError::unsupported("merge via write_batch"));
        }
        let mut table = self.table.write().map_err(|_| StoreError::LockPoisoned)?;
        for op in ops {
            match *op {
                WriteOpRef::Put(k, v) => {
                    table.insert(k.to_vec(), v.to_vec());
                }
                WriteOpRef::Delete(k) => {
                    table.remove(k);
                }
                WriteOpRef::Merge(..) => unreachable!("checked above"),
            }
        }
        self.metrics.record_writes(ops.len() as u64);
        self.metrics.set_size(table.len() as u64);
        Ok(())
    }

    fn supports_multi_get(&self) -> bool {
        true
    }

    fn supports_sorted_view(&self) -> bool {
        true
    }

    fn first_key(&self) -> Result<Option<Value>, StoreError> {
        Ok(self
            .read()?
            .keys()
            .next()
            .map(|k| Value::inert(k.clone())))
    }

    fn last_key(&self) -> Result<Option<Value>, StoreError> {
        Ok(self
            .read()?
            .keys()
            .next_back()
            .map(|k| Value::inert(k.clone())))
    }

    fn get_view_between(
        &self,
        inclusive_low: &[u8],
        exclusive_high: &[u8],
    ) -> Result<SortedView, StoreError> {
        let table = self.read()?;
        let range = table.range::<[u8], _>((
            Bound::Included(inclusive_low),
            Bound::Excluded(exclusive_high),
        ));
        let entries: Vec<Entry> = range
            .map(|(k, v)| Entry::new(Value::inert(k.clone()), Value::inert(v.clone())))
            .collect();
        Ok(SortedView::from_sorted_entries(entries))
    }
}

struct MemoryIterator {
    inner: std::vec::IntoIter<(Vec<u8>, Vec<u8>)>,
}

impl Iterator for MemoryIterator {
    type Item = Result<Entry, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(k, v)| Ok(Entry::new(Value::inert(k), Value::inert(v))))
    }
}

#[derive(Debug)]
struct MemorySnapshot {
    table: Table,
}

impl Snapshot for MemorySnapshot {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.table.get(key).cloned())
    }

    fn iterator(&self, _ordered: bool) -> Result<Box<dyn DbIterator + '_>, StoreError> {
        let entries: Vec<(Vec<u8>, Vec<u8>)> =
            self.table.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        Ok(Box::new(MemoryIterator {
            inner: entries.into_iter(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> InMemoryBackend {
        InMemoryBackend::new(PartitionName::State)
    }

    #[test]
    fn put_get_delete_round_trip() {
        let db = db();
        db.put(b"hello", PutValue::Value(b"world".to_vec()), WriteFlags::NONE)
            .unwrap();
        assert_eq!(
            db.get(b"hello", ReadFlags::NONE).unwrap().unwrap().as_bytes(),
            b"world"
        );
        db.delete(b"hello", WriteFlags::NONE).unwrap();
        assert!(db.get(b"hello", ReadFlags::NONE).unwrap().is_none());
        assert!(!db.contains(b"hello").unwrap());
    }

    #[test]
    fn put_null_value_deletes() {
        let db = db();
        db.put(b"k", PutValue::Value(b"v".to_vec()), WriteFlags::NONE)
            .unwrap();
        db.put(b"k", PutValue::Delete, WriteFlags::NONE).unwrap();
        assert!(db.get(b"k", ReadFlags::NONE).unwrap().is_none());
    }

    #[test]
    fn empty_key_and_value_round_trip_distinct_from_absence() {
        let db = db();
        db.put(b"", PutValue::Value(vec![]), WriteFlags::NONE)
            .unwrap();
        let v = db.get(b"", ReadFlags::NONE).unwrap().unwrap();
        assert_eq!(v.as_bytes(), b"");
        assert!(db.contains(b"").unwrap());
        assert!(db.get(b"missing", ReadFlags::NONE).unwrap().is_none());
    }

    #[test]
    fn binary_keys_round_trip() {
        let db = db();
        let key = [0x00, 0xff, 0x01];
        db.put(&key, PutValue::Value(vec![0xff, 0x00]), WriteFlags::NONE)
            .unwrap();
        assert_eq!(
            db.get(&key, ReadFlags::NONE).unwrap().unwrap().as_bytes(),
            &[0xff, 0x00]
        );
    }

    #[test]
    fn ordered_iteration_is_ascending_regardless_of_insertion_order() {
        let db = db();
        for k in [b"c".as_slice(), b"a".as_slice(), b"b".as_slice()] {
            db.put(k, PutValue::Value(vec![]), WriteFlags::NONE).unwrap();
        }
        let keys: Vec<Vec<u8>> = db
            .iterator(true)
            .unwrap()
            .map(|e| e.unwrap().key.as_bytes().to_vec())
            .collect();
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn empty_store_iterates_to_nothing() {
        let db = db();
        assert!(db.iterator(true).unwrap().next().is_none());
        assert!(db.first_key().unwrap().is_none());
        assert!(db.last_key().unwrap().is_none());
    }

    #[test]
    fn clear_wipes_entries_and_resets_metrics_then_db_is_usable() {
        let db = db();
        db.put(b"a", PutValue::Value(b"1".to_vec()), WriteFlags::NONE)
            .unwrap();
        db.clear().unwrap();
        assert_eq!(db.gather_metric().size, 0);
        assert!(db.get(b"a", ReadFlags::NONE).unwrap().is_none());
        db.put(b"b", PutValue::Value(b"2".to_vec()), WriteFlags::NONE)
            .unwrap();
        assert_eq!(
            db.get(b"b", ReadFlags::NONE).unwrap().unwrap().as_bytes(),
            b"2"
        );
        db.delete(b"b", WriteFlags::NONE).unwrap();
        assert!(db.get(b"b", ReadFlags::NONE).unwrap().is_none());
    }

    #[test]
    fn snapshot_is_isolated_from_later_mutations() {
        let db = db();
        db.put(b"x", PutValue::Value(b"1".to_vec()), WriteFlags::NONE)
            .unwrap();
        let snap = db.snapshot().unwrap();
        db.put(b"x", PutValue::Value(b"2".to_vec()), WriteFlags::NONE)
            .unwrap();
        assert_eq!(snap.get(b"x").unwrap().unwrap(), b"1".to_vec());
        assert_eq!(
            db.get(b"x", ReadFlags::NONE).unwrap().unwrap().as_bytes(),
            b"2"
        );
        drop(snap);
        assert_eq!(
            db.get(b"x", ReadFlags::NONE).unwrap().unwrap().as_bytes(),
            b"2"
        );
    }

    #[test]
    fn get_view_between_respects_bounds() {
        let db = db();
        for k in [b"a".as_slice(), b"b", b"c", b"d"] {
            db.put(k, PutValue::Value(vec![]), WriteFlags::NONE).unwrap();
        }
        let mut view = db.get_view_between(b"b", b"d").unwrap();
        assert_eq!(view.move_next().unwrap().key.as_bytes(), b"b");
        assert_eq!(view.move_next().unwrap().key.as_bytes(), b"c");
        assert!(view.move_next().is_none());
    }

    #[test]
    fn get_view_between_equal_bounds_is_empty() {
        let db = db();
        db.put(b"a", PutValue::Value(vec![]), WriteFlags::NONE).unwrap();
        let view = db.get_view_between(b"a", b"a").unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn write_batch_applies_atomically() {
        let db = db();
        db.write_batch(&[
            WriteOpRef::Put(b"a", b"1"),
            WriteOpRef::Put(b"b", b"2"),
            WriteOpRef::Delete(b"a"),
        ])
        .unwrap();
        assert!(db.get(b"a", ReadFlags::NONE).unwrap().is_none());
        assert_eq!(
            db.get(b"b", ReadFlags::NONE).unwrap().unwrap().as_bytes(),
            b"2"
        );
    }

    #[test]
    fn write_batch_rejects_merge() {
        let db = db();
        let err = db.write_batch(&[WriteOpRef::Merge(b"a", b"1")]).unwrap_err();
        assert!(matches!(err, StoreError::Unsupported(_)));
    }
}
