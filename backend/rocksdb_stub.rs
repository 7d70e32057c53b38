//! A minimal RocksDB-backed implementation of [`Database`], gated behind the
//! `rocksdb` feature and off by default.
//!
//! This is deliberately a *stub*: column-family management, tuning knobs,
//! and checkpoints are out of scope here. What this module exists to
//! demonstrate is the one contract detail a purely in-memory backend can't:
//! a [`Value`] whose bytes came from an engine-owned pinned slice and whose
//! release hook does real work when the caller is done with it, rather than
//! being `None`.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use rocksdb::{Direction, IteratorMode, WriteBatch as RocksWriteBatch, DB};
use tracing::{debug, info};

use crate::database::{Database, PutValue, WriteOpRef};
use crate::error::StoreError;
use crate::flags::{ReadFlags, WriteFlags};
use crate::iterator::DbIterator;
use crate::metrics::{Metric, MetricCounters};
use crate::partition::PartitionName;
use crate::snapshot::Snapshot;
use crate::sorted_view::SortedView;
use crate::value::{Entry, Value};

pub struct RocksDbBackend {
    name: PartitionName,
    db: DB,
    metrics: MetricCounters,
    /// Pinned reads whose `Value` release hook has not yet run. Exposed via
    /// `gather_metric().cache_size` as a cheap proxy for outstanding
    /// engine-held memory; see DESIGN.md.
    outstanding_pins: Arc<AtomicU64>,
}

impl RocksDbBackend {
    pub fn open(name: PartitionName, path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut opts = rocksdb::Options::default();
        opts.create_if_missing(true);
        let path = path.as_ref();
        info!(partition = %name, path = %path.display(), "opening rocksdb backend");
        let db = DB::open(&opts, path)?;
        Ok(RocksDbBackend {
            name,
            db,
            metrics: MetricCounters::new(),
            outstanding_pins: Arc::new(AtomicU64::new(0)),
        })
    }
}

impl fmt::Debug for RocksDbBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RocksDbBackend").field("name", &self.name).finish()
    }
}

impl Database for RocksDbBackend {
    fn name(&self) -> PartitionName {
        self.name
    }

    fn get(&self, key: &[u8], _flags: ReadFlags) -> Result<Option<Value>, StoreError> {
        self.metrics.record_read();
        let Some(pinned) = self.db.get_pinned(key)? else {
            return Ok(None);
        };
        let bytes = Bytes::copy_from_slice(&pinned);
        // `pinned` (the engine's PinnableSlice) is released right here when
        // it goes out of scope; the `Value`'s own release hook below models
        // the *caller-visible* half of the contract (bookkeeping how many
        // borrowed reads are still outstanding), which is independent of
        // when the engine slice itself is actually freed.
        self.outstanding_pins.fetch_add(1, Ordering::Relaxed);
        let counter = self.outstanding_pins.clone();
        Ok(Some(Value::with_release(
            bytes,
            Box::new(move || {
                counter.fetch_sub(1, Ordering::Relaxed);
            }),
        )))
    }

    fn multi_get(
        &self,
        keys: &[&[u8]],
        _flags: ReadFlags,
    ) -> Result<Vec<Option<Value>>, StoreError> {
        self.metrics.record_reads(keys.len() as u64);
        self.db
            .multi_get(keys)
            .into_iter()
            .map(|res| {
                let bytes = res?;
                Ok(bytes.map(Value::inert))
            })
            .collect()
    }

    fn put(&self, key: &[u8], value: PutValue, _flags: WriteFlags) -> Result<(), StoreError> {
        self.metrics.record_write();
        match value {
            PutValue::Value(bytes) => self.db.put(key, bytes)?,
            PutValue::Delete => self.db.delete(key)?,
        }
        Ok(())
    }

    fn contains(&self, key: &[u8]) -> Result<bool, StoreError> {
        self.metrics.record_read();
        Ok(self.db.get_pinned(key)?.is_some())
    }

    fn iterator(&self, _ordered: bool) -> Result<Box<dyn DbIterator + '_>, StoreError> {
        // RocksDB always stores keys in sorted order, so both the ordered
        // and unordered cases are satisfied by the same iterator.
        let iter = self.db.iterator(IteratorMode::Start);
        Ok(Box::new(RocksIterator { inner: iter }))
    }

    fn snapshot(&self) -> Result<Box<dyn Snapshot + '_>, StoreError> {
        Ok(Box::new(RocksSnapshot {
            inner: self.db.snapshot(),
        }))
    }

    fn flush(&self, _only_wal: bool) -> Result<(), StoreError> {
        debug!(partition = %self.name, "flushing rocksdb backend");
        self.db.flush()?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        // Wiping an entire RocksDB instance in place isn't exposed by this
        // stub; a real backend would recreate the column family. Left
        // unsupported rather than faked with a slow full-table delete scan.
        Err(StoreError::unsupported("rocksdb stub: clear"))
    }

    fn compact(&self) -> Result<(), StoreError> {
        self.db.compact_range(None::<&[u8]>, None::<&[u8]>);
        Ok(())
    }

    fn gather_metric(&self) -> Metric {
        let mut metric = self.metrics.snapshot();
        metric.cache_size = self.outstanding_pins.load(Ordering::Relaxed);
        metric
    }

    fn supports_write_batch(&self) -> bool {
        true
    }

    fn write_batch(&self, ops: &[WriteOpRef<'_>]) -> Result<(), StoreError> {
        if ops.iter().any(|op| matches!(op, WriteOpRef::Merge(..))) {
            return Err(StoreError::unsupported(
                "rocksdb stub: no merge operator configured",
            ));
        }
        let mut batch = RocksWriteBatch::default();
        for op in ops {
            match *op {
                WriteOpRef::Put(k, v) => batch.put(k, v),
                WriteOpRef::Delete(k) => batch.delete(k),
                WriteOpRef::Merge(..) => unreachable!("checked above"),
            }
        }
        self.db.write(batch)?;
        self.metrics.record_writes(ops.len() as u64);
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
            .db
            .iterator(IteratorMode::Start)
            .next()
            .transpose()?
            .map(|(k, _)| Value::inert(k)))
    }

    fn last_key(&self) -> Result<Option<Value>, StoreError> {
        Ok(self
            .db
            .iterator(IteratorMode::End)
            .next()
            .transpose()?
            .map(|(k, _)| Value::inert(k)))
    }

    fn get_view_between(
        &self,
        inclusive_low: &[u8],
        exclusive_high: &[u8],
    ) -> Result<SortedView, StoreError> {
        let mut entries = Vec::new();
        let iter = self
            .db
            .iterator(IteratorMode::From(inclusive_low, Direction::Forward));
        for item in iter {
            let (k, v) = item?;
            if &k[..] >= exclusive_high {
                break;
            }
            entries.push(Entry::new(Value::inert(k), Value::inert(v)));
        }
        Ok(SortedView::from_sorted_entries(entries))
    }
}

struct RocksIterator<'a> {
    inner: rocksdb::DBIteratorWithThreadMode<'a, DB>,
}

impl Iterator for RocksIterator<'_> {
    type Item = Result<Entry, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|res| {
            let (k, v) = res?;
            Ok(Entry::new(Value::inert(k), Value::inert(v)))
        })
    }
}

struct RocksSnapshot<'a> {
    inner: rocksdb::Snapshot<'a>,
}

impl fmt::Debug for RocksSnapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RocksSnapshot")
    }
}

impl Snapshot for RocksSnapshot<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.inner.get(key)?)
    }

    fn iterator(&self, _ordered: bool) -> Result<Box<dyn DbIterator + '_>, StoreError> {
        let iter = self.inner.iterator(IteratorMode::Start);
        Ok(Box::new(RocksSnapshotIterator { inner: iter }))
    }
}

struct RocksSnapshotIterator<'a> {
    inner: rocksdb::DBIteratorWithThreadMode<'a, rocksdb::SnapshotWithThreadMode<'a, DB>>,
}

impl Iterator for RocksSnapshotIterator<'_> {
    type Item = Result<Entry, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|res| {
            let (k, v) = res?;
            Ok(Entry::new(Value::inert(k), Value::inert(v)))
        })
    }
}
