//! Read-only decorator over any [`Database`], with an optional in-memory
//! write overlay.
//!
//! Two modes, chosen at construction:
//!
//! - [`ReadOnlyMode::Strict`]: every write is rejected with
//!   [`StoreError::WriteRejected`]; reads and capability discovery forward to
//!   the wrapped store unchanged.
//! - [`ReadOnlyMode::Overlay`]: writes land in an owned in-memory overlay
//!   instead of reaching the wrapped store. Reads check the overlay first
//!   and fall back to the wrapped store on a miss — the same overlay-first,
//!   batched-miss-fallback shape the trie layer uses for `get_many`,
//!   generalized here to a full decorator.
//!
//! **Sorted views do not see the overlay.** `first_key`, `last_key`, and
//! `get_view_between` forward to the wrapped store only; a caller that needs
//! overlay-aware ordered traversal uses `iterator(true)`. This is a known,
//! documented limitation, not an oversight.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;

use tracing::debug;

use crate::backend::memory::InMemoryBackend;
use crate::database::{Database, PutValue, WriteOpRef};
use crate::error::StoreError;
use crate::flags::{ReadFlags, WriteFlags};
use crate::iterator::DbIterator;
use crate::metrics::Metric;
use crate::partition::PartitionName;
use crate::snapshot::Snapshot;
use crate::sorted_view::SortedView;
use crate::value::{Entry, Value};

/// Construction-time choice of read-only behavior.
pub enum ReadOnlyMode {
    Strict,
    Overlay(InMemoryBackend),
}

/// Wraps a `D: Database` so that writes are either rejected outright or
/// redirected into an owned overlay, while reads remain available.
pub struct ReadOnlyDb<D: Database> {
    inner: D,
    overlay: Option<InMemoryBackend>,
    // Held across both halves of `snapshot()` so no write lands between
    // taking the overlay snapshot and the wrapped snapshot.
    snapshot_guard: Mutex<()>,
}

impl<D: Database> ReadOnlyDb<D> {
    pub fn new(inner: D, mode: ReadOnlyMode) -> Self {
        let overlay = match mode {
            ReadOnlyMode::Strict => None,
            ReadOnlyMode::Overlay(overlay) => Some(overlay),
        };
        ReadOnlyDb {
            inner,
            overlay,
            snapshot_guard: Mutex::new(()),
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn has_write_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Wipes the overlay without touching the wrapped store. Fails with
    /// `Unsupported` in `Strict` mode, where there is no overlay to clear.
    pub fn clear_temp_changes(&self) -> Result<(), StoreError> {
        match &self.overlay {
            Some(overlay) => {
                debug!(partition = %overlay.name(), "clearing read-only overlay");
                overlay.clear()
            }
            None => Err(StoreError::unsupported("clear_temp_changes: no write overlay")),
        }
    }
}

impl<D: Database> fmt::Debug for ReadOnlyDb<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyDb")
            .field("inner", &self.inner)
            .field("has_write_overlay", &self.overlay.is_some())
            .finish()
    }
}

impl<D: Database> Database for ReadOnlyDb<D> {
    fn name(&self) -> PartitionName {
        self.inner.name()
    }

    fn get(&self, key: &[u8], flags: ReadFlags) -> Result<Option<Value>, StoreError> {
        if let Some(overlay) = &self.overlay {
            if let Some(v) = overlay.get(key, flags)? {
                return Ok(Some(v));
            }
        }
        self.inner.get(key, flags)
    }

    fn multi_get(
        &self,
        keys: &[&[u8]],
        flags: ReadFlags,
    ) -> Result<Vec<Option<Value>>, StoreError> {
        let Some(overlay) = &self.overlay else {
            return self.inner.multi_get(keys, flags);
        };

        let mut results: Vec<Option<Value>> = Vec::with_capacity(keys.len());
        let mut miss_indices = Vec::new();
        let mut miss_keys: Vec<&[u8]> = Vec::new();
        for (i, key) in keys.iter().enumerate() {
            match overlay.get(key, flags)? {
                Some(v) => results.push(Some(v)),
                None => {
                    results.push(None);
                    miss_indices.push(i);
                    miss_keys.push(key);
                }
            }
        }
        if !miss_keys.is_empty() {
            let fetched = self.inner.multi_get(&miss_keys, flags)?;
            for (idx, value) in miss_indices.into_iter().zip(fetched) {
                results[idx] = value;
            }
        }
        Ok(results)
    }

    fn put(&self, key: &[u8], value: PutValue, flags: WriteFlags) -> Result<(), StoreError> {
        match &self.overlay {
            Some(overlay) => overlay.put(key, value, flags),
            None => Err(StoreError::WriteRejected),
        }
    }

    fn contains(&self, key: &[u8]) -> Result<bool, StoreError> {
        if let Some(overlay) = &self.overlay {
            if overlay.contains(key)? {
                return Ok(true);
            }
        }
        self.inner.contains(key)
    }

    fn iterator(&self, ordered: bool) -> Result<Box<dyn DbIterator + '_>, StoreError> {
        let Some(overlay) = &self.overlay else {
            return self.inner.iterator(ordered);
        };

        if ordered {
            Ok(Box::new(MergeIter {
                overlay: overlay.iterator(true)?,
                wrapped: self.inner.iterator(true)?,
                overlay_peek: None,
                wrapped_peek: None,
            }))
        } else {
            Ok(Box::new(UnorderedOverlayIter {
                overlay: overlay.iterator(false)?,
                wrapped: self.inner.iterator(false)?,
                seen: HashSet::new(),
                overlay_done: false,
            }))
        }
    }

    fn snapshot(&self) -> Result<Box<dyn Snapshot + '_>, StoreError> {
        let Some(overlay) = &self.overlay else {
            return self.inner.snapshot();
        };
        let _guard = self
            .snapshot_guard
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?;
        let overlay_snapshot = overlay.snapshot()?;
        let wrapped_snapshot = self.inner.snapshot()?;
        Ok(Box::new(ComposedSnapshot {
            overlay: overlay_snapshot,
            wrapped: wrapped_snapshot,
        }))
    }

    fn flush(&self, only_wal: bool) -> Result<(), StoreError> {
        self.inner.flush(only_wal)
    }

    fn clear(&self) -> Result<(), StoreError> {
        match &self.overlay {
            Some(overlay) => overlay.clear(),
            None => Err(StoreError::WriteRejected),
        }
    }

    fn compact(&self) -> Result<(), StoreError> {
        self.inner.compact()
    }

    fn gather_metric(&self) -> Metric {
        self.inner.gather_metric()
    }

    fn supports_write_batch(&self) -> bool {
        self.overlay.is_some()
    }

    fn write_batch(&self, ops: &[WriteOpRef<'_>]) -> Result<(), StoreError> {
        match &self.overlay {
            Some(overlay) => overlay.write_batch(ops),
            None => Err(StoreError::WriteRejected),
        }
    }

    fn supports_merge(&self) -> bool {
        self.overlay.as_ref().is_some_and(|o| o.supports_merge())
    }

    fn merge(&self, key: &[u8], value: &[u8], flags: WriteFlags) -> Result<(), StoreError> {
        match &self.overlay {
            Some(overlay) => overlay.merge(key, value, flags),
            None => Err(StoreError::WriteRejected),
        }
    }

    fn supports_multi_get(&self) -> bool {
        true
    }

    fn supports_sorted_view(&self) -> bool {
        self.inner.supports_sorted_view()
    }

    fn first_key(&self) -> Result<Option<Value>, StoreError> {
        self.inner.first_key()
    }

    fn last_key(&self) -> Result<Option<Value>, StoreError> {
        self.inner.last_key()
    }

    fn get_view_between(
        &self,
        inclusive_low: &[u8],
        exclusive_high: &[u8],
    ) -> Result<SortedView, StoreError> {
        self.inner.get_view_between(inclusive_low, exclusive_high)
    }
}

fn fetch_peek(
    iter: &mut Box<dyn DbIterator + '_>,
    slot: &mut Option<Option<Entry>>,
) -> Result<(), StoreError> {
    if slot.is_none() {
        *slot = Some(iter.next().transpose()?);
    }
    Ok(())
}

/// Ascending merge of an overlay iterator and a wrapped iterator, each
/// buffered one entry ahead. On a key tie the overlay entry wins and the
/// wrapped entry is dropped (running its release hook) without being
/// yielded.
struct MergeIter<'a> {
    overlay: Box<dyn DbIterator + 'a>,
    wrapped: Box<dyn DbIterator + 'a>,
    overlay_peek: Option<Option<Entry>>,
    wrapped_peek: Option<Option<Entry>>,
}

impl Iterator for MergeIter<'_> {
    type Item = Result<Entry, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(e) = fetch_peek(&mut self.overlay, &mut self.overlay_peek) {
            return Some(Err(e));
        }
        if let Err(e) = fetch_peek(&mut self.wrapped, &mut self.wrapped_peek) {
            return Some(Err(e));
        }
        let overlay_entry = self.overlay_peek.take().expect("just fetched");
        let wrapped_entry = self.wrapped_peek.take().expect("just fetched");

        match (overlay_entry, wrapped_entry) {
            (None, None) => None,
            (Some(o), None) => {
                self.wrapped_peek = Some(None);
                Some(Ok(o))
            }
            (None, Some(w)) => {
                self.overlay_peek = Some(None);
                Some(Ok(w))
            }
            (Some(o), Some(w)) => match o.key.as_bytes().cmp(w.key.as_bytes()) {
                Ordering::Less => {
                    self.wrapped_peek = Some(Some(w));
                    Some(Ok(o))
                }
                Ordering::Greater => {
                    self.overlay_peek = Some(Some(o));
                    Some(Ok(w))
                }
                Ordering::Equal => {
                    drop(w);
                    Some(Ok(o))
                }
            },
        }
    }
}

/// All overlay entries first (recording their keys), then wrapped entries
/// whose key hasn't already been seen.
struct UnorderedOverlayIter<'a> {
    overlay: Box<dyn DbIterator + 'a>,
    wrapped: Box<dyn DbIterator + 'a>,
    seen: HashSet<Vec<u8>>,
    overlay_done: bool,
}

impl Iterator for UnorderedOverlayIter<'_> {
    type Item = Result<Entry, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.overlay_done {
            match self.overlay.next() {
                Some(Ok(entry)) => {
                    self.seen.insert(entry.key.as_bytes().to_vec());
                    return Some(Ok(entry));
                }
                Some(Err(e)) => return Some(Err(e)),
                None => self.overlay_done = true,
            }
        }
        loop {
            match self.wrapped.next()? {
                Ok(entry) if self.seen.contains(entry.key.as_bytes()) => continue,
                other => return Some(other),
            }
        }
    }
}

struct ComposedSnapshot<'a> {
    overlay: Box<dyn Snapshot + 'a>,
    wrapped: Box<dyn Snapshot + 'a>,
}

impl fmt::Debug for ComposedSnapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ComposedSnapshot")
    }
}

impl Snapshot for ComposedSnapshot<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(v) = self.overlay.get(key)? {
            return Ok(Some(v));
        }
        self.wrapped.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapped_with(entries: &[(&[u8], &[u8])]) -> InMemoryBackend {
        let db = InMemoryBackend::new(PartitionName::State);
        for (k, v) in entries {
            db.put(k, PutValue::Value(v.to_vec()), WriteFlags::NONE)
                .unwrap();
        }
        db
    }

    #[test]
    fn strict_mode_rejects_writes_but_forwards_reads() {
        let wrapped = wrapped_with(&[(b"a", b"1")]);
        let ro = ReadOnlyDb::new(wrapped, ReadOnlyMode::Strict);
        assert_eq!(
            ro.get(b"a", ReadFlags::NONE).unwrap().unwrap().as_bytes(),
            b"1"
        );
        let err = ro
            .put(b"b", PutValue::Value(b"2".to_vec()), WriteFlags::NONE)
            .unwrap_err();
        assert!(matches!(err, StoreError::WriteRejected));
        assert!(!ro.has_write_overlay());
    }

    #[test]
    fn overlay_shadows_wrapped_store_on_read() {
        let wrapped = wrapped_with(&[(b"a", b"wrapped")]);
        let overlay = InMemoryBackend::new(PartitionName::State);
        let ro = ReadOnlyDb::new(wrapped, ReadOnlyMode::Overlay(overlay));
        ro.put(b"a", PutValue::Value(b"overlay".to_vec()), WriteFlags::NONE)
            .unwrap();
        assert_eq!(
            ro.get(b"a", ReadFlags::NONE).unwrap().unwrap().as_bytes(),
            b"overlay"
        );
        assert!(ro.has_write_overlay());
    }

    #[test]
    fn clear_temp_changes_only_wipes_overlay() {
        let wrapped = wrapped_with(&[(b"a", b"1")]);
        let overlay = InMemoryBackend::new(PartitionName::State);
        let ro = ReadOnlyDb::new(wrapped, ReadOnlyMode::Overlay(overlay));
        ro.put(b"b", PutValue::Value(b"2".to_vec()), WriteFlags::NONE)
            .unwrap();
        ro.clear_temp_changes().unwrap();
        assert!(ro.get(b"b", ReadFlags::NONE).unwrap().is_none());
        assert_eq!(
            ro.get(b"a", ReadFlags::NONE).unwrap().unwrap().as_bytes(),
            b"1"
        );
    }

    #[test]
    fn ordered_iteration_merges_with_overlay_precedence_on_tie() {
        let wrapped = wrapped_with(&[(b"a", b"wrapped-a"), (b"b", b"wrapped-b"), (b"d", b"wrapped-d")]);
        let overlay = InMemoryBackend::new(PartitionName::State);
        let ro = ReadOnlyDb::new(wrapped, ReadOnlyMode::Overlay(overlay));
        ro.put(b"b", PutValue::Value(b"overlay-b".to_vec()), WriteFlags::NONE)
            .unwrap();
        ro.put(b"c", PutValue::Value(b"overlay-c".to_vec()), WriteFlags::NONE)
            .unwrap();

        let entries: Vec<(Vec<u8>, Vec<u8>)> = ro
            .iterator(true)
            .unwrap()
            .map(|e| {
                let e = e.unwrap();
                (e.key.as_bytes().to_vec(), e.value.as_bytes().to_vec())
            })
            .collect();

        assert_eq!(
            entries,
            vec![
                (b"a".to_vec(), b"wrapped-a".to_vec()),
                (b"b".to_vec(), b"overlay-b".to_vec()),
                (b"c".to_vec(), b"overlay-c".to_vec()),
                (b"d".to_vec(), b"wrapped-d".to_vec()),
            ]
        );
    }

    #[test]
    fn unordered_iteration_does_not_duplicate_overridden_keys() {
        let wrapped = wrapped_with(&[(b"a", b"wrapped-a"), (b"b", b"wrapped-b")]);
        let overlay = InMemoryBackend::new(PartitionName::State);
        let ro = ReadOnlyDb::new(wrapped, ReadOnlyMode::Overlay(overlay));
        ro.put(b"b", PutValue::Value(b"overlay-b".to_vec()), WriteFlags::NONE)
            .unwrap();

        let mut keys: Vec<Vec<u8>> = ro
            .iterator(false)
            .unwrap()
            .map(|e| e.unwrap().key.as_bytes().to_vec())
            .collect();
        keys.sort();
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec()]);

        let values: Vec<Vec<u8>> = ro
            .iterator(false)
            .unwrap()
            .filter(|e| e.as_ref().unwrap().key.as_bytes() == b"b")
            .map(|e| e.unwrap().value.as_bytes().to_vec())
            .collect();
        assert_eq!(values, vec![b"overlay-b".to_vec()]);
    }

    #[test]
    fn multi_get_falls_back_to_wrapped_store_on_overlay_miss() {
        let wrapped = wrapped_with(&[(b"a", b"wrapped-a"), (b"c", b"wrapped-c")]);
        let overlay = InMemoryBackend::new(PartitionName::State);
        let ro = ReadOnlyDb::new(wrapped, ReadOnlyMode::Overlay(overlay));
        ro.put(b"b", PutValue::Value(b"overlay-b".to_vec()), WriteFlags::NONE)
            .unwrap();

        let results = ro
            .multi_get(&[b"a", b"b", b"missing"], ReadFlags::NONE)
            .unwrap();
        assert_eq!(results[0].as_ref().unwrap().as_bytes(), b"wrapped-a");
        assert_eq!(results[1].as_ref().unwrap().as_bytes(), b"overlay-b");
        assert!(results[2].is_none());
    }

    #[test]
    fn snapshot_composes_overlay_and_wrapped_and_is_isolated() {
        let wrapped = wrapped_with(&[(b"a", b"1")]);
        let overlay = InMemoryBackend::new(PartitionName::State);
        let ro = ReadOnlyDb::new(wrapped, ReadOnlyMode::Overlay(overlay));
        ro.put(b"b", PutValue::Value(b"2".to_vec()), WriteFlags::NONE)
            .unwrap();
        let snap = ro.snapshot().unwrap();
        ro.put(b"c", PutValue::Value(b"3".to_vec()), WriteFlags::NONE)
            .unwrap();

        assert_eq!(snap.get(b"a").unwrap().unwrap(), b"1".to_vec());
        assert_eq!(snap.get(b"b").unwrap().unwrap(), b"2".to_vec());
        assert!(snap.get(b"c").unwrap().is_none());
    }

    #[test]
    fn sorted_view_forwards_to_wrapped_store_only() {
        let wrapped = wrapped_with(&[(b"a", b"1"), (b"z", b"2")]);
        let overlay = InMemoryBackend::new(PartitionName::State);
        let ro = ReadOnlyDb::new(wrapped, ReadOnlyMode::Overlay(overlay));
        ro.put(b"m", PutValue::Value(b"overlay".to_vec()), WriteFlags::NONE)
            .unwrap();
        // "m" only exists in the overlay, so it does not show up here.
        assert_eq!(ro.first_key().unwrap().unwrap().as_bytes(), b"a");
        assert_eq!(ro.last_key().unwrap().unwrap().as_bytes(), b"z");
    }
}
