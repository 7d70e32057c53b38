//! Null backend: a sentinel that stores nothing and rejects every operation.
//!
//! Used where persistence must be deliberately absent (e.g. a "no disk"
//! mode), mirroring how a null factory/backend pair is used upstream as a
//! hard failure point rather than a silent no-op store.

use std::fmt;

use crate::database::{Database, PutValue, WriteOpRef};
use crate::error::StoreError;
use crate::flags::{ReadFlags, WriteFlags};
use crate::iterator::DbIterator;
use crate::metrics::Metric;
use crate::partition::PartitionName;
use crate::snapshot::Snapshot;
use crate::sorted_view::SortedView;
use crate::value::Value;

pub struct NullBackend {
    name: PartitionName,
}

impl NullBackend {
    pub fn new(name: PartitionName) -> Self {
        NullBackend { name }
    }
}

impl fmt::Debug for NullBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NullBackend").field("name", &self.name).finish()
    }
}

impl Database for NullBackend {
    fn name(&self) -> PartitionName {
        self.name
    }

    fn get(&self, _key: &[u8], _flags: ReadFlags) -> Result<Option<Value>, StoreError> {
        Err(StoreError::unsupported("null backend: get"))
    }

    fn put(&self, _key: &[u8], _value: PutValue, _flags: WriteFlags) -> Result<(), StoreError> {
        Err(StoreError::unsupported("null backend: put"))
    }

    fn contains(&self, _key: &[u8]) -> Result<bool, StoreError> {
        Err(StoreError::unsupported("null backend: contains"))
    }

    fn iterator(&self, _ordered: bool) -> Result<Box<dyn DbIterator + '_>, StoreError> {
        Err(StoreError::unsupported("null backend: iterator"))
    }

    fn snapshot(&self) -> Result<Box<dyn Snapshot + '_>, StoreError> {
        Err(StoreError::unsupported("null backend: snapshot"))
    }

    fn flush(&self, _only_wal: bool) -> Result<(), StoreError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        Err(StoreError::unsupported("null backend: clear"))
    }

    fn gather_metric(&self) -> Metric {
        Metric::default()
    }

    fn write_batch(&self, _ops: &[WriteOpRef<'_>]) -> Result<(), StoreError> {
        Err(StoreError::unsupported("null backend: write_batch"))
    }

    fn merge(&self, _key: &[u8], _value: &[u8], _flags: WriteFlags) -> Result<(), StoreError> {
        Err(StoreError::unsupported("null backend: merge"))
    }

    fn first_key(&self) -> Result<Option<Value>, StoreError> {
        Err(StoreError::unsupported("null backend: first_key"))
    }

    fn last_key(&self) -> Result<Option<Value>, StoreError> {
        Err(StoreError::unsupported("null backend: last_key"))
    }

    fn get_view_between(
        &self,
        _inclusive_low: &[u8],
        _exclusive_high: &[u8],
    ) -> Result<SortedView, StoreError> {
        Err(StoreError::unsupported("null backend: get_view_between"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::ReadFlags;

    #[test]
    fn every_operation_is_unsupported() {
        let db = NullBackend::new(PartitionName::Metadata);
        assert!(db.get(b"k", ReadFlags::NONE).is_err());
        assert!(db
            .put(b"k", PutValue::Value(vec![]), WriteFlags::NONE)
            .is_err());
        assert!(db.iterator(true).is_err());
        assert!(db.snapshot().is_err());
        assert!(db.clear().is_err());
        // flush is documented as a harmless no-op even here.
        assert!(db.flush(false).is_ok());
    }
}
