use thiserror::Error;

use crate::partition::PartitionName;

/// Errors surfaced by the storage core.
///
/// Read operations never use this enum to signal "key not found" — that is
/// always `Ok(None)`. `StoreError` is reserved for conditions the caller must
/// actually handle differently: an unsupported capability, a backend fault,
/// an allocation failure, etc.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage fault: {0}")]
    StorageFault(String),

    #[cfg(feature = "rocksdb")]
    #[error("rocksdb error: {0}")]
    RocksdbError(#[from] rocksdb::Error),

    #[error("key too large: {len} bytes (max {max})")]
    KeyTooLarge { len: usize, max: usize },

    #[error("value too large: {len} bytes (max {max})")]
    ValueTooLarge { len: usize, max: usize },

    #[error("database closed")]
    DatabaseClosed,

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("allocation failure")]
    AllocationFailure,

    #[error("partition not registered: {0:?}")]
    NotRegistered(PartitionName),

    #[error("write rejected: database is read-only")]
    WriteRejected,

    #[error("internal lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Shorthand for an unsupported-capability error with a fixed message,
    /// matching the call-site style used throughout the backends.
    pub fn unsupported(what: &str) -> Self {
        StoreError::Unsupported(what.to_string())
    }
}
