//! Concrete implementations of the [`Database`](crate::Database) trait.

/// In-memory backend, most useful for testing and for L1/L2 modes that need
/// no durability.
pub mod memory;
/// Null backend: every call fails with `Unsupported`, used as a sentinel in
/// modes where persistence must be absent.
pub mod null;
/// RocksDB-backed stub backend, gated behind the `rocksdb` feature.
#[cfg(feature = "rocksdb")]
pub mod rocksdb_stub;
