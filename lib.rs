//! # Backend-agnostic key-value storage core
//!
//! This crate is the persistence abstraction layer of an Ethereum execution
//! client: a single uniform contract for logically partitioned key-value
//! stores (state trie nodes, bytecode, block bodies, receipts, peer tables,
//! ...) plus the machinery that composes around it — batching, overlays,
//! snapshots, ordered iteration, sorted range views, column families,
//! factories and a provider registry.
//!
//! It does not know how to encode accounts, receipts, or trie nodes, and it
//! does not ship a production storage engine binding (beyond the optional
//! `rocksdb` stub backend). Those are the concerns of higher layers; this
//! crate only guarantees that whichever backend they choose behaves the same
//! way across `get`/`put`/`delete`/iteration/snapshot/batch composition.

mod batch;
mod column;
mod database;
mod error;
mod flags;
mod iterator;
mod metrics;
mod partition;
mod provider;
mod readonly;
mod snapshot;
mod sorted_view;
mod value;

pub mod backend;
pub mod columns;
pub mod factory;

pub use batch::{WriteBatch, WriteOp};
pub use column::{ColumnDbSnapshot, ColumnSet, ColumnedDb, ColumnsWriteBatch};
pub use database::{Database, PutValue};
pub use error::StoreError;
pub use flags::{ReadFlags, WriteFlags};
pub use iterator::DbIterator;
pub use metrics::Metric;
pub use partition::PartitionName;
pub use provider::Provider;
pub use readonly::{ReadOnlyDb, ReadOnlyMode};
pub use snapshot::Snapshot;
pub use sorted_view::SortedView;
pub use value::{Entry, Value};
