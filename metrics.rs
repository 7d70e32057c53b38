//! Per-database diagnostic counters.
//!
//! Lightweight atomic counters: negligible overhead (a handful of atomic
//! increments per operation) and no ordering guarantees beyond `Relaxed` —
//! these are for observability, not correctness.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic counters a backend updates as operations happen.
#[derive(Debug, Default)]
pub struct MetricCounters {
    pub size: AtomicU64,
    pub cache_size: AtomicU64,
    pub index_size: AtomicU64,
    pub memtable_size: AtomicU64,
    pub total_reads: AtomicU64,
    pub total_writes: AtomicU64,
}

impl MetricCounters {
    pub const fn new() -> Self {
        MetricCounters {
            size: AtomicU64::new(0),
            cache_size: AtomicU64::new(0),
            index_size: AtomicU64::new(0),
            memtable_size: AtomicU64::new(0),
            total_reads: AtomicU64::new(0),
            total_writes: AtomicU64::new(0),
        }
    }

    pub fn record_read(&self) {
        self.total_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reads(&self, n: u64) {
        self.total_reads.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.total_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_writes(&self, n: u64) {
        self.total_writes.fetch_add(n, Ordering::Relaxed);
    }

    pub fn set_size(&self, size: u64) {
        self.size.store(size, Ordering::Relaxed);
    }

    /// Zeroes every counter. Called by backends whose `clear()` resets
    /// diagnostics along with data; see DESIGN.md for the Open Question this
    /// resolves.
    pub fn reset(&self) {
        self.size.store(0, Ordering::Relaxed);
        self.cache_size.store(0, Ordering::Relaxed);
        self.index_size.store(0, Ordering::Relaxed);
        self.memtable_size.store(0, Ordering::Relaxed);
        self.total_reads.store(0, Ordering::Relaxed);
        self.total_writes.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Metric {
        Metric {
            size: self.size.load(Ordering::Relaxed),
            cache_size: self.cache_size.load(Ordering::Relaxed),
            index_size: self.index_size.load(Ordering::Relaxed),
            memtable_size: self.memtable_size.load(Ordering::Relaxed),
            total_reads: self.total_reads.load(Ordering::Relaxed),
            total_writes: self.total_writes.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time read of a database's diagnostic counters.
///
/// Serializable so a node's metrics/admin endpoint can hand one back as-is
/// instead of re-shaping it field by field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub size: u64,
    pub cache_size: u64,
    pub index_size: u64,
    pub memtable_size: u64,
    pub total_reads: u64,
    pub total_writes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_zeroes_every_counter() {
        let m = MetricCounters::new();
        m.record_read();
        m.record_write();
        m.set_size(5);
        m.reset();
        assert_eq!(m.snapshot(), Metric::default());
    }

    #[test]
    fn reads_and_writes_accumulate() {
        let m = MetricCounters::new();
        m.record_reads(3);
        m.record_writes(2);
        let snap = m.snapshot();
        assert_eq!(snap.total_reads, 3);
        assert_eq!(snap.total_writes, 2);
    }
}
