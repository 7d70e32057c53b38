//! Column families: an enum-indexed bundle of named partitions sharing one
//! logical dataset, each with its own atomicity boundary.

use std::fmt;
use std::hash::Hash;

use crate::batch::WriteBatch;
use crate::database::Database;
use crate::error::StoreError;
use crate::snapshot::Snapshot;

/// A closed, compile-time-sized enumeration of columns. Implementors are
/// plain fieldless enums; `index` must be a bijection onto `0..COUNT`.
pub trait ColumnSet: Copy + Eq + Hash + 'static {
    const COUNT: usize;

    fn index(self) -> usize;
}

/// A bundle of `C::COUNT` databases, one per column, indexed by `C`.
pub struct ColumnedDb<C: ColumnSet, D: Database> {
    columns: Vec<D>,
    _marker: std::marker::PhantomData<C>,
}

impl<C: ColumnSet, D: Database> ColumnedDb<C, D> {
    /// Builds a bundle from per-column databases, supplied in `C::index`
    /// order. Panics if `databases.len() != C::COUNT`: this is a programmer
    /// error at construction time, not a runtime condition callers recover
    /// from.
    pub fn new(databases: Vec<D>) -> Self {
        assert_eq!(
            databases.len(),
            C::COUNT,
            "ColumnedDb::new: expected {} columns, got {}",
            C::COUNT,
            databases.len()
        );
        ColumnedDb {
            columns: databases,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn get_column_db(&self, column: C) -> &D {
        &self.columns[column.index()]
    }

    pub fn start_write_batch(&self) -> ColumnsWriteBatch<'_, C, D> {
        ColumnsWriteBatch {
            batches: self.columns.iter().map(WriteBatch::new).collect(),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn create_snapshot(&self) -> Result<ColumnDbSnapshot<'_, C>, StoreError> {
        let snapshots = self
            .columns
            .iter()
            .map(|db| db.snapshot())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ColumnDbSnapshot {
            snapshots,
            _marker: std::marker::PhantomData,
        })
    }
}

impl<C: ColumnSet, D: Database> fmt::Debug for ColumnedDb<C, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnedDb")
            .field("columns", &self.columns)
            .finish()
    }
}

/// A bundle of per-column write batches that commit together.
///
/// Commit is **per-column atomic**, not cross-column atomic: columns commit
/// in index order, and the first column whose commit fails stops the sweep —
/// its error is returned and any later columns are left uncommitted. This is
/// a deliberate, documented limitation, not an oversight (§4.7).
pub struct ColumnsWriteBatch<'db, C: ColumnSet, D: Database> {
    batches: Vec<WriteBatch<'db>>,
    _marker: std::marker::PhantomData<(C, D)>,
}

impl<'db, C: ColumnSet, D: Database> ColumnsWriteBatch<'db, C, D> {
    pub fn get_column_batch(&mut self, column: C) -> &mut WriteBatch<'db> {
        &mut self.batches[column.index()]
    }

    pub fn commit(mut self) -> Result<(), StoreError> {
        for batch in &mut self.batches {
            batch.commit()?;
        }
        Ok(())
    }
}

/// A bundle of per-column snapshots, taken independently (not as one atomic
/// cross-column point in time — each column's `snapshot()` call lands at a
/// slightly different instant).
pub struct ColumnDbSnapshot<'db, C: ColumnSet> {
    snapshots: Vec<Box<dyn Snapshot + 'db>>,
    _marker: std::marker::PhantomData<C>,
}

impl<'db, C: ColumnSet> ColumnDbSnapshot<'db, C> {
    pub fn get_column_snapshot(&self, column: C) -> &dyn Snapshot {
        self.snapshots[column.index()].as_ref()
    }
}

impl<C: ColumnSet> fmt::Debug for ColumnDbSnapshot<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDbSnapshot")
            .field("columns", &self.snapshots.len())
            .finish()
    }
}
