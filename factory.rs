//! Factories: construct database handles (and column bundles) from
//! [`Settings`], handing back an [`OwnedDb`] whose `Drop` runs the
//! factory-specific cleanup.

use std::ops::Deref;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::memory::InMemoryBackend;
use crate::backend::null::NullBackend;
use crate::column::{ColumnSet, ColumnedDb};
use crate::database::Database;
use crate::error::StoreError;
use crate::partition::PartitionName;
use crate::readonly::{ReadOnlyDb, ReadOnlyMode};

type ReleaseHook = Box<dyn FnOnce() + Send>;

/// Construction parameters for a single partition's database.
///
/// Deriving `Serialize`/`Deserialize` lets a node's top-level config file
/// list per-partition storage settings directly instead of needing a
/// hand-written parser for this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub name: PartitionName,
    pub path: PathBuf,
    pub delete_on_start: bool,
    pub can_delete_folder: bool,
}

impl Settings {
    pub fn new(name: PartitionName, path: PathBuf) -> Self {
        Settings {
            name,
            path,
            delete_on_start: false,
            can_delete_folder: true,
        }
    }

    /// Copies every flag but swaps in a different name and path; used to
    /// derive per-column settings from a parent partition's settings.
    pub fn clone_with(&self, name: PartitionName, path: PathBuf) -> Settings {
        Settings {
            name,
            path,
            delete_on_start: self.delete_on_start,
            can_delete_folder: self.can_delete_folder,
        }
    }
}

/// A database value paired with a cleanup closure run on drop. `release`
/// being `None` means this handle doesn't own any extra teardown action
/// beyond `D`'s own `Drop` (e.g. a handle borrowed from a [`Provider`](crate::Provider)).
pub struct OwnedDb<D> {
    value: Option<D>,
    release: Option<ReleaseHook>,
}

impl<D> OwnedDb<D> {
    pub fn new(value: D, release: Option<ReleaseHook>) -> Self {
        OwnedDb {
            value: Some(value),
            release,
        }
    }

    pub fn get(&self) -> &D {
        self.value.as_ref().expect("OwnedDb used after into_parts")
    }

    /// Unwraps into the bare value and release hook, bypassing this handle's
    /// own `Drop` (the caller takes over responsibility for running
    /// `release`, typically by folding it into a combined cleanup closure).
    pub fn into_parts(mut self) -> (D, Option<ReleaseHook>) {
        let value = self.value.take().expect("OwnedDb used after into_parts");
        let release = self.release.take();
        (value, release)
    }
}

impl<D> Deref for OwnedDb<D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.get()
    }
}

impl<D> Drop for OwnedDb<D> {
    fn drop(&mut self) {
        self.value = None;
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Produces owned database handles from [`Settings`].
pub trait DbFactory {
    type Db: Database;

    fn open(&self, settings: &Settings) -> Result<OwnedDb<Self::Db>, StoreError>;

    /// Resolved on-disk path for `settings`. The default just joins the
    /// partition's wire name onto the settings path; backends with their
    /// own directory layout override this.
    fn get_full_db_path(&self, settings: &Settings) -> PathBuf {
        settings.path.join(settings.name.wire_name())
    }

    /// Bulk cleanup of any factory-owned state not tied to a specific
    /// [`OwnedDb`]. A no-op by default.
    fn deinit(&mut self) {}

    /// Opens one database per column of `C`, bundling them into a
    /// [`ColumnedDb`] under a combined release hook that tears down every
    /// column in turn.
    fn open_columned<C: ColumnSet>(
        &self,
        settings: &Settings,
    ) -> Result<OwnedDb<ColumnedDb<C, Self::Db>>, StoreError> {
        let mut databases = Vec::with_capacity(C::COUNT);
        let mut releases: Vec<ReleaseHook> = Vec::new();
        for index in 0..C::COUNT {
            let column_path = settings.path.join(index.to_string());
            let column_settings = settings.clone_with(settings.name, column_path);
            let (db, release) = self.open(&column_settings)?.into_parts();
            databases.push(db);
            if let Some(release) = release {
                releases.push(release);
            }
        }
        let bundle = ColumnedDb::new(databases);
        let release: Option<ReleaseHook> = if releases.is_empty() {
            None
        } else {
            Some(Box::new(move || {
                for release in releases {
                    release();
                }
            }))
        };
        Ok(OwnedDb::new(bundle, release))
    }
}

/// Dispatches [`DbFactory::open_columned`] across factory types, the Rust
/// analogue of a generic helper that doesn't need to be a trait method.
pub fn open_columned_for<F: DbFactory, C: ColumnSet>(
    factory: &F,
    settings: &Settings,
) -> Result<OwnedDb<ColumnedDb<C, F::Db>>, StoreError> {
    factory.open_columned::<C>(settings)
}

/// Allocates a fresh [`InMemoryBackend`] per call. The release context is
/// the value itself: dropping an in-memory backend frees everything it
/// owns, so no extra bookkeeping is needed beyond `OwnedDb`'s own `Drop`.
#[derive(Debug, Default)]
pub struct InMemoryFactory;

impl DbFactory for InMemoryFactory {
    type Db = InMemoryBackend;

    fn open(&self, settings: &Settings) -> Result<OwnedDb<InMemoryBackend>, StoreError> {
        debug!(partition = %settings.name, path = %settings.path.display(), "in-memory factory opening database");
        Ok(OwnedDb::new(InMemoryBackend::new(settings.name), None))
    }
}

/// Every open call fails. Used as a sentinel factory in modes where
/// persistence must be deliberately absent.
#[derive(Debug, Default)]
pub struct NullFactory;

impl DbFactory for NullFactory {
    type Db = NullBackend;

    fn open(&self, _settings: &Settings) -> Result<OwnedDb<NullBackend>, StoreError> {
        Err(StoreError::unsupported("null factory: open"))
    }
}

/// Wraps another factory; every handle it produces is a [`ReadOnlyDb`] over
/// the wrapped factory's handle, with or without a write overlay depending
/// on how this factory was constructed.
pub struct ReadOnlyFactory<F: DbFactory> {
    inner: F,
    use_overlay: bool,
}

impl<F: DbFactory> ReadOnlyFactory<F> {
    pub fn new(inner: F, use_overlay: bool) -> Self {
        ReadOnlyFactory { inner, use_overlay }
    }
}

impl<F: DbFactory> DbFactory for ReadOnlyFactory<F> {
    type Db = ReadOnlyDb<F::Db>;

    fn open(&self, settings: &Settings) -> Result<OwnedDb<ReadOnlyDb<F::Db>>, StoreError> {
        let (inner_db, release) = self.inner.open(settings)?.into_parts();
        let mode = if self.use_overlay {
            ReadOnlyMode::Overlay(InMemoryBackend::new(settings.name))
        } else {
            ReadOnlyMode::Strict
        };
        Ok(OwnedDb::new(ReadOnlyDb::new(inner_db, mode), release))
    }

    fn deinit(&mut self) {
        self.inner.deinit();
    }
}
