//! Borrowed read results.
//!
//! A [`Value`] is the uniform way every backend hands bytes back to a caller.
//! Some backends (in-memory, null) always materialize an owned copy and have
//! nothing to release; others (a pinned-slice style engine binding) borrow
//! directly from engine-owned memory and must run a release hook exactly
//! once when the caller is done. Both cases are the same type: the hook is
//! simply absent in the first case.

use bytes::Bytes;
use std::fmt;
use std::ops::Deref;

type ReleaseHook = Box<dyn FnOnce() + Send>;

/// A byte slice returned from a read, plus an optional one-shot release
/// callback. `Value` is not `Clone`: a second handle to the same bytes would
/// need the backend to document refcounting, which none of ours do.
pub struct Value {
    bytes: Bytes,
    release: Option<ReleaseHook>,
}

impl Value {
    /// Wrap bytes that need no release action (owned copies, static data).
    pub fn inert(bytes: impl Into<Bytes>) -> Self {
        Value {
            bytes: bytes.into(),
            release: None,
        }
    }

    /// Wrap bytes whose backend must run `release` exactly once when the
    /// caller drops this handle, e.g. to return a pinned slice or a pooled
    /// buffer.
    pub fn with_release(bytes: impl Into<Bytes>, release: ReleaseHook) -> Self {
        Value {
            bytes: bytes.into(),
            release: Some(release),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(mut self) -> Bytes {
        // Run any release hook before handing out the owned `Bytes`: once we
        // return `Bytes` the caller can clone and outlive `self`, so the hook
        // (which is about *this* handle's lifetime) must fire now.
        self.run_release();
        self.bytes.clone()
    }

    fn run_release(&mut self) {
        if let Some(hook) = self.release.take() {
            hook();
        }
    }
}

impl Deref for Value {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for Value {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("bytes", &self.bytes)
            .field("has_release", &self.release.is_some())
            .finish()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl PartialEq<[u8]> for Value {
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes.as_ref() == other
    }
}

impl PartialEq<&[u8]> for Value {
    fn eq(&self, other: &&[u8]) -> bool {
        self.bytes.as_ref() == *other
    }
}

/// A key/value pair yielded by iterators and sorted views.
#[derive(Debug)]
pub struct Entry {
    pub key: Value,
    pub value: Value,
}

impl Entry {
    pub fn new(key: Value, value: Value) -> Self {
        Entry { key, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn inert_value_runs_no_hook() {
        let v = Value::inert(Bytes::from_static(b"hello"));
        assert_eq!(v.as_bytes(), b"hello");
    }

    #[test]
    fn release_hook_runs_exactly_once_on_drop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        {
            let _v = Value::with_release(
                Bytes::from_static(b"x"),
                Box::new(move || {
                    c.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_hook_runs_exactly_once_via_into_bytes() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let v = Value::with_release(
            Bytes::from_static(b"x"),
            Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let bytes = v.into_bytes();
        assert_eq!(&bytes[..], b"x");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
