//! Cursor over a materialized lexicographic key range.

use crate::value::Entry;

/// A cursor over a lexicographic range `[inclusive_low, exclusive_high)` of
/// keys, returned by [`Database::get_view_between`](crate::Database::get_view_between).
///
/// A view owns its materialized range; entries carry owned key/value bytes
/// that remain valid until the view itself is dropped. Building the range is
/// the backend's job (§4.5): the in-memory backend does it with a single
/// `BTreeMap` range scan.
pub struct SortedView {
    entries: Vec<Option<Entry>>,
    next_index: usize,
}

impl SortedView {
    /// Builds a view from entries already in ascending key order. Callers
    /// (backends) are trusted to pass a sorted slice; this type does not
    /// re-sort.
    pub fn from_sorted_entries(entries: Vec<Entry>) -> Self {
        SortedView {
            entries: entries.into_iter().map(Some).collect(),
            next_index: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// First call without a prior seek yields the first in-range entry;
    /// subsequent calls advance past whatever was last returned or sought to.
    pub fn move_next(&mut self) -> Option<Entry> {
        while self.next_index < self.entries.len() {
            let idx = self.next_index;
            self.next_index += 1;
            if let Some(entry) = self.entries[idx].take() {
                return Some(entry);
            }
        }
        None
    }

    /// Positions the cursor at the largest key ≤ `value`, using binary
    /// search over the materialized range. Returns `false` if no such key
    /// exists (leaving the cursor untouched). Intended to be called once,
    /// before the first `move_next`: the following `move_next` advances past
    /// this position and yields its successor.
    pub fn start_before(&mut self, value: &[u8]) -> bool {
        let boundary = self.entries.partition_point(|e| match e {
            Some(entry) => entry.key.as_bytes() <= value,
            None => true,
        });
        if boundary == 0 {
            return false;
        }
        self.next_index = boundary;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn entry(k: &[u8], v: &[u8]) -> Entry {
        Entry::new(Value::inert(k.to_vec()), Value::inert(v.to_vec()))
    }

    fn view() -> SortedView {
        SortedView::from_sorted_entries(vec![
            entry(b"a", b"1"),
            entry(b"c", b"2"),
            entry(b"e", b"3"),
        ])
    }

    #[test]
    fn move_next_without_seek_yields_first_entry() {
        let mut v = view();
        assert_eq!(v.move_next().unwrap().key.as_bytes(), b"a");
        assert_eq!(v.move_next().unwrap().key.as_bytes(), b"c");
        assert_eq!(v.move_next().unwrap().key.as_bytes(), b"e");
        assert!(v.move_next().is_none());
    }

    #[test]
    fn start_before_positions_on_largest_key_leq_value() {
        let mut v = view();
        assert!(v.start_before(b"d"));
        // largest key <= "d" is "c"; successor is "e"
        assert_eq!(v.move_next().unwrap().key.as_bytes(), b"e");
        assert!(v.move_next().is_none());
    }

    #[test]
    fn start_before_exact_match_yields_successor() {
        let mut v = view();
        assert!(v.start_before(b"c"));
        assert_eq!(v.move_next().unwrap().key.as_bytes(), b"e");
    }

    #[test]
    fn start_before_smaller_than_all_keys_fails() {
        let mut v = view();
        assert!(!v.start_before(b"\x00"));
        // cursor untouched: still yields from the start
        assert_eq!(v.move_next().unwrap().key.as_bytes(), b"a");
    }

    #[test]
    fn start_before_larger_than_all_keys_exhausts() {
        let mut v = view();
        assert!(v.start_before(b"z"));
        assert!(v.move_next().is_none());
    }

    #[test]
    fn empty_view_has_no_entries() {
        let mut v = SortedView::from_sorted_entries(vec![]);
        assert!(v.is_empty());
        assert!(v.move_next().is_none());
    }
}
