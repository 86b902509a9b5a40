mod changes;
mod iterator_mode;

use std::{collections::HashMap, hash::Hash};

use bytes::Bytes;

pub use changes::Changes;
pub use iterator_mode::*;

/// State of an entry as seen by the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState<T> {
    /// Written by the snapshot
    Stored(T),
    /// Deleted by the snapshot
    Deleted,
    /// Untouched, the caller must fallback on disk
    Absent,
}

impl<T> EntryState<T> {
    pub fn is_deleted(&self) -> bool {
        matches!(self, EntryState::Deleted)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, EntryState::Absent)
    }

    pub fn stored(self) -> Option<T> {
        match self {
            EntryState::Stored(v) => Some(v),
            _ => None,
        }
    }
}

/// In-memory batch of writes grouped per column.
/// A ledger mutation runs entirely against one snapshot,
/// which is then written as a single batch or dropped.
#[derive(Debug)]
pub struct Snapshot<C: Hash + Eq> {
    columns: HashMap<C, Changes>,
}

impl<C: Hash + Eq> Default for Snapshot<C> {
    fn default() -> Self {
        Self {
            columns: HashMap::new(),
        }
    }
}

impl<C: Hash + Eq> Snapshot<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<K: Into<Bytes>, V: Into<Bytes>>(
        &mut self,
        column: C,
        key: K,
        value: V,
    ) -> EntryState<Bytes> {
        self.columns.entry(column).or_default().insert(key, value)
    }

    pub fn delete<K: Into<Bytes>>(&mut self, column: C, key: K) -> EntryState<Bytes> {
        self.columns.entry(column).or_default().remove(key)
    }

    pub fn get(&self, column: &C, key: &[u8]) -> EntryState<&Bytes> {
        match self.columns.get(column) {
            Some(changes) => changes.get(key),
            None => EntryState::Absent,
        }
    }

    pub fn contains(&self, column: &C, key: &[u8]) -> Option<bool> {
        self.columns
            .get(column)
            .and_then(|changes| changes.contains(key))
    }

    pub fn changes(&self, column: &C) -> Option<&Changes> {
        self.columns.get(column)
    }

    // Total number of pending writes and deletions
    pub fn len(&self) -> usize {
        self.columns.values().map(Changes::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.values().all(Changes::is_empty)
    }

    pub fn into_columns(self) -> impl Iterator<Item = (C, Changes)> {
        self.columns.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestColumn {
        A,
        B,
    }

    #[test]
    fn test_put_then_delete_is_visible() {
        let mut snapshot = Snapshot::new();
        assert!(snapshot.get(&TestColumn::A, b"key").is_absent());

        snapshot.put(TestColumn::A, &b"key"[..], &b"value"[..]);
        assert_eq!(
            snapshot.get(&TestColumn::A, b"key").stored().map(|v| v.as_ref()),
            Some(&b"value"[..])
        );
        // other columns are isolated
        assert!(snapshot.get(&TestColumn::B, b"key").is_absent());

        let prev = snapshot.delete(TestColumn::A, &b"key"[..]);
        assert!(matches!(prev, EntryState::Stored(_)));
        assert!(snapshot.get(&TestColumn::A, b"key").is_deleted());
        assert_eq!(snapshot.contains(&TestColumn::A, b"key"), Some(false));
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_delete_untouched_key_is_recorded() {
        let mut snapshot = Snapshot::new();
        assert!(snapshot.delete(TestColumn::B, &b"gone"[..]).is_absent());
        assert!(!snapshot.is_empty());
        let columns: Vec<_> = snapshot.into_columns().collect();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].0, TestColumn::B);
    }
}
