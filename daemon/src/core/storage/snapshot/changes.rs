use std::collections::{btree_map, BTreeMap};

use bytes::Bytes;

use super::EntryState;

/// Pending writes of a single column.
/// `None` marks a key deleted by the snapshot.
#[derive(Clone, Debug, Default)]
pub struct Changes {
    pub writes: BTreeMap<Bytes, Option<Bytes>>,
}

impl Changes {
    // Record a write, returning what the snapshot held for the key before
    pub fn insert(&mut self, key: impl Into<Bytes>, value: impl Into<Bytes>) -> EntryState<Bytes> {
        Self::state_of(self.writes.insert(key.into(), Some(value.into())))
    }

    // Record a deletion, returning what the snapshot held for the key before
    pub fn remove(&mut self, key: impl Into<Bytes>) -> EntryState<Bytes> {
        Self::state_of(self.writes.insert(key.into(), None))
    }

    fn state_of(previous: Option<Option<Bytes>>) -> EntryState<Bytes> {
        match previous {
            Some(Some(value)) => EntryState::Stored(value),
            Some(None) => EntryState::Deleted,
            None => EntryState::Absent,
        }
    }

    pub fn get(&self, key: &[u8]) -> EntryState<&Bytes> {
        match self.writes.get(key) {
            Some(Some(value)) => EntryState::Stored(value),
            Some(None) => EntryState::Deleted,
            None => EntryState::Absent,
        }
    }

    // Some(true) if written, Some(false) if deleted, None if untouched
    pub fn contains(&self, key: &[u8]) -> Option<bool> {
        self.writes.get(key).map(|v| v.is_some())
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Bytes, &Option<Bytes>)> {
        self.writes.iter()
    }
}

impl IntoIterator for Changes {
    type Item = (Bytes, Option<Bytes>);
    type IntoIter = btree_map::IntoIter<Bytes, Option<Bytes>>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}
