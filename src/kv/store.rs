//! Ordered in-memory KV store

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::catalog::{IndexId, TableId};

use super::datum::KeyPart;
use super::key::{Key, KvValue};

#[derive(Debug, Default, Clone)]
pub struct KvStore {
    data: BTreeMap<Key, KvValue>,
}

impl KvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: Key, value: KvValue) {
        self.data.insert(key, value);
    }

    pub fn get(&self, key: &Key) -> Option<&KvValue> {
        self.data.get(key)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Every KV of one index in key order. Call `.rev()` for a reverse scan.
    pub fn scan_index(
        &self,
        table: TableId,
        index: IndexId,
    ) -> impl DoubleEndedIterator<Item = (&Key, &KvValue)> {
        self.data.range((
            Bound::Included(Key::index_start(table, index)),
            Bound::Excluded(Key::index_end(table, index)),
        ))
    }

    /// KVs of one index whose key starts with `prefix`, in key order.
    pub fn scan_prefix<'a>(
        &'a self,
        table: TableId,
        index: IndexId,
        prefix: &'a [KeyPart],
    ) -> impl Iterator<Item = (&'a Key, &'a KvValue)> + 'a {
        let start = Key::row(table, index, prefix.to_vec());
        self.data
            .range((Bound::Included(start), Bound::Excluded(Key::index_end(table, index))))
            .take_while(move |(key, _)| key.parts.starts_with(prefix))
    }

    /// All KVs of one row (sentinel first), in key order.
    pub fn row_entries(
        &self,
        table: TableId,
        index: IndexId,
        parts: &[KeyPart],
    ) -> Vec<(&Key, &KvValue)> {
        let start = Key::row(table, index, parts.to_vec());
        self.data
            .range((Bound::Included(start.clone()), Bound::Unbounded))
            .take_while(|(key, _)| key.same_row(&start))
            .collect()
    }
}
