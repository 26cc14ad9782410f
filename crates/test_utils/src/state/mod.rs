//! An in-memory `StateAccess` backed by a `BTreeMap`.

use oracle_api::state::{StateAccess, StateScanIter};
use oracle_types::error::StateError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// An ordered, in-memory key-value store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryState {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryState {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Count the keys starting with `prefix`
    pub fn count_prefix(&self, prefix: &[u8]) -> usize {
        self.data.keys().filter(|k| k.starts_with(prefix)).count()
    }
}

impl StateAccess for MemoryState {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.data.get(key).cloned())
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.data.remove(key);
        Ok(())
    }

    fn batch_set(&mut self, updates: &[(Vec<u8>, Vec<u8>)]) -> Result<(), StateError> {
        for (key, value) in updates {
            self.insert(key, value)?;
        }
        Ok(())
    }

    fn batch_get(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>, StateError> {
        keys.iter().map(|k| self.get(k)).collect()
    }

    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError> {
        for key in deletes {
            self.delete(key)?;
        }
        self.batch_set(inserts)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        let owned = prefix.to_vec();
        let iter = self
            .data
            .range(prefix.to_vec()..)
            .take_while(move |(k, _)| k.starts_with(&owned))
            .map(|(k, v)| Ok((Arc::from(k.as_slice()), Arc::from(v.as_slice()))));
        Ok(Box::new(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_scan_is_ordered_and_bounded() {
        let mut state = MemoryState::new();
        state.insert(&[1, 2], b"b").unwrap();
        state.insert(&[1, 1], b"a").unwrap();
        state.insert(&[2, 0], b"c").unwrap();
        let keys: Vec<Vec<u8>> = state
            .prefix_scan(&[1])
            .unwrap()
            .map(|r| r.unwrap().0.to_vec())
            .collect();
        assert_eq!(keys, vec![vec![1, 1], vec![1, 2]]);
        assert_eq!(state.count_prefix(&[2]), 1);
    }
}
