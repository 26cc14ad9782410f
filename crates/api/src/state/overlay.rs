// Path: crates/api/src/state/overlay.rs

//! A copy-on-write state overlay giving each service call all-or-nothing semantics.

use crate::state::{StateAccess, StateKVPair, StateScanIter};
use oracle_types::error::StateError;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::iter::{Fuse, Peekable};
use std::ops::Bound::{Excluded, Included, Unbounded};
use std::sync::Arc;

/// A batch of key-value pairs to be inserted or updated in the state.
pub type StateInserts = Vec<(Vec<u8>, Vec<u8>)>;

/// A batch of keys to be deleted from the state.
pub type StateDeletes = Vec<Vec<u8>>;

/// A complete set of state changes (inserts/updates and deletes) from a call.
pub type StateChangeSet = (StateInserts, StateDeletes);

/// Calculates the smallest byte vector that is strictly greater than all keys
/// starting with the given prefix. Returns None if the prefix is all 0xFF bytes.
fn next_prefix(prefix: &[u8]) -> Option<Vec<u8>> {
    if prefix.is_empty() {
        return None;
    }
    let mut ub = prefix.to_vec();
    for i in (0..ub.len()).rev() {
        if let Some(byte) = ub.get_mut(i) {
            if *byte != 0xFF {
                *byte += 1;
                ub.truncate(i + 1);
                return Some(ub);
            }
        }
    }
    None
}

struct MergingIterator<'a> {
    base: Peekable<Fuse<StateScanIter<'a>>>,
    writes: Peekable<btree_map::Range<'a, Vec<u8>, Option<Vec<u8>>>>,
}

impl<'a> Iterator for MergingIterator<'a> {
    type Item = Result<StateKVPair, StateError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // A base error is surfaced immediately.
            if matches!(self.base.peek(), Some(Err(_))) {
                return self.base.next();
            }
            let base_key = self
                .base
                .peek()
                .and_then(|res| res.as_ref().ok().map(|(k, _)| k.as_ref()));
            let write_key = self.writes.peek().map(|(k, _)| k.as_slice());

            let decision = match (base_key, write_key) {
                (Some(bk), Some(wk)) => Some(bk.cmp(wk)),
                (Some(_), None) => Some(std::cmp::Ordering::Less),
                (None, Some(_)) => Some(std::cmp::Ordering::Greater),
                (None, None) => None,
            };

            match decision {
                Some(std::cmp::Ordering::Less) => return self.base.next(),
                Some(std::cmp::Ordering::Greater) => {
                    if let Some((key, Some(val))) = self.writes.next() {
                        return Some(Ok((Arc::from(key.clone()), Arc::from(val.clone()))));
                    }
                }
                Some(std::cmp::Ordering::Equal) => {
                    self.base.next(); // Shadowed by the overlay.
                    if let Some((key, Some(val))) = self.writes.next() {
                        return Some(Ok((Arc::from(key.clone()), Arc::from(val.clone()))));
                    }
                }
                None => return None,
            }
        }
    }
}

/// An in-memory, copy-on-write overlay for any `StateAccess`.
///
/// Reads are first checked against the local `writes` cache. If a key is not
/// found, the read is passed through to the underlying `base` state.
/// All writes are captured in the local cache and do not affect the `base` state
/// until the caller commits the result of `into_ordered_batch`.
#[derive(Clone)]
pub struct StateOverlay<'a> {
    base: &'a dyn StateAccess,
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>, // BTreeMap for deterministic commit order.
}

impl<'a> StateOverlay<'a> {
    /// Creates a new, empty overlay on top of a base state accessor.
    pub fn new(base: &'a dyn StateAccess) -> Self {
        Self {
            base,
            writes: BTreeMap::new(),
        }
    }

    /// True if no write has been captured.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Consumes the overlay and returns its writes in a deterministic order.
    /// This is used to commit a call's state changes back to the canonical state.
    pub fn into_ordered_batch(self) -> StateChangeSet {
        let mut inserts = Vec::new();
        let mut deletes = Vec::new();

        for (key, value_opt) in self.writes {
            match value_opt {
                Some(value) => inserts.push((key, value)),
                None => deletes.push(key),
            }
        }
        (inserts, deletes)
    }
}

impl<'a> StateAccess for StateOverlay<'a> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        match self.writes.get(key) {
            // A cached `None` is a pending delete.
            Some(value_opt) => Ok(value_opt.clone()),
            None => self.base.get(key),
        }
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.writes.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.writes.insert(key.to_vec(), None);
        Ok(())
    }

    fn batch_set(&mut self, updates: &[(Vec<u8>, Vec<u8>)]) -> Result<(), StateError> {
        for (key, value) in updates {
            self.insert(key, value)?;
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        let base = self.base.prefix_scan(prefix)?.fuse().peekable();

        let start = Included(prefix.to_vec());
        let end = match next_prefix(prefix) {
            Some(ub) => Excluded(ub),
            None => Unbounded,
        };
        let writes = self.writes.range((start, end)).peekable();

        Ok(Box::new(MergingIterator { base, writes }))
    }

    fn batch_get(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>, StateError> {
        let mut results = Vec::with_capacity(keys.len());
        for key in keys {
            results.push(self.get(key)?);
        }
        Ok(results)
    }

    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError> {
        for key in deletes {
            self.delete(key)?;
        }
        for (key, value) in inserts {
            self.insert(key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateAccessExt;

    #[derive(Default)]
    struct MapState(BTreeMap<Vec<u8>, Vec<u8>>);

    impl StateAccess for MapState {
        fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
            Ok(self.0.get(key).cloned())
        }
        fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
            self.0.insert(key.to_vec(), value.to_vec());
            Ok(())
        }
        fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
            self.0.remove(key);
            Ok(())
        }
        fn batch_set(&mut self, updates: &[(Vec<u8>, Vec<u8>)]) -> Result<(), StateError> {
            for (k, v) in updates {
                self.insert(k, v)?;
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
            for k in deletes {
                self.delete(k)?;
            }
            self.batch_set(inserts)
        }
        fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
            let items: Vec<_> = self
                .0
                .iter()
                .filter(|(k, _)| k.starts_with(prefix))
                .map(|(k, v)| Ok((Arc::from(k.as_slice()), Arc::from(v.as_slice()))))
                .collect();
            Ok(Box::new(items.into_iter()))
        }
    }

    fn keys(iter: StateScanIter<'_>) -> Vec<Vec<u8>> {
        iter.map(|r| r.unwrap().0.to_vec()).collect()
    }

    #[test]
    fn writes_are_invisible_to_base_until_committed() {
        let mut base = MapState::default();
        base.insert(b"a", b"1").unwrap();

        let (inserts, deletes) = {
            let mut overlay = StateOverlay::new(&base);
            overlay.insert(b"b", b"2").unwrap();
            overlay.delete(b"a").unwrap();
            assert_eq!(overlay.get(b"a").unwrap(), None);
            assert_eq!(overlay.get(b"b").unwrap(), Some(b"2".to_vec()));
            assert_eq!(base.get(b"a").unwrap(), Some(b"1".to_vec()));
            overlay.into_ordered_batch()
        };

        base.batch_apply(&inserts, &deletes).unwrap();
        assert_eq!(base.get(b"a").unwrap(), None);
        assert_eq!(base.get(b"b").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn dropped_overlay_leaves_base_untouched() {
        let mut base = MapState::default();
        base.insert(b"k", b"v").unwrap();
        {
            let mut overlay = StateOverlay::new(&base);
            overlay.insert(b"k", b"changed").unwrap();
            overlay.insert(b"other", b"x").unwrap();
        }
        assert_eq!(base.get(b"k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(base.get(b"other").unwrap(), None);
    }

    #[test]
    fn prefix_scan_merges_in_key_order() {
        let mut base = MapState::default();
        base.insert(&[1, 1], b"base").unwrap();
        base.insert(&[1, 3], b"base").unwrap();
        base.insert(&[1, 5], b"base").unwrap();
        base.insert(&[2, 0], b"other").unwrap();

        let mut overlay = StateOverlay::new(&base);
        overlay.insert(&[1, 2], b"new").unwrap();
        overlay.delete(&[1, 3]).unwrap();
        overlay.insert(&[1, 5], b"updated").unwrap();

        let scanned = keys(overlay.prefix_scan(&[1]).unwrap());
        assert_eq!(scanned, vec![vec![1, 1], vec![1, 2], vec![1, 5]]);

        let updated: Vec<_> = overlay
            .prefix_scan(&[1, 5])
            .unwrap()
            .map(|r| r.unwrap().1.to_vec())
            .collect();
        assert_eq!(updated, vec![b"updated".to_vec()]);
    }

    #[test]
    fn next_prefix_handles_trailing_ff() {
        assert_eq!(next_prefix(&[0x01, 0xff]), Some(vec![0x02]));
        assert_eq!(next_prefix(&[0xff, 0xff]), None);
        assert_eq!(next_prefix(&[]), None);
    }

    #[test]
    fn canonical_helpers_round_trip_through_overlay() {
        let base = MapState::default();
        let mut overlay = StateOverlay::new(&base);
        overlay.put_canonical(b"count", &7u64).unwrap();
        assert_eq!(overlay.get_canonical::<u64>(b"count").unwrap(), Some(7));
        assert_eq!(overlay.get_canonical::<u64>(b"missing").unwrap(), None);
        overlay.insert(b"bad", &[1, 2]).unwrap();
        assert!(matches!(
            overlay.get_canonical::<u64>(b"bad"),
            Err(StateError::Decode(_))
        ));
    }
}
