//! An in-memory `BlobCache`.

use oracle_api::storage::{content_hash, BlobCache};
use oracle_types::error::StateError;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// A content-addressed blob store held in memory.
#[derive(Debug, Default)]
pub struct MemoryBlobCache {
    blobs: Mutex<BTreeMap<[u8; 32], Vec<u8>>>,
}

impl MemoryBlobCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct blobs stored
    pub fn len(&self) -> usize {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if no blob is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobCache for MemoryBlobCache {
    fn put(&self, bytes: &[u8]) -> Result<[u8; 32], StateError> {
        let hash = content_hash(bytes);
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(hash, bytes.to_vec());
        Ok(hash)
    }

    fn get(&self, hash: &[u8; 32]) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(hash)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_is_stored_once() {
        let cache = MemoryBlobCache::new();
        let a = cache.put(b"exe").unwrap();
        let b = cache.put(b"exe").unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&a).unwrap(), Some(b"exe".to_vec()));
        assert_eq!(cache.get(&[0; 32]).unwrap(), None);
    }
}
