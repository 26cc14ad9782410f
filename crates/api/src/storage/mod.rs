// Path: crates/api/src/storage/mod.rs

//! API for the content-addressed blob cache holding data source executables and
//! compiled oracle scripts.

use oracle_types::error::StateError;
use sha2::{Digest, Sha256};

/// Computes the content address of `bytes`.
pub fn content_hash(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// A content-addressed store of large blobs that live outside consensus state.
///
/// Records in state refer to blobs by their SHA-256 digest. Storing the same bytes
/// twice is a no-op returning the same digest.
pub trait BlobCache: Send + Sync {
    /// Stores `bytes` and returns their content hash.
    fn put(&self, bytes: &[u8]) -> Result<[u8; 32], StateError>;

    /// Fetches the blob with the given content hash.
    fn get(&self, hash: &[u8; 32]) -> Result<Option<Vec<u8>>, StateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_sha256() {
        assert_eq!(
            hex::encode(content_hash(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
