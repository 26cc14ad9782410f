// Path: crates/api/src/state/accessor.rs
//! Defines the `StateAccess` trait for key-value storage operations.

use crate::state::StateScanIter;
use oracle_types::codec::{from_bytes_canonical, to_bytes_canonical};
use oracle_types::error::StateError;
use oracle_types::MAX_STATE_VALUE_BYTES;
use parity_scale_codec::{Decode, Encode};

/// A dyn-safe trait that provides a complete interface for key-value storage operations,
/// including single-item, batch, and scanning methods.
///
/// This trait erases the concrete store type, allowing services to interact with
/// state without needing to know its implementation.
pub trait StateAccess: Send + Sync {
    /// Gets a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError>;

    /// Inserts a key-value pair.
    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError>;

    /// Deletes a key-value pair.
    fn delete(&mut self, key: &[u8]) -> Result<(), StateError>;

    /// Sets multiple key-value pairs in a single batch operation.
    fn batch_set(&mut self, updates: &[(Vec<u8>, Vec<u8>)]) -> Result<(), StateError>;

    /// Gets multiple values by keys in a single batch operation.
    fn batch_get(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>, StateError>;

    /// Atomically applies a batch of inserts/updates and deletes.
    /// This should be the primary method for committing transactional changes.
    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError>;

    /// Scans for all key-value pairs starting with the given prefix, in ascending key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError>;
}

// Blanket implementation to allow `StateAccess` to be used behind a `Box` trait object.
impl<T: StateAccess + ?Sized> StateAccess for Box<T> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        (**self).get(key)
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        (**self).insert(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        (**self).delete(key)
    }

    fn batch_set(&mut self, updates: &[(Vec<u8>, Vec<u8>)]) -> Result<(), StateError> {
        (**self).batch_set(updates)
    }

    fn batch_get(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>, StateError> {
        (**self).batch_get(keys)
    }

    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError> {
        (**self).batch_apply(inserts, deletes)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        (**self).prefix_scan(prefix)
    }
}

/// Typed reads and writes through the canonical codec.
///
/// Implemented for every `StateAccess`, including `dyn StateAccess`.
pub trait StateAccessExt: StateAccess {
    /// Reads and decodes the value at `key`, or `None` if absent.
    ///
    /// Values larger than `MAX_STATE_VALUE_BYTES` are rejected before decoding.
    fn get_canonical<T: Decode>(&self, key: &[u8]) -> Result<Option<T>, StateError> {
        match self.get(key)? {
            Some(bytes) if bytes.len() > MAX_STATE_VALUE_BYTES => Err(StateError::InvalidValue(
                format!("value of {} bytes exceeds state limit", bytes.len()),
            )),
            Some(bytes) => from_bytes_canonical(&bytes)
                .map(Some)
                .map_err(StateError::Decode),
            None => Ok(None),
        }
    }

    /// Encodes `value` and writes it at `key`.
    fn put_canonical<T: Encode>(&mut self, key: &[u8], value: &T) -> Result<(), StateError> {
        let bytes = to_bytes_canonical(value).map_err(StateError::InvalidValue)?;
        self.insert(key, &bytes)
    }
}

impl<T: StateAccess + ?Sized> StateAccessExt for T {}
