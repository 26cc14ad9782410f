// Path: crates/types/src/prelude.rs

//! A curated set of commonly used traits and types.

/// An extension trait for `Option` that provides a convenient `required` method
/// to convert an `Option` to a `Result` with a specific error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, E>`, returning the provided
    /// error if the option is `None`.
    fn required<E>(self, err: E) -> Result<T, E>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required<E>(self, err: E) -> Result<T, E> {
        self.ok_or(err)
    }
}

pub use crate::app::{AccountId, ChainId, Coins, Dec};
pub use crate::error::{ErrorCode, OracleError, StateError, TransactionError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_maps_none_to_error() {
        let missing: Option<u64> = None;
        let err = missing.required(OracleError::RequestNotFound(9)).unwrap_err();
        assert_eq!(err.code(), "ORACLE_REQUEST_NOT_FOUND");
        assert_eq!(Some(3u64).required(OracleError::RequestNotFound(9)).unwrap(), 3);
    }
}
