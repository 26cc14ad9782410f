// Path: crates/api/src/bank/mod.rs
//! Defines the `Bank` trait, the token ledger the oracle settles fees and rewards through.

use crate::state::StateAccess;
use oracle_types::app::{AccountId, Coins};
use oracle_types::error::TransactionError;

/// A multi-denomination token ledger.
///
/// Transfers take the state they act on so that they participate in the caller's
/// overlay and roll back with it.
pub trait Bank: Send + Sync {
    /// Returns the balance of `account` in `denom`.
    fn balance(
        &self,
        state: &dyn StateAccess,
        account: &AccountId,
        denom: &str,
    ) -> Result<u128, TransactionError>;

    /// Moves `amount` from `from` to `to`.
    ///
    /// Fails with `InsufficientFunds` if any denomination is short, leaving both
    /// balances unchanged.
    fn send(
        &self,
        state: &mut dyn StateAccess,
        from: &AccountId,
        to: &AccountId,
        amount: &Coins,
    ) -> Result<(), TransactionError>;
}
