//! A `Bank` that keeps balances in the state it is handed.

use oracle_api::bank::Bank;
use oracle_api::state::{StateAccess, StateAccessExt};
use oracle_types::app::{AccountId, Coins};
use oracle_types::error::TransactionError;

const BALANCE_PREFIX: &[u8] = b"bank::balance::";

fn balance_key(account: &AccountId, denom: &str) -> Vec<u8> {
    [BALANCE_PREFIX, account.as_ref(), b"::", denom.as_bytes()].concat()
}

/// A token ledger whose balances live in state, so transfers roll back with the
/// caller's overlay.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateLedger;

impl StateLedger {
    /// Create a ledger
    pub fn new() -> Self {
        Self
    }

    /// Credit `amount` to `account` out of thin air
    pub fn mint(
        &self,
        state: &mut dyn StateAccess,
        account: &AccountId,
        amount: &Coins,
    ) -> Result<(), TransactionError> {
        for coin in amount.iter() {
            let current = self.balance(state, account, &coin.denom)?;
            let next = current
                .checked_add(coin.amount)
                .ok_or(TransactionError::BalanceOverflow)?;
            state.put_canonical(&balance_key(account, &coin.denom), &next)?;
        }
        Ok(())
    }
}

impl Bank for StateLedger {
    fn balance(
        &self,
        state: &dyn StateAccess,
        account: &AccountId,
        denom: &str,
    ) -> Result<u128, TransactionError> {
        Ok(state
            .get_canonical::<u128>(&balance_key(account, denom))?
            .unwrap_or(0))
    }

    fn send(
        &self,
        state: &mut dyn StateAccess,
        from: &AccountId,
        to: &AccountId,
        amount: &Coins,
    ) -> Result<(), TransactionError> {
        for coin in amount.iter() {
            let balance = self.balance(state, from, &coin.denom)?;
            if balance < coin.amount {
                return Err(TransactionError::InsufficientFunds {
                    denom: coin.denom,
                    balance,
                    needed: coin.amount,
                });
            }
        }
        for coin in amount.iter() {
            let from_balance = self.balance(state, from, &coin.denom)?;
            state.put_canonical(
                &balance_key(from, &coin.denom),
                &(from_balance - coin.amount),
            )?;
            let to_balance = self.balance(state, to, &coin.denom)?;
            let credited = to_balance
                .checked_add(coin.amount)
                .ok_or(TransactionError::BalanceOverflow)?;
            state.put_canonical(&balance_key(to, &coin.denom), &credited)?;
        }
        Ok(())
    }
}
