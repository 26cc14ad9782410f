// Path: crates/services/src/oracle/fees.rs

//! Collects data-source fees from the payer of a request into the data-provider pool.

use super::{data_provider_pool, store};
use oracle_api::bank::Bank;
use oracle_api::state::StateAccess;
use oracle_types::app::{AccountId, Coins, RawRequest};
use oracle_types::error::{OracleError, TransactionError};

/// Charges `fee × ask_count` for every raw request whose data source has a fee.
///
/// Each increment is checked against `fee_limit` before it is transferred. Returns
/// the total collected. Transfers made before a failure are not undone here; the
/// caller discards the whole call instead.
pub fn collect(
    state: &mut dyn StateAccess,
    bank: &dyn Bank,
    payer: &AccountId,
    fee_limit: &Coins,
    ask_count: u64,
    raw_requests: &[RawRequest],
) -> Result<Coins, TransactionError> {
    let pool = data_provider_pool();
    let mut total = Coins::new();
    for raw in raw_requests {
        let data_source = store::get_data_source(state, raw.data_source_id)?;
        if data_source.fee.is_empty() {
            continue;
        }
        let increment = data_source
            .fee
            .checked_mul(ask_count)
            .ok_or(TransactionError::BalanceOverflow)?;
        total = total
            .checked_add(&increment)
            .ok_or(TransactionError::BalanceOverflow)?;
        if let Some(over) = total.first_exceeding(fee_limit) {
            return Err(OracleError::NotEnoughFee {
                limit: fee_limit.amount_of(&over.denom),
                denom: over.denom,
                required: over.amount,
            }
            .into());
        }
        bank.send(state, payer, &pool, &increment)?;
    }
    if !total.is_empty() {
        log::debug!("[Oracle] Collected fees {:?} from {}", total, payer);
    }
    Ok(total)
}
