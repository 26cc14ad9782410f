// Path: crates/services/src/oracle/rewards.rs

//! Data-provider rewards.
//!
//! Every byte a data source contributes to a request that reaches quorum earns its
//! owner `current_reward_per_byte`. Once the rewards accumulated since the last
//! payout reach the threshold, the rate decays geometrically. Balances are paid out
//! in whole units from the data-provider pool and the fractional remainder carries
//! over.

use super::{data_provider_pool, store};
use oracle_api::bank::Bank;
use oracle_api::state::StateAccess;
use oracle_api::transaction::context::TxContext;
use oracle_types::app::{Coins, Dec, OracleEvent, Report, Request};
use oracle_types::error::{FatalError, OracleError, TransactionError};
use oracle_types::service_configs::OracleParams;

fn overflow(what: &'static str) -> TransactionError {
    OracleError::Overflow(what).into()
}

/// Credits the owners of the data sources behind `reports` and advances the curve.
pub fn accrue(
    state: &mut dyn StateAccess,
    params: &OracleParams,
    request: &Request,
    reports: &[Report],
) -> Result<(), TransactionError> {
    let mut curve = store::reward_curve(state, params.data_provider_reward_per_byte)?;
    let keep = Dec::ONE
        .checked_sub(params.reward_decreasing_fraction)
        .ok_or_else(|| overflow("reward decreasing fraction"))?;

    for report in reports {
        for raw_report in &report.raw_reports {
            let Some(raw_request) = request.raw_request(raw_report.external_id) else {
                continue;
            };
            let owner = store::get_data_source(state, raw_request.data_source_id)?.owner;
            let bytes = raw_report.data.len() as u64;

            let mut reward = curve
                .current_reward_per_byte
                .checked_mul_int(bytes)
                .ok_or_else(|| overflow("provider reward"))?;
            while !curve.current_reward_per_byte.is_zero()
                && curve
                    .accumulated
                    .checked_add(reward)
                    .ok_or_else(|| overflow("accumulated rewards"))?
                    >= params.data_provider_reward_threshold
            {
                curve.current_reward_per_byte = curve
                    .current_reward_per_byte
                    .checked_mul(keep)
                    .ok_or_else(|| overflow("reward rate"))?;
                reward = curve
                    .current_reward_per_byte
                    .checked_mul_int(bytes)
                    .ok_or_else(|| overflow("provider reward"))?;
            }

            let balance = store::provider_reward(state, &owner)?
                .checked_add(reward)
                .ok_or_else(|| overflow("provider balance"))?;
            store::set_provider_reward(state, &owner, balance)?;
            curve.accumulated = curve
                .accumulated
                .checked_add(reward)
                .ok_or_else(|| overflow("accumulated rewards"))?;
        }
    }

    store::set_reward_curve(state, &curve)?;
    Ok(())
}

/// Pays every owner the whole units of its balance and resets the accumulator.
///
/// An owner the pool cannot pay keeps its full balance for the next sweep.
pub fn payout(
    state: &mut dyn StateAccess,
    bank: &dyn Bank,
    params: &OracleParams,
    ctx: &mut TxContext,
) -> Result<(), FatalError> {
    let pool = data_provider_pool();
    let denom = params.data_provider_reward_denom.as_str();

    for (owner, balance) in store::provider_rewards(state)? {
        let whole = balance.truncate();
        if whole == 0 {
            continue;
        }
        let amount = Coins::single(denom, whole);
        match bank.send(state, &pool, &owner, &amount) {
            Ok(()) => {}
            Err(TransactionError::InsufficientFunds {
                balance: available, ..
            }) => {
                log::warn!(
                    "[Rewards] Pool holds {} {}, cannot pay {} to {}; carrying balance",
                    available,
                    denom,
                    whole,
                    owner
                );
                continue;
            }
            Err(e) => return Err(e.into()),
        }
        store::set_provider_reward(state, &owner, balance.fract())?;
        log::debug!("[Rewards] Paid {} {} to {}", whole, denom, owner);
        ctx.emit(OracleEvent::ProviderRewardPaid { owner, amount });
    }

    let mut curve = store::reward_curve(state, params.data_provider_reward_per_byte)?;
    curve.accumulated = Dec::ZERO;
    store::set_reward_curve(state, &curve)?;
    Ok(())
}
