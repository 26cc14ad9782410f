// Path: crates/services/src/oracle/store.rs

//! Typed accessors for every record, counter and pointer the oracle keeps in state.
//!
//! Counters are stored as raw big-endian `u64`s. Every other value goes through the
//! canonical codec.

use oracle_api::state::{StateAccess, StateAccessExt};
use oracle_types::app::{
    AccountId, DataSource, DataSourceId, Dec, OracleResult, OracleScript, OracleScriptId,
    Report, Request, RequestId, RewardCurve, ValidatorStatus,
};
use oracle_types::error::{OracleError, StateError, TransactionError};
use oracle_types::prelude::OptionExt;
use oracle_types::keys::{
    data_source_key, oracle_script_key, provider_reward_key, provider_rewards_prefix,
    report_key, reporter_key, reports_prefix, request_key, result_key, validator_status_key,
    DATA_SOURCE_COUNT_KEY, ORACLE_SCRIPT_COUNT_KEY, PENDING_RESOLVE_LIST_KEY,
    REQUEST_COUNT_KEY, REQUEST_LAST_EXPIRED_KEY, REWARD_CURVE_KEY, ROLLING_SEED_KEY,
};

const REPORTER_MARKER: &[u8] = &[1];

fn get_u64(state: &dyn StateAccess, key: &[u8]) -> Result<u64, StateError> {
    match state.get(key)? {
        None => Ok(0),
        Some(bytes) => <[u8; 8]>::try_from(bytes.as_slice())
            .map(u64::from_be_bytes)
            .map_err(|_| StateError::Decode(format!("counter of {} bytes", bytes.len()))),
    }
}

fn put_u64(state: &mut dyn StateAccess, key: &[u8], value: u64) -> Result<(), StateError> {
    state.insert(key, &value.to_be_bytes())
}

// --- Counters and pointers ---

pub fn request_count(state: &dyn StateAccess) -> Result<u64, StateError> {
    get_u64(state, REQUEST_COUNT_KEY)
}

pub fn set_request_count(state: &mut dyn StateAccess, count: u64) -> Result<(), StateError> {
    put_u64(state, REQUEST_COUNT_KEY, count)
}

pub fn request_last_expired(state: &dyn StateAccess) -> Result<RequestId, StateError> {
    get_u64(state, REQUEST_LAST_EXPIRED_KEY)
}

pub fn set_request_last_expired(
    state: &mut dyn StateAccess,
    id: RequestId,
) -> Result<(), StateError> {
    put_u64(state, REQUEST_LAST_EXPIRED_KEY, id)
}

/// Bumps the data source counter and returns the new id.
pub fn next_data_source_id(state: &mut dyn StateAccess) -> Result<DataSourceId, StateError> {
    let id = get_u64(state, DATA_SOURCE_COUNT_KEY)?.saturating_add(1);
    put_u64(state, DATA_SOURCE_COUNT_KEY, id)?;
    Ok(id)
}

/// Bumps the oracle script counter and returns the new id.
pub fn next_oracle_script_id(state: &mut dyn StateAccess) -> Result<OracleScriptId, StateError> {
    let id = get_u64(state, ORACLE_SCRIPT_COUNT_KEY)?.saturating_add(1);
    put_u64(state, ORACLE_SCRIPT_COUNT_KEY, id)?;
    Ok(id)
}

/// The rolling seed, all zeroes until the first block rolls it.
pub fn rolling_seed(state: &dyn StateAccess) -> Result<[u8; 32], StateError> {
    match state.get(ROLLING_SEED_KEY)? {
        None => Ok([0u8; 32]),
        Some(bytes) => <[u8; 32]>::try_from(bytes.as_slice())
            .map_err(|_| StateError::Decode(format!("rolling seed of {} bytes", bytes.len()))),
    }
}

pub fn set_rolling_seed(state: &mut dyn StateAccess, seed: &[u8; 32]) -> Result<(), StateError> {
    state.insert(ROLLING_SEED_KEY, seed)
}

pub fn pending_resolve_list(state: &dyn StateAccess) -> Result<Vec<RequestId>, StateError> {
    Ok(state
        .get_canonical::<Vec<RequestId>>(PENDING_RESOLVE_LIST_KEY)?
        .unwrap_or_default())
}

pub fn push_pending_resolve(state: &mut dyn StateAccess, id: RequestId) -> Result<(), StateError> {
    let mut pending = pending_resolve_list(state)?;
    pending.push(id);
    state.put_canonical(PENDING_RESOLVE_LIST_KEY, &pending)
}

pub fn clear_pending_resolve_list(state: &mut dyn StateAccess) -> Result<(), StateError> {
    state.delete(PENDING_RESOLVE_LIST_KEY)
}

/// The reward curve, starting at `initial_rate` if none has been persisted.
pub fn reward_curve(state: &dyn StateAccess, initial_rate: Dec) -> Result<RewardCurve, StateError> {
    Ok(state
        .get_canonical::<RewardCurve>(REWARD_CURVE_KEY)?
        .unwrap_or(RewardCurve {
            current_reward_per_byte: initial_rate,
            accumulated: Dec::ZERO,
        }))
}

pub fn set_reward_curve(state: &mut dyn StateAccess, curve: &RewardCurve) -> Result<(), StateError> {
    state.put_canonical(REWARD_CURVE_KEY, curve)
}

// --- Requests and reports ---

pub fn get_request(state: &dyn StateAccess, id: RequestId) -> Result<Option<Request>, StateError> {
    state.get_canonical(&request_key(id))
}

pub fn must_get_request(state: &dyn StateAccess, id: RequestId) -> Result<Request, TransactionError> {
    Ok(get_request(state, id)?.required(OracleError::RequestNotFound(id))?)
}

pub fn set_request(
    state: &mut dyn StateAccess,
    id: RequestId,
    request: &Request,
) -> Result<(), StateError> {
    state.put_canonical(&request_key(id), request)
}

pub fn delete_request(state: &mut dyn StateAccess, id: RequestId) -> Result<(), StateError> {
    state.delete(&request_key(id))
}

pub fn has_report(
    state: &dyn StateAccess,
    id: RequestId,
    validator: &AccountId,
) -> Result<bool, StateError> {
    Ok(state.get(&report_key(id, validator))?.is_some())
}

pub fn set_report(state: &mut dyn StateAccess, id: RequestId, report: &Report) -> Result<(), StateError> {
    state.put_canonical(&report_key(id, &report.validator), report)
}

/// All reports of a request, ordered by validator account.
pub fn get_reports(state: &dyn StateAccess, id: RequestId) -> Result<Vec<Report>, StateError> {
    state
        .prefix_scan(&reports_prefix(id))?
        .map(|item| {
            let (_, value) = item?;
            oracle_types::codec::from_bytes_canonical(&value).map_err(StateError::Decode)
        })
        .collect()
}

pub fn report_count(state: &dyn StateAccess, id: RequestId) -> Result<u64, StateError> {
    let mut count = 0u64;
    for item in state.prefix_scan(&reports_prefix(id))? {
        item?;
        count += 1;
    }
    Ok(count)
}

pub fn delete_reports(state: &mut dyn StateAccess, id: RequestId) -> Result<(), StateError> {
    let keys = state
        .prefix_scan(&reports_prefix(id))?
        .map(|item| item.map(|(key, _)| key.to_vec()))
        .collect::<Result<Vec<_>, _>>()?;
    for key in keys {
        state.delete(&key)?;
    }
    Ok(())
}

// --- Results ---

pub fn has_result(state: &dyn StateAccess, id: RequestId) -> Result<bool, StateError> {
    Ok(state.get(&result_key(id))?.is_some())
}

pub fn get_result(state: &dyn StateAccess, id: RequestId) -> Result<OracleResult, TransactionError> {
    state
        .get_canonical(&result_key(id))?
        .ok_or_else(|| OracleError::ResultNotFound(id).into())
}

/// Writes the result of a request. A result is never overwritten.
pub fn set_result(state: &mut dyn StateAccess, result: &OracleResult) -> Result<(), TransactionError> {
    if has_result(state, result.request_id)? {
        return Err(OracleError::ResultAlreadyExists(result.request_id).into());
    }
    state.put_canonical(&result_key(result.request_id), result)?;
    Ok(())
}

// --- Registry ---

pub fn get_data_source(state: &dyn StateAccess, id: DataSourceId) -> Result<DataSource, TransactionError> {
    Ok(state
        .get_canonical(&data_source_key(id))?
        .required(OracleError::DataSourceNotFound(id))?)
}

pub fn set_data_source(
    state: &mut dyn StateAccess,
    id: DataSourceId,
    data_source: &DataSource,
) -> Result<(), StateError> {
    state.put_canonical(&data_source_key(id), data_source)
}

pub fn get_oracle_script(
    state: &dyn StateAccess,
    id: OracleScriptId,
) -> Result<OracleScript, TransactionError> {
    Ok(state
        .get_canonical(&oracle_script_key(id))?
        .required(OracleError::OracleScriptNotFound(id))?)
}

pub fn set_oracle_script(
    state: &mut dyn StateAccess,
    id: OracleScriptId,
    script: &OracleScript,
) -> Result<(), StateError> {
    state.put_canonical(&oracle_script_key(id), script)
}

pub fn has_reporter_grant(
    state: &dyn StateAccess,
    validator: &AccountId,
    reporter: &AccountId,
) -> Result<bool, StateError> {
    Ok(state.get(&reporter_key(validator, reporter))?.is_some())
}

pub fn set_reporter_grant(
    state: &mut dyn StateAccess,
    validator: &AccountId,
    reporter: &AccountId,
) -> Result<(), StateError> {
    state.insert(&reporter_key(validator, reporter), REPORTER_MARKER)
}

pub fn delete_reporter_grant(
    state: &mut dyn StateAccess,
    validator: &AccountId,
    reporter: &AccountId,
) -> Result<(), StateError> {
    state.delete(&reporter_key(validator, reporter))
}

// --- Validators and rewards ---

pub fn validator_status(
    state: &dyn StateAccess,
    validator: &AccountId,
) -> Result<ValidatorStatus, StateError> {
    Ok(state
        .get_canonical(&validator_status_key(validator))?
        .unwrap_or_default())
}

pub fn set_validator_status(
    state: &mut dyn StateAccess,
    validator: &AccountId,
    status: &ValidatorStatus,
) -> Result<(), StateError> {
    state.put_canonical(&validator_status_key(validator), status)
}

pub fn provider_reward(state: &dyn StateAccess, owner: &AccountId) -> Result<Dec, StateError> {
    Ok(state
        .get_canonical(&provider_reward_key(owner))?
        .unwrap_or(Dec::ZERO))
}

/// Sets an owner's unpaid balance, removing the entry when it reaches zero.
pub fn set_provider_reward(
    state: &mut dyn StateAccess,
    owner: &AccountId,
    amount: Dec,
) -> Result<(), StateError> {
    let key = provider_reward_key(owner);
    if amount.is_zero() {
        state.delete(&key)
    } else {
        state.put_canonical(&key, &amount)
    }
}

/// Every owner with an unpaid balance, in account order.
pub fn provider_rewards(state: &dyn StateAccess) -> Result<Vec<(AccountId, Dec)>, StateError> {
    state
        .prefix_scan(&provider_rewards_prefix())?
        .map(|item| {
            let (key, value) = item?;
            let owner = key
                .get(1..)
                .and_then(|raw| <[u8; 32]>::try_from(raw).ok())
                .map(AccountId)
                .ok_or_else(|| StateError::Decode("malformed provider reward key".into()))?;
            let amount =
                oracle_types::codec::from_bytes_canonical(&value).map_err(StateError::Decode)?;
            Ok((owner, amount))
        })
        .collect()
}
