// Path: crates/types/src/keys/mod.rs
//! Defines constants and builders for the state keys owned by the oracle engine.
//!
//! Single-value entries live under the `0x00` global prefix. Records are keyed by a
//! one-byte prefix followed by big-endian ids, so a prefix scan visits records in
//! ascending id order.

use crate::app::{AccountId, DataSourceId, OracleScriptId, RequestId};

/// Prefix byte for single-value global entries.
pub const GLOBAL_STORE_PREFIX: u8 = 0x00;
/// Prefix byte for requests, keyed by request id.
pub const REQUEST_PREFIX: u8 = 0x01;
/// Prefix byte for reports, keyed by request id then validator.
pub const REPORT_PREFIX: u8 = 0x02;
/// Prefix byte for data sources, keyed by id.
pub const DATA_SOURCE_PREFIX: u8 = 0x03;
/// Prefix byte for oracle scripts, keyed by id.
pub const ORACLE_SCRIPT_PREFIX: u8 = 0x04;
/// Prefix byte for reporter grants, keyed by validator then reporter.
pub const REPORTER_PREFIX: u8 = 0x05;
/// Prefix byte for validator statuses, keyed by validator.
pub const VALIDATOR_STATUS_PREFIX: u8 = 0x06;
/// Prefix byte for accrued, unpaid data-provider rewards, keyed by owner.
pub const PROVIDER_REWARD_PREFIX: u8 = 0x07;
/// Prefix byte for results, keyed by request id.
pub const RESULT_PREFIX: u8 = 0xff;

/// The state key for the 32-byte rolling seed.
pub const ROLLING_SEED_KEY: &[u8] = b"\x00RollingSeed";
/// The state key for the number of requests ever admitted.
pub const REQUEST_COUNT_KEY: &[u8] = b"\x00RequestCount";
/// The state key for the id of the last request removed by the expiration sweep.
pub const REQUEST_LAST_EXPIRED_KEY: &[u8] = b"\x00RequestLastExpired";
/// The state key for the ids awaiting resolution at the end of the current block.
pub const PENDING_RESOLVE_LIST_KEY: &[u8] = b"\x00PendingList";
/// The state key for the number of registered data sources.
pub const DATA_SOURCE_COUNT_KEY: &[u8] = b"\x00DataSourceCount";
/// The state key for the number of registered oracle scripts.
pub const ORACLE_SCRIPT_COUNT_KEY: &[u8] = b"\x00OracleScriptCount";
/// The state key for the global data-provider reward curve.
pub const REWARD_CURVE_KEY: &[u8] = b"\x00RewardCurve";

fn id_key(prefix: u8, id: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(9);
    key.push(prefix);
    key.extend_from_slice(&id.to_be_bytes());
    key
}

fn account_key(prefix: u8, account: &AccountId) -> Vec<u8> {
    let mut key = Vec::with_capacity(33);
    key.push(prefix);
    key.extend_from_slice(account.as_ref());
    key
}

/// `0x01 ‖ id`
pub fn request_key(id: RequestId) -> Vec<u8> {
    id_key(REQUEST_PREFIX, id)
}

/// `0x02 ‖ id`, the prefix of every report for a request.
pub fn reports_prefix(id: RequestId) -> Vec<u8> {
    id_key(REPORT_PREFIX, id)
}

/// `0x02 ‖ id ‖ validator`
pub fn report_key(id: RequestId, validator: &AccountId) -> Vec<u8> {
    let mut key = reports_prefix(id);
    key.extend_from_slice(validator.as_ref());
    key
}

/// `0x03 ‖ id`
pub fn data_source_key(id: DataSourceId) -> Vec<u8> {
    id_key(DATA_SOURCE_PREFIX, id)
}

/// `0x04 ‖ id`
pub fn oracle_script_key(id: OracleScriptId) -> Vec<u8> {
    id_key(ORACLE_SCRIPT_PREFIX, id)
}

/// `0x05 ‖ validator ‖ reporter`
pub fn reporter_key(validator: &AccountId, reporter: &AccountId) -> Vec<u8> {
    let mut key = account_key(REPORTER_PREFIX, validator);
    key.extend_from_slice(reporter.as_ref());
    key
}

/// `0x06 ‖ validator`
pub fn validator_status_key(validator: &AccountId) -> Vec<u8> {
    account_key(VALIDATOR_STATUS_PREFIX, validator)
}

/// `0x07 ‖ owner`
pub fn provider_reward_key(owner: &AccountId) -> Vec<u8> {
    account_key(PROVIDER_REWARD_PREFIX, owner)
}

/// The prefix of every accrued provider reward entry.
pub fn provider_rewards_prefix() -> Vec<u8> {
    vec![PROVIDER_REWARD_PREFIX]
}

/// `0xff ‖ id`
pub fn result_key(id: RequestId) -> Vec<u8> {
    id_key(RESULT_PREFIX, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_keys_sort_by_numeric_id() {
        assert!(request_key(2) < request_key(10));
        assert!(request_key(255) < request_key(256));
        assert_eq!(result_key(1), vec![0xff, 0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn report_keys_share_the_request_prefix() {
        let v = AccountId([9; 32]);
        let key = report_key(7, &v);
        assert!(key.starts_with(&reports_prefix(7)));
        assert!(!key.starts_with(&reports_prefix(8)));
        assert_eq!(key.len(), 41);
    }

    #[test]
    fn global_keys_live_under_zero_prefix() {
        for key in [
            ROLLING_SEED_KEY,
            REQUEST_COUNT_KEY,
            REQUEST_LAST_EXPIRED_KEY,
            PENDING_RESOLVE_LIST_KEY,
            DATA_SOURCE_COUNT_KEY,
            ORACLE_SCRIPT_COUNT_KEY,
            REWARD_CURVE_KEY,
        ] {
            assert_eq!(key.first(), Some(&GLOBAL_STORE_PREFIX));
        }
    }
}
