// Path: crates/types/src/app/oracle.rs

//! Canonical records of the request lifecycle: requests, reports, results, and the
//! registry entries they reference.
//!
//! Times are block timestamps in nanoseconds since the Unix epoch. Ids are assigned
//! sequentially starting at 1.

use crate::app::{AccountId, Coins, Dec};
use crate::ibc::IbcChannel;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Identifier of a data request.
pub type RequestId = u64;
/// Identifier of a data source.
pub type DataSourceId = u64;
/// Identifier of an oracle script.
pub type OracleScriptId = u64;
/// Identifier correlating a raw request with its raw reports, unique within a request.
pub type ExternalId = u64;

/// The sentinel an edit uses to keep the existing value of a field.
pub const DO_NOT_MODIFY: &str = "[do-not-modify]";

/// Returns `new` unless it is the do-not-modify sentinel, in which case `old` is kept.
pub fn modify(old: String, new: String) -> String {
    if new == DO_NOT_MODIFY {
        old
    } else {
        new
    }
}

/// A sub-request to a single data source, produced by an oracle script's prepare phase.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RawRequest {
    /// Correlates this raw request with the raw reports answering it.
    pub external_id: ExternalId,
    /// The data source to query.
    pub data_source_id: DataSourceId,
    /// Arguments passed to the data source executable.
    pub calldata: Vec<u8>,
}

/// An admitted data request awaiting reports.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Request {
    /// The oracle script that prepares and aggregates this request.
    pub oracle_script_id: OracleScriptId,
    /// Arguments passed to the oracle script.
    pub calldata: Vec<u8>,
    /// The validators assigned to report, in sampling order. Pairwise distinct.
    pub requested_validators: Vec<AccountId>,
    /// The number of reports needed before the request resolves.
    pub min_count: u64,
    /// The block height at which the request was admitted.
    pub request_height: u64,
    /// The block time at which the request was admitted.
    pub request_time: u64,
    /// An opaque identifier supplied by the requester.
    pub client_id: String,
    /// The raw requests produced by the prepare phase.
    pub raw_requests: Vec<RawRequest>,
    /// The gas budget for the execute phase.
    pub execute_gas: u64,
    /// The channel the request arrived on, if it came from another chain.
    pub ibc_channel: Option<IbcChannel>,
}

impl Request {
    /// The number of validators assigned to the request.
    pub fn ask_count(&self) -> u64 {
        self.requested_validators.len() as u64
    }

    /// The position of `validator` within the requested validators.
    pub fn validator_index(&self, validator: &AccountId) -> Option<usize> {
        self.requested_validators.iter().position(|v| v == validator)
    }

    /// Looks up a raw request by its external id.
    pub fn raw_request(&self, external_id: ExternalId) -> Option<&RawRequest> {
        self.raw_requests
            .iter()
            .find(|r| r.external_id == external_id)
    }
}

/// A validator's answer to a single raw request.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RawReport {
    /// The raw request being answered.
    pub external_id: ExternalId,
    /// The exit code of the data source executable. Zero means success.
    pub exit_code: u32,
    /// The output of the data source executable.
    pub data: Vec<u8>,
}

/// A validator's complete report for a request.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Report {
    /// The reporting validator.
    pub validator: AccountId,
    /// True if the report arrived before the request was resolved.
    pub in_before_resolve: bool,
    /// One raw report per raw request of the request.
    pub raw_reports: Vec<RawReport>,
}

/// The resolution state of a request.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolveStatus {
    /// No result has been written yet.
    Open,
    /// The execute phase produced return data.
    Success,
    /// The execute phase failed or produced no return data.
    Failure,
    /// The request expired before reaching quorum.
    Expired,
}

impl ResolveStatus {
    /// A short lowercase label, used for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveStatus::Open => "open",
            ResolveStatus::Success => "success",
            ResolveStatus::Failure => "failure",
            ResolveStatus::Expired => "expired",
        }
    }
}

/// The final, immutable outcome of a request.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OracleResult {
    /// The resolved request.
    pub request_id: RequestId,
    /// The requester's client id.
    pub client_id: String,
    /// The oracle script of the request.
    pub oracle_script_id: OracleScriptId,
    /// The calldata of the request.
    pub calldata: Vec<u8>,
    /// The number of validators assigned.
    pub ask_count: u64,
    /// The quorum of the request.
    pub min_count: u64,
    /// The number of reports received at resolution time.
    pub ans_count: u64,
    /// The block time of admission.
    pub request_time: u64,
    /// The block time of resolution.
    pub resolve_time: u64,
    /// How the request resolved.
    pub resolve_status: ResolveStatus,
    /// The return data of a successful execution, otherwise empty.
    pub result: Vec<u8>,
}

/// A registered data source.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DataSource {
    /// The account allowed to edit the data source and receive provider rewards.
    pub owner: AccountId,
    /// A human-readable name.
    pub name: String,
    /// A human-readable description.
    pub description: String,
    /// The content digest of the executable in the blob cache.
    pub filename: [u8; 32],
    /// The fee charged per assigned validator for each raw request to this source.
    pub fee: Coins,
}

/// A registered oracle script.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OracleScript {
    /// The account allowed to edit the script.
    pub owner: AccountId,
    /// A human-readable name.
    pub name: String,
    /// A human-readable description.
    pub description: String,
    /// The content digest of the compiled code in the blob cache.
    pub filename: [u8; 32],
    /// A description of the calldata and result encoding.
    pub schema: String,
    /// Where the script's source code can be found.
    pub source_code_url: String,
}

/// Whether a validator currently takes part in sampling.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValidatorStatus {
    /// True if the validator may be sampled.
    pub is_active: bool,
    /// The block time of the last status change.
    pub since: u64,
}

/// A bonded validator and its voting power.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidatorPower {
    /// The validator's account.
    pub account: AccountId,
    /// The validator's voting power.
    pub power: u64,
}

/// The shared, decreasing data-provider reward rate.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewardCurve {
    /// The reward paid per byte of reported data.
    pub current_reward_per_byte: Dec,
    /// Rewards accrued since the last payout sweep.
    pub accumulated: Dec,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modify_keeps_old_value_on_sentinel() {
        assert_eq!(modify("old".into(), DO_NOT_MODIFY.into()), "old");
        assert_eq!(modify("old".into(), "new".into()), "new");
    }

    #[test]
    fn request_lookups() {
        let v1 = AccountId([1; 32]);
        let v2 = AccountId([2; 32]);
        let req = Request {
            oracle_script_id: 1,
            calldata: vec![],
            requested_validators: vec![v1, v2],
            min_count: 1,
            request_height: 10,
            request_time: 0,
            client_id: String::new(),
            raw_requests: vec![RawRequest {
                external_id: 7,
                data_source_id: 3,
                calldata: vec![],
            }],
            execute_gas: 1,
            ibc_channel: None,
        };
        assert_eq!(req.ask_count(), 2);
        assert_eq!(req.validator_index(&v2), Some(1));
        assert_eq!(req.raw_request(7).map(|r| r.data_source_id), Some(3));
        assert!(req.raw_request(8).is_none());
    }
}
