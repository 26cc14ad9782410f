// Path: crates/types/src/app/events.rs

use crate::app::{AccountId, Coins, DataSourceId, ExternalId, OracleScriptId, RequestId, ResolveStatus};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Observable state changes emitted by the oracle service for external indexers.
///
/// Events are collected in the transaction context and discarded together with the
/// state changes of a call that fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum OracleEvent {
    /// A request was admitted.
    RequestCreated {
        /// The new request id.
        request_id: RequestId,
        /// The oracle script of the request.
        oracle_script_id: OracleScriptId,
        /// The request calldata.
        calldata: Vec<u8>,
        /// The number of validators assigned.
        ask_count: u64,
        /// The quorum of the request.
        min_count: u64,
        /// The executor gas used by the prepare phase, in transaction gas units.
        gas_used: u64,
        /// The total fee collected from the payer.
        total_fees: Coins,
        /// The assigned validators in sampling order.
        validators: Vec<AccountId>,
        /// The requester's client id.
        client_id: String,
    },

    /// A raw request was attached to an admitted request.
    RawRequestCreated {
        /// The parent request.
        request_id: RequestId,
        /// The data source queried.
        data_source_id: DataSourceId,
        /// The content digest of the data source executable.
        data_source_hash: [u8; 32],
        /// The external id of the raw request.
        external_id: ExternalId,
        /// The raw request calldata.
        calldata: Vec<u8>,
        /// The data source fee per assigned validator.
        fee: Coins,
    },

    /// A validator submitted a report.
    ReportReceived {
        /// The request reported on.
        request_id: RequestId,
        /// The reporting validator.
        validator: AccountId,
    },

    /// A request reached a terminal state.
    Resolved {
        /// The resolved request.
        request_id: RequestId,
        /// `Success`, `Failure` or `Expired`.
        status: ResolveStatus,
        /// The return data of a successful execution.
        result: Vec<u8>,
        /// The gas used by the execute phase, in transaction gas units.
        gas_used: u64,
        /// The failure reason, if any.
        reason: Option<String>,
    },

    /// A validator became active.
    ValidatorActivated {
        /// The activated validator.
        validator: AccountId,
    },

    /// A validator was deactivated for missing a report.
    ValidatorDeactivated {
        /// The deactivated validator.
        validator: AccountId,
    },

    /// A data source was registered.
    DataSourceCreated {
        /// The new data source id.
        id: DataSourceId,
    },

    /// A data source was edited.
    DataSourceEdited {
        /// The edited data source id.
        id: DataSourceId,
    },

    /// An oracle script was registered.
    OracleScriptCreated {
        /// The new oracle script id.
        id: OracleScriptId,
    },

    /// An oracle script was edited.
    OracleScriptEdited {
        /// The edited oracle script id.
        id: OracleScriptId,
    },

    /// A validator granted reporting rights to an account.
    ReporterAdded {
        /// The granting validator.
        validator: AccountId,
        /// The new reporter.
        reporter: AccountId,
    },

    /// A validator revoked reporting rights from an account.
    ReporterRemoved {
        /// The revoking validator.
        validator: AccountId,
        /// The removed reporter.
        reporter: AccountId,
    },

    /// Accrued data-provider rewards were paid out.
    ProviderRewardPaid {
        /// The data source owner paid.
        owner: AccountId,
        /// The amount paid.
        amount: Coins,
    },
}
