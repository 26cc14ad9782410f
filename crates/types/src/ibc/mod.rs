// Path: crates/types/src/ibc/mod.rs
//! Packet structures for oracle requests arriving from, and responses returned to,
//! counterparty chains.

use crate::app::{Coins, OracleScriptId, RequestId, ResolveStatus};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The port and channel a cross-chain request arrived on.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, Encode, Decode)]
pub struct IbcChannel {
    /// The local port identifier, e.g. `"oracle"`.
    pub port_id: String,
    /// The local channel identifier, e.g. `"channel-0"`.
    pub channel_id: String,
}

impl IbcChannel {
    /// Creates a channel reference from its port and channel identifiers.
    pub fn new(port_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            port_id: port_id.into(),
            channel_id: channel_id.into(),
        }
    }
}

impl fmt::Display for IbcChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port_id, self.channel_id)
    }
}

/// An oracle request received from a counterparty chain.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct OracleRequestPacket {
    /// An opaque identifier chosen by the counterparty.
    pub client_id: String,
    /// The oracle script to run.
    pub oracle_script_id: OracleScriptId,
    /// Arguments for the oracle script.
    pub calldata: Vec<u8>,
    /// The number of validators to assign.
    pub ask_count: u64,
    /// The quorum needed to resolve.
    pub min_count: u64,
    /// The maximum total fee the relayer agrees to pay.
    pub fee_limit: Coins,
    /// The gas budget of the prepare phase.
    pub prepare_gas: u64,
    /// The gas budget of the execute phase.
    pub execute_gas: u64,
}

/// The outcome of a cross-chain request, sent back on the originating channel.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct OracleResponsePacket {
    /// The client id of the originating request.
    pub client_id: String,
    /// The id assigned to the request on this chain.
    pub request_id: RequestId,
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
