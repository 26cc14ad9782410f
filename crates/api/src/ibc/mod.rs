// Path: crates/api/src/ibc/mod.rs
//! Defines the `PacketRelay` trait for sending oracle responses to counterparty chains.

use oracle_types::ibc::{IbcChannel, OracleResponsePacket};

/// Hands outgoing response packets to the cross-chain transport.
pub trait PacketRelay: Send + Sync {
    /// Queues `packet` for delivery on `channel`.
    ///
    /// An error means a response promised to the counterparty cannot be delivered.
    fn send_response(
        &self,
        channel: &IbcChannel,
        packet: OracleResponsePacket,
    ) -> Result<(), String>;
}
