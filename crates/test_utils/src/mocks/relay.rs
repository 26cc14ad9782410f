//! A `PacketRelay` that records what it is asked to send.

use oracle_api::ibc::PacketRelay;
use oracle_types::ibc::{IbcChannel, OracleResponsePacket};
use std::sync::{Mutex, PoisonError};

/// Records response packets, or rejects them all when built with `failing`.
#[derive(Debug, Default)]
pub struct RecordingRelay {
    sent: Mutex<Vec<(IbcChannel, OracleResponsePacket)>>,
    fail: bool,
}

impl RecordingRelay {
    /// A relay that accepts every packet
    pub fn new() -> Self {
        Self::default()
    }

    /// A relay that rejects every packet
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    /// The packets accepted so far, in order
    pub fn sent(&self) -> Vec<(IbcChannel, OracleResponsePacket)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PacketRelay for RecordingRelay {
    fn send_response(
        &self,
        channel: &IbcChannel,
        packet: OracleResponsePacket,
    ) -> Result<(), String> {
        if self.fail {
            return Err(format!("channel {} is closed", channel));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((channel.clone(), packet));
        Ok(())
    }
}
