// Path: crates/api/src/transaction/context.rs
//! Defines the stable context for transaction execution.

use crate::transaction::gas::GasMeter;
use oracle_types::app::{AccountId, ChainId, OracleEvent};

/// Provides context to services during execution and collects what they emit.
#[derive(Clone, Debug)]
pub struct TxContext {
    /// The current block height being processed.
    pub block_height: u64,
    /// The deterministic timestamp of the current block, taken from its header,
    /// in nanoseconds since the Unix epoch.
    pub block_timestamp: u64,
    /// The unique identifier of the chain, mixed into sampling entropy.
    pub chain_id: ChainId,
    /// The `AccountId` of the entity that signed the current transaction.
    /// This is the authoritative source for permission checks within services.
    pub signer_account_id: AccountId,
    /// The gas meter of the current transaction.
    pub gas: GasMeter,
    /// Events emitted so far, in emission order.
    pub events: Vec<OracleEvent>,
}

impl TxContext {
    /// A context for a user transaction with the given gas limit.
    pub fn new(
        block_height: u64,
        block_timestamp: u64,
        chain_id: ChainId,
        signer_account_id: AccountId,
        gas_limit: u64,
    ) -> Self {
        Self {
            block_height,
            block_timestamp,
            chain_id,
            signer_account_id,
            gas: GasMeter::new(gas_limit),
            events: Vec::new(),
        }
    }

    /// A context for block-boundary processing, with unmetered gas.
    pub fn internal(block_height: u64, block_timestamp: u64, chain_id: ChainId) -> Self {
        Self {
            gas: GasMeter::unlimited(),
            ..Self::new(
                block_height,
                block_timestamp,
                chain_id,
                AccountId::default(),
                u64::MAX,
            )
        }
    }

    /// Records an event.
    pub fn emit(&mut self, event: OracleEvent) {
        self.events.push(event);
    }
}
