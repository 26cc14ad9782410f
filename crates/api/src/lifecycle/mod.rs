// Path: crates/api/src/lifecycle/mod.rs
//! Defines traits for services that hook into the block processing lifecycle.

use crate::services::BlockchainService;
use crate::state::StateAccess;
use crate::transaction::context::TxContext;
use async_trait::async_trait;
use oracle_types::error::FatalError;

/// A trait for services that need to perform actions at the end of a block.
#[async_trait]
pub trait OnEndBlock: BlockchainService {
    /// Called after all transactions in a block have been processed.
    ///
    /// An error is unrecoverable: the host must halt block processing.
    async fn on_end_block(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext,
    ) -> Result<(), FatalError>;
}
