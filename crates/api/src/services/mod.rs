// Path: crates/api/src/services/mod.rs
//! Traits for pluggable blockchain services.

use crate::lifecycle::OnEndBlock;
use crate::transaction::context::TxContext;
use async_trait::async_trait;
use oracle_types::error::TransactionError;
use oracle_types::service_configs::Capabilities;
use std::any::Any;

/// The base trait for any service managed by the chain.
///
/// # Atomicity
///
/// A call that returns an error must leave `state` and `ctx.events` as they were
/// before the call. Implementations typically run the method against a
/// `StateOverlay` and commit its batch only on success.
#[async_trait]
pub trait BlockchainService: Any + Send + Sync {
    /// A unique, static, lowercase string identifier for the service.
    fn id(&self) -> &str;

    /// The version of the ABI the service expects from the host.
    fn abi_version(&self) -> u32;

    /// A string identifying the schema of the state this service reads/writes.
    fn state_schema(&self) -> &str;

    /// Returns a bitmask of the lifecycle capabilities (hooks) this service implements.
    fn capabilities(&self) -> Capabilities;

    /// Provides access to the concrete type for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Handles a dispatched call. `method` is a versioned name such as
    /// `"request_data@v1"` and `params` its canonically encoded argument.
    ///
    /// # Default Implementation
    /// The default implementation returns an `Unsupported` error. Services must override
    /// this method to expose callable functions.
    async fn handle_service_call(
        &self,
        state: &mut dyn crate::state::StateAccess,
        method: &str,
        params: &[u8],
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        // Mark parameters as used to satisfy the compiler under the default implementation.
        let _ = (state, params, ctx);
        Err(TransactionError::Unsupported(format!(
            "Service '{}' does not implement the method '{}'",
            self.id(),
            method
        )))
    }

    /// Attempts to downcast this service to an `OnEndBlock` trait object.
    fn as_on_end_block(&self) -> Option<&dyn OnEndBlock> {
        None
    }
}
