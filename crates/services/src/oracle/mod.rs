// Path: crates/services/src/oracle/mod.rs

//! The oracle data-request service.
//!
//! A request runs through three phases. On admission the sampler assigns validators,
//! the oracle script's prepare phase lists the raw requests and the fees for their
//! data sources are collected. Assigned validators then submit reports until quorum
//! is reached. At the end of that block the script's execute phase aggregates the
//! reports into the final result. Requests that never reach quorum are expired by a
//! per-block sweep that also deactivates the validators that failed to report.

pub mod expiration;
pub mod fees;
pub mod lifecycle;
pub mod registry;
pub mod rewards;
pub mod sampler;
pub mod store;
pub mod validator_status;

use async_trait::async_trait;
use oracle_api::bank::Bank;
use oracle_api::ibc::PacketRelay;
use oracle_api::lifecycle::OnEndBlock;
use oracle_api::services::BlockchainService;
use oracle_api::state::{StateAccess, StateOverlay};
use oracle_api::storage::BlobCache;
use oracle_api::transaction::context::TxContext;
use oracle_api::validator::ValidatorSetView;
use oracle_api::vm::Executor;
use oracle_telemetry::time::Timer;
use oracle_telemetry::{error_metrics, oracle_metrics};
use oracle_types::app::{
    module_account, AccountId, Coins, DataSourceId, OracleScriptId, RawReport, RequestId,
};
use oracle_types::codec;
use oracle_types::error::{ErrorCode, FatalError, OracleError, StateError, TransactionError};
use oracle_types::ibc::{IbcChannel, OracleRequestPacket};
use oracle_types::service_configs::{Capabilities, OracleParams};
use parity_scale_codec::{Decode, Encode};
use std::any::Any;
use std::sync::Arc;

/// The module account that holds collected data-source fees and pays provider rewards.
pub fn data_provider_pool() -> AccountId {
    module_account("oracle::data_provider_pool")
}

// --- Method parameters ---

#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct RequestDataParams {
    pub oracle_script_id: OracleScriptId,
    pub calldata: Vec<u8>,
    pub ask_count: u64,
    pub min_count: u64,
    pub client_id: String,
    pub fee_limit: Coins,
    pub prepare_gas: u64,
    pub execute_gas: u64,
}

impl From<OracleRequestPacket> for RequestDataParams {
    fn from(packet: OracleRequestPacket) -> Self {
        Self {
            oracle_script_id: packet.oracle_script_id,
            calldata: packet.calldata,
            ask_count: packet.ask_count,
            min_count: packet.min_count,
            client_id: packet.client_id,
            fee_limit: packet.fee_limit,
            prepare_gas: packet.prepare_gas,
            execute_gas: packet.execute_gas,
        }
    }
}

#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct ReportDataParams {
    pub request_id: RequestId,
    pub validator: AccountId,
    pub raw_reports: Vec<RawReport>,
}

#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct CreateDataSourceParams {
    pub owner: AccountId,
    pub name: String,
    pub description: String,
    pub executable: Vec<u8>,
    pub fee: Coins,
}

/// Edits a data source. String fields and the executable accept the
/// `"[do-not-modify]"` sentinel to keep their current value.
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct EditDataSourceParams {
    pub data_source_id: DataSourceId,
    pub owner: AccountId,
    pub name: String,
    pub description: String,
    pub executable: Vec<u8>,
    pub fee: Coins,
}

#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct CreateOracleScriptParams {
    pub owner: AccountId,
    pub name: String,
    pub description: String,
    pub schema: String,
    pub source_code_url: String,
    pub code: Vec<u8>,
}

/// Edits an oracle script. String fields and the code accept the
/// `"[do-not-modify]"` sentinel to keep their current value.
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct EditOracleScriptParams {
    pub oracle_script_id: OracleScriptId,
    pub owner: AccountId,
    pub name: String,
    pub description: String,
    pub schema: String,
    pub source_code_url: String,
    pub code: Vec<u8>,
}

#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct ReporterParams {
    pub reporter: AccountId,
}

#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct ChannelRequestParams {
    pub packet: OracleRequestPacket,
    pub channel: IbcChannel,
}

// --- Service ---

/// The oracle service and the collaborators it is driven by.
pub struct OracleService {
    params: OracleParams,
    executor: Arc<dyn Executor>,
    bank: Arc<dyn Bank>,
    validators: Arc<dyn ValidatorSetView>,
    blobs: Arc<dyn BlobCache>,
    relay: Arc<dyn PacketRelay>,
}

impl OracleService {
    /// Builds the service, refusing parameters that would leave requests unresolvable.
    pub fn new(
        params: OracleParams,
        executor: Arc<dyn Executor>,
        bank: Arc<dyn Bank>,
        validators: Arc<dyn ValidatorSetView>,
        blobs: Arc<dyn BlobCache>,
        relay: Arc<dyn PacketRelay>,
    ) -> Result<Self, FatalError> {
        params.validate().map_err(|e| {
            log::error!("[Oracle] Refusing invalid params: {}", e);
            FatalError::InvalidConfig(e)
        })?;
        Ok(Self {
            params,
            executor,
            bank,
            validators,
            blobs,
            relay,
        })
    }

    pub fn params(&self) -> &OracleParams {
        &self.params
    }

    /// Advances the rolling seed with the first byte of the new block's hash.
    pub fn roll_seed(
        &self,
        state: &mut dyn StateAccess,
        block_hash: &[u8; 32],
    ) -> Result<(), StateError> {
        let mut seed = store::rolling_seed(state)?;
        seed.rotate_left(1);
        if let (Some(last), Some(first)) = (seed.last_mut(), block_hash.first()) {
            *last = *first;
        }
        log::trace!("[Oracle] Rolled seed with block {}", hex::encode(block_hash));
        store::set_rolling_seed(state, &seed)
    }

    /// Runs `f` against a copy-on-write view of `state`.
    ///
    /// On success the writes are applied to `state` in one batch. On failure they are
    /// discarded together with every event emitted since the call began.
    fn atomically<T, F>(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext,
        f: F,
    ) -> Result<T, TransactionError>
    where
        F: FnOnce(&mut dyn StateAccess, &mut TxContext) -> Result<T, TransactionError>,
    {
        let mark = ctx.events.len();
        let mut overlay = StateOverlay::new(&*state);
        match f(&mut overlay, ctx) {
            Ok(value) => {
                let (inserts, deletes) = overlay.into_ordered_batch();
                state.batch_apply(&inserts, &deletes)?;
                Ok(value)
            }
            Err(e) => {
                ctx.events.truncate(mark);
                Err(e)
            }
        }
    }

    // --- Typed entry points ---

    /// Admits a data request paid for by the signer.
    pub fn request_data(
        &self,
        state: &mut dyn StateAccess,
        params: RequestDataParams,
        ctx: &mut TxContext,
    ) -> Result<RequestId, TransactionError> {
        lifecycle::validate_request(&params)?;
        let payer = ctx.signer_account_id;
        self.atomically(state, ctx, |state, ctx| {
            self.prepare_request(state, params, payer, None, ctx)
        })
    }

    /// Admits a data request received on a cross-chain channel. The relayer pays.
    pub fn request_from_channel(
        &self,
        state: &mut dyn StateAccess,
        params: ChannelRequestParams,
        ctx: &mut TxContext,
    ) -> Result<RequestId, TransactionError> {
        if !self.params.ibc_request_enabled {
            return Err(OracleError::IbcRequestDisabled.into());
        }
        let request = RequestDataParams::from(params.packet);
        lifecycle::validate_request(&request)?;
        let payer = ctx.signer_account_id;
        let channel = params.channel;
        self.atomically(state, ctx, |state, ctx| {
            self.prepare_request(state, request, payer, Some(channel), ctx)
        })
    }

    /// Submits a report on behalf of a validator. The signer must be the validator or
    /// one of its reporters.
    pub fn report_data(
        &self,
        state: &mut dyn StateAccess,
        params: ReportDataParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        lifecycle::validate_report(&params)?;
        let reporter = ctx.signer_account_id;
        self.atomically(state, ctx, |state, ctx| {
            if !registry::is_reporter(state, &params.validator, &reporter)? {
                return Err(OracleError::ReporterNotAuthorized.into());
            }
            self.add_report(
                state,
                params.request_id,
                params.validator,
                params.raw_reports,
                ctx,
            )
        })
    }

    pub fn create_data_source(
        &self,
        state: &mut dyn StateAccess,
        params: CreateDataSourceParams,
        ctx: &mut TxContext,
    ) -> Result<DataSourceId, TransactionError> {
        registry::validate_create_data_source(&params)?;
        self.atomically(state, ctx, |state, ctx| {
            self.add_data_source(state, params, ctx)
        })
    }

    pub fn edit_data_source(
        &self,
        state: &mut dyn StateAccess,
        params: EditDataSourceParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        registry::validate_edit_data_source(&params)?;
        self.atomically(state, ctx, |state, ctx| {
            self.update_data_source(state, params, ctx)
        })
    }

    pub fn create_oracle_script(
        &self,
        state: &mut dyn StateAccess,
        params: CreateOracleScriptParams,
        ctx: &mut TxContext,
    ) -> Result<OracleScriptId, TransactionError> {
        registry::validate_create_oracle_script(&params)?;
        self.atomically(state, ctx, |state, ctx| {
            self.add_oracle_script(state, params, ctx)
        })
    }

    pub fn edit_oracle_script(
        &self,
        state: &mut dyn StateAccess,
        params: EditOracleScriptParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        registry::validate_edit_oracle_script(&params)?;
        self.atomically(state, ctx, |state, ctx| {
            self.update_oracle_script(state, params, ctx)
        })
    }

    /// Reactivates the signer as an oracle validator.
    pub fn activate(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let validator = ctx.signer_account_id;
        let now = ctx.block_timestamp;
        self.atomically(state, ctx, |state, ctx| {
            validator_status::activate(state, &self.params, &validator, now, ctx)
        })
    }

    /// Grants `reporter` the right to report for the signer.
    pub fn add_reporter(
        &self,
        state: &mut dyn StateAccess,
        params: ReporterParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let validator = ctx.signer_account_id;
        self.atomically(state, ctx, |state, ctx| {
            registry::add_reporter(state, &validator, &params.reporter, ctx)
        })
    }

    /// Revokes a reporter grant of the signer.
    pub fn remove_reporter(
        &self,
        state: &mut dyn StateAccess,
        params: ReporterParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let validator = ctx.signer_account_id;
        self.atomically(state, ctx, |state, ctx| {
            registry::remove_reporter(state, &validator, &params.reporter, ctx)
        })
    }

    fn dispatch(
        &self,
        state: &mut dyn StateAccess,
        method: &str,
        params: &[u8],
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        match method {
            "request_data@v1" => {
                let p: RequestDataParams = decode(params)?;
                self.request_data(state, p, ctx).map(|_| ())
            }
            "report_data@v1" => self.report_data(state, decode(params)?, ctx),
            "create_data_source@v1" => {
                self.create_data_source(state, decode(params)?, ctx).map(|_| ())
            }
            "edit_data_source@v1" => self.edit_data_source(state, decode(params)?, ctx),
            "create_oracle_script@v1" => {
                self.create_oracle_script(state, decode(params)?, ctx).map(|_| ())
            }
            "edit_oracle_script@v1" => self.edit_oracle_script(state, decode(params)?, ctx),
            "activate@v1" => {
                let () = decode(params)?;
                self.activate(state, ctx)
            }
            "add_reporter@v1" => self.add_reporter(state, decode(params)?, ctx),
            "remove_reporter@v1" => self.remove_reporter(state, decode(params)?, ctx),
            "request_from_channel@v1" => {
                self.request_from_channel(state, decode(params)?, ctx).map(|_| ())
            }
            _ => Err(TransactionError::Unsupported(format!(
                "Oracle service does not support method '{}'",
                method
            ))),
        }
    }
}

fn decode<T: Decode>(params: &[u8]) -> Result<T, TransactionError> {
    codec::from_bytes_canonical(params).map_err(TransactionError::Deserialization)
}

#[async_trait]
impl BlockchainService for OracleService {
    fn id(&self) -> &str {
        "oracle"
    }

    fn abi_version(&self) -> u32 {
        1
    }

    fn state_schema(&self) -> &str {
        "v1"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ON_END_BLOCK
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn handle_service_call(
        &self,
        state: &mut dyn StateAccess,
        method: &str,
        params: &[u8],
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let metrics = oracle_metrics();
        let _timer = Timer::new(metrics, method);
        let result = self.dispatch(state, method, params, ctx);
        if let Err(e) = &result {
            tracing::debug!(target: "oracle", method, error = %e, "Oracle call rejected");
            metrics.inc_dispatch_error(method, e.code());
            error_metrics().inc_error("oracle", e.code());
        }
        result
    }

    fn as_on_end_block(&self) -> Option<&dyn OnEndBlock> {
        Some(self)
    }
}

#[async_trait]
impl OnEndBlock for OracleService {
    /// Resolves the requests that reached quorum in this block, expires stale requests
    /// and, when due, pays out accrued provider rewards.
    ///
    /// Any error is fatal and the block's oracle writes are discarded.
    async fn on_end_block(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext,
    ) -> Result<(), FatalError> {
        let mark = ctx.events.len();
        let mut overlay = StateOverlay::new(&*state);
        match self.end_block(&mut overlay, ctx) {
            Ok(()) => {
                let (inserts, deletes) = overlay.into_ordered_batch();
                state.batch_apply(&inserts, &deletes)?;
                Ok(())
            }
            Err(e) => {
                tracing::error!(target: "oracle", error = %e, height = ctx.block_height, "End block failed");
                error_metrics().inc_error("oracle", e.code());
                ctx.events.truncate(mark);
                Err(e)
            }
        }
    }
}

impl OracleService {
    fn end_block(&self, state: &mut dyn StateAccess, ctx: &mut TxContext) -> Result<(), FatalError> {
        let pending = store::pending_resolve_list(state)?;
        for id in &pending {
            self.resolve_request(state, *id, ctx)?;
        }
        store::clear_pending_resolve_list(state)?;

        self.sweep_expired(state, ctx)?;

        if ctx.block_height % self.params.reward_payout_interval.max(1) == 0 {
            rewards::payout(state, self.bank.as_ref(), &self.params, ctx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
