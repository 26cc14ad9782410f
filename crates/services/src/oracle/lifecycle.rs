// Path: crates/services/src/oracle/lifecycle.rs

//! The request state machine: admission, report ingestion and resolution.

use super::{fees, rewards, sampler, store, OracleService, ReportDataParams, RequestDataParams};
use oracle_api::state::StateAccess;
use oracle_api::transaction::context::TxContext;
use oracle_api::vm::{from_executor_gas, to_executor_gas, ExecuteEnv, PrepareEnv};
use oracle_telemetry::oracle_metrics;
use oracle_types::app::{
    AccountId, OracleEvent, OracleResult, RawReport, Report, Request, RequestId, ResolveStatus,
};
use oracle_types::error::{FatalError, OracleError, TransactionError};
use oracle_types::ibc::{IbcChannel, OracleResponsePacket};
use std::collections::BTreeSet;

pub const MAX_CLIENT_ID_LENGTH: usize = 128;
pub const MAX_OWASM_GAS: u64 = 8_000_000;

/// Stateless checks on a request message.
pub fn validate_request(params: &RequestDataParams) -> Result<(), OracleError> {
    if params.min_count == 0 {
        return Err(OracleError::InvalidMinCount(params.min_count));
    }
    if params.ask_count < params.min_count {
        return Err(OracleError::InvalidAskCount {
            ask_count: params.ask_count,
            min_count: params.min_count,
            max: params.ask_count,
        });
    }
    if params.client_id.len() > MAX_CLIENT_ID_LENGTH {
        return Err(OracleError::TooLongClientId {
            max: MAX_CLIENT_ID_LENGTH,
            got: params.client_id.len(),
        });
    }
    let total_gas = params.prepare_gas.checked_add(params.execute_gas);
    if params.prepare_gas == 0
        || params.execute_gas == 0
        || total_gas.map_or(true, |gas| gas > MAX_OWASM_GAS)
    {
        return Err(OracleError::InvalidOwasmGas {
            prepare_gas: params.prepare_gas,
            execute_gas: params.execute_gas,
        });
    }
    Ok(())
}

/// Stateless checks on a report message.
pub fn validate_report(params: &ReportDataParams) -> Result<(), OracleError> {
    if params.raw_reports.is_empty() {
        return Err(OracleError::EmptyReport);
    }
    let mut seen = BTreeSet::new();
    for raw in &params.raw_reports {
        if !seen.insert(raw.external_id) {
            return Err(OracleError::DuplicateExternalId(raw.external_id));
        }
    }
    Ok(())
}

impl OracleService {
    /// Admits a request: samples validators, runs the prepare phase, collects fees
    /// and persists the request. Returns the new request id.
    pub(crate) fn prepare_request(
        &self,
        state: &mut dyn StateAccess,
        params: RequestDataParams,
        payer: AccountId,
        ibc_channel: Option<IbcChannel>,
        ctx: &mut TxContext,
    ) -> Result<RequestId, TransactionError> {
        let cfg = &self.params;
        let max_calldata = usize::try_from(cfg.max_calldata_size).unwrap_or(usize::MAX);
        if params.calldata.len() > max_calldata {
            return Err(OracleError::TooLargeCalldata {
                max: max_calldata,
                got: params.calldata.len(),
            }
            .into());
        }
        if params.ask_count > cfg.max_ask_count {
            return Err(OracleError::InvalidAskCount {
                ask_count: params.ask_count,
                min_count: params.min_count,
                max: cfg.max_ask_count,
            }
            .into());
        }
        ctx.gas.consume(
            params.ask_count.saturating_mul(cfg.per_validator_request_gas),
            "request validators",
        )?;

        let id = store::request_count(state)?.saturating_add(1);
        let bonded = self.validators.bonded_validators(state)?;
        let validators = sampler::sample(
            state,
            bonded,
            params.ask_count,
            id,
            ctx.chain_id,
            cfg.sampling_try_count,
        )?;

        let script = store::get_oracle_script(state, params.oracle_script_id)?;
        let code = self.blobs.get(&script.filename)?.ok_or_else(|| {
            TransactionError::Invalid(format!(
                "code of oracle script {} is missing from the blob cache",
                params.oracle_script_id
            ))
        })?;

        let mut request = Request {
            oracle_script_id: params.oracle_script_id,
            calldata: params.calldata,
            requested_validators: validators,
            min_count: params.min_count,
            request_height: ctx.block_height,
            request_time: ctx.block_timestamp,
            client_id: params.client_id,
            raw_requests: Vec::new(),
            execute_gas: params.execute_gas,
            ibc_channel,
        };

        let prepare_gas = cfg.base_owasm_gas.saturating_add(params.prepare_gas);
        ctx.gas.consume(prepare_gas, "prepare")?;
        let (output, raw_requests) = {
            let mut env = PrepareEnv::new(&request, cfg.max_raw_request_count, max_calldata);
            let output = self
                .executor
                .prepare(&code, to_executor_gas(prepare_gas), max_calldata, &mut env)
                .map_err(|e| OracleError::BadWasmExecution(e.to_string()))?;
            (output, env.into_raw_requests())
        };
        let mut data_sources = Vec::with_capacity(raw_requests.len());
        for raw in &raw_requests {
            data_sources.push(store::get_data_source(state, raw.data_source_id)?);
        }
        if raw_requests.is_empty() {
            return Err(OracleError::EmptyRawRequests.into());
        }
        request.raw_requests = raw_requests;

        let total_fees = fees::collect(
            state,
            self.bank.as_ref(),
            &payer,
            &params.fee_limit,
            request.ask_count(),
            &request.raw_requests,
        )?;

        store::set_request(state, id, &request)?;
        store::set_request_count(state, id)?;
        ctx.emit(OracleEvent::RequestCreated {
            request_id: id,
            oracle_script_id: request.oracle_script_id,
            calldata: request.calldata.clone(),
            ask_count: request.ask_count(),
            min_count: request.min_count,
            gas_used: from_executor_gas(output.gas_used),
            total_fees,
            validators: request.requested_validators.clone(),
            client_id: request.client_id.clone(),
        });

        ctx.gas.consume(
            cfg.base_owasm_gas.saturating_add(params.execute_gas),
            "execute",
        )?;

        for (raw, data_source) in request.raw_requests.iter().zip(data_sources) {
            ctx.emit(OracleEvent::RawRequestCreated {
                request_id: id,
                data_source_id: raw.data_source_id,
                data_source_hash: data_source.filename,
                external_id: raw.external_id,
                calldata: raw.calldata.clone(),
                fee: data_source.fee,
            });
        }

        log::info!(
            "[Oracle] Request {} admitted with {} raw requests for {} validators",
            id,
            request.raw_requests.len(),
            request.ask_count()
        );
        oracle_metrics().inc_requests_created();
        Ok(id)
    }

    /// Records a validator's report. The request is queued for resolution when the
    /// report brings it to quorum.
    pub(crate) fn add_report(
        &self,
        state: &mut dyn StateAccess,
        request_id: RequestId,
        validator: AccountId,
        raw_reports: Vec<RawReport>,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        if request_id <= store::request_last_expired(state)? {
            return Err(OracleError::RequestAlreadyExpired(request_id).into());
        }
        let request = store::must_get_request(state, request_id)?;
        if request.validator_index(&validator).is_none() {
            return Err(OracleError::ValidatorNotRequested(validator).into());
        }
        if store::has_report(state, request_id, &validator)? {
            return Err(OracleError::ValidatorAlreadyReported(validator).into());
        }
        if raw_reports.len() != request.raw_requests.len() {
            return Err(OracleError::InvalidReportSize {
                expected: request.raw_requests.len(),
                got: raw_reports.len(),
            }
            .into());
        }
        let max_data = usize::try_from(self.params.max_report_data_size).unwrap_or(usize::MAX);
        for raw in &raw_reports {
            if request.raw_request(raw.external_id).is_none() {
                return Err(OracleError::RawRequestNotFound {
                    request_id,
                    external_id: raw.external_id,
                }
                .into());
            }
            if raw.data.len() > max_data {
                return Err(OracleError::TooLargeRawReportData {
                    max: max_data,
                    got: raw.data.len(),
                }
                .into());
            }
        }

        let in_before_resolve = !store::has_result(state, request_id)?;
        store::set_report(
            state,
            request_id,
            &Report {
                validator,
                in_before_resolve,
                raw_reports,
            },
        )?;

        if in_before_resolve && store::report_count(state, request_id)? == request.min_count {
            let reports = store::get_reports(state, request_id)?;
            rewards::accrue(state, &self.params, &request, &reports)?;
            store::push_pending_resolve(state, request_id)?;
            log::debug!("[Oracle] Request {} reached quorum", request_id);
        }

        ctx.emit(OracleEvent::ReportReceived {
            request_id,
            validator,
        });
        oracle_metrics().inc_reports_received();
        Ok(())
    }

    /// Runs the execute phase of a request that reached quorum and records the result.
    ///
    /// Executor failures become a `Failure` result and never abort the block.
    pub(crate) fn resolve_request(
        &self,
        state: &mut dyn StateAccess,
        request_id: RequestId,
        ctx: &mut TxContext,
    ) -> Result<(), FatalError> {
        let request = store::get_request(state, request_id)?.ok_or_else(|| {
            FatalError::CorruptState(format!("pending request {} does not exist", request_id))
        })?;
        let reports = store::get_reports(state, request_id)?;
        let script = store::get_oracle_script(state, request.oracle_script_id)?;
        let max_result = usize::try_from(self.params.max_result_size).unwrap_or(usize::MAX);

        let outcome = match self.blobs.get(&script.filename)? {
            None => Outcome::Failure(format!(
                "code of oracle script {} not found",
                request.oracle_script_id
            )),
            Some(code) => {
                let mut env =
                    ExecuteEnv::new(&request, &reports, max_result, ctx.block_timestamp);
                let gas_limit =
                    to_executor_gas(self.params.base_owasm_gas.saturating_add(request.execute_gas));
                match self.executor.execute(&code, gas_limit, max_result, &mut env) {
                    Err(e) => Outcome::Failure(e.to_string()),
                    Ok(output) => match env.into_return_data() {
                        None => Outcome::Failure("no return data".to_string()),
                        Some(data) => Outcome::Success {
                            data,
                            gas_used: from_executor_gas(output.gas_used),
                        },
                    },
                }
            }
        };

        let ans_count = reports.len() as u64;
        match outcome {
            Outcome::Success { data, gas_used } => self.save_result(
                state,
                request_id,
                &request,
                ans_count,
                Resolution {
                    status: ResolveStatus::Success,
                    result: data,
                    gas_used,
                    reason: None,
                },
                ctx,
            ),
            Outcome::Failure(reason) => {
                log::info!("[Oracle] Request {} failed: {}", request_id, reason);
                self.save_result(
                    state,
                    request_id,
                    &request,
                    ans_count,
                    Resolution {
                        status: ResolveStatus::Failure,
                        result: Vec::new(),
                        gas_used: 0,
                        reason: Some(reason),
                    },
                    ctx,
                )
            }
        }
    }

    /// Writes the one result of a request, emits `Resolved` and, for requests that
    /// arrived on a channel, hands the response to the relay.
    pub(crate) fn save_result(
        &self,
        state: &mut dyn StateAccess,
        request_id: RequestId,
        request: &Request,
        ans_count: u64,
        resolution: Resolution,
        ctx: &mut TxContext,
    ) -> Result<(), FatalError> {
        let result = OracleResult {
            request_id,
            client_id: request.client_id.clone(),
            oracle_script_id: request.oracle_script_id,
            calldata: request.calldata.clone(),
            ask_count: request.ask_count(),
            min_count: request.min_count,
            ans_count,
            request_time: request.request_time,
            resolve_time: ctx.block_timestamp,
            resolve_status: resolution.status,
            result: resolution.result,
        };
        store::set_result(state, &result)?;

        ctx.emit(OracleEvent::Resolved {
            request_id,
            status: resolution.status,
            result: result.result.clone(),
            gas_used: resolution.gas_used,
            reason: resolution.reason,
        });
        oracle_metrics().inc_resolved(resolution.status.as_str());
        log::debug!(
            "[Oracle] Request {} resolved as {}",
            request_id,
            resolution.status.as_str()
        );

        if let Some(channel) = &request.ibc_channel {
            let packet = OracleResponsePacket {
                client_id: result.client_id,
                request_id,
                ans_count,
                request_time: result.request_time,
                resolve_time: result.resolve_time,
                resolve_status: result.resolve_status,
                result: result.result,
            };
            self.relay
                .send_response(channel, packet)
                .map_err(|reason| FatalError::RelayFailed {
                    request_id,
                    channel: channel.to_string(),
                    reason,
                })?;
        }
        Ok(())
    }
}

enum Outcome {
    Success { data: Vec<u8>, gas_used: u64 },
    Failure(String),
}

/// How a request resolved, ready to be recorded.
pub(crate) struct Resolution {
    pub status: ResolveStatus,
    pub result: Vec<u8>,
    pub gas_used: u64,
    pub reason: Option<String>,
}
