// Path: crates/api/src/vm/mod.rs
//! Defines the sandboxed oracle script executor and the host environments it runs against.
//!
//! An oracle script runs twice per request. The prepare phase sees the request and
//! asks for external data, producing raw requests. The execute phase sees the
//! validators' raw reports and sets the return data that becomes the result.

use oracle_types::app::{DataSourceId, ExternalId, RawReport, RawRequest, Report, Request};
use oracle_types::error::ExecutorError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Executor gas units per unit of transaction gas.
pub const EXECUTOR_GAS_MULTIPLIER: u64 = 7;

/// Converts transaction gas to executor gas, saturating on overflow.
pub fn to_executor_gas(gas: u64) -> u64 {
    gas.saturating_mul(EXECUTOR_GAS_MULTIPLIER)
}

/// Converts executor gas back to transaction gas, rounding down.
pub fn from_executor_gas(gas: u64) -> u64 {
    gas / EXECUTOR_GAS_MULTIPLIER
}

/// A sandboxed, gas-bounded executor of oracle scripts.
///
/// Calls are synchronous and deterministic: the same code, gas limit and
/// environment must always produce the same outcome on every replica.
pub trait Executor: Send + Sync {
    /// Validates and compiles uploaded script code into its runnable form.
    fn compile(&self, code: &[u8]) -> Result<Vec<u8>, ExecutorError>;

    /// Runs the prepare phase of `code`.
    fn prepare(
        &self,
        code: &[u8],
        gas_limit: u64,
        max_output_size: usize,
        env: &mut PrepareEnv<'_>,
    ) -> Result<ExecutionOutput, ExecutorError>;

    /// Runs the execute phase of `code`.
    fn execute(
        &self,
        code: &[u8],
        gas_limit: u64,
        max_output_size: usize,
        env: &mut ExecuteEnv<'_>,
    ) -> Result<ExecutionOutput, ExecutorError>;
}

/// Contains the results of a successful script run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ExecutionOutput {
    /// The amount of executor gas consumed.
    pub gas_used: u64,
}

/// The host environment of the prepare phase.
///
/// Exposes the request read-only and collects the raw requests the script asks for.
pub struct PrepareEnv<'a> {
    request: &'a Request,
    max_raw_requests: u64,
    max_calldata_size: usize,
    raw_requests: Vec<RawRequest>,
}

impl<'a> PrepareEnv<'a> {
    /// Creates the environment for preparing `request`.
    pub fn new(request: &'a Request, max_raw_requests: u64, max_calldata_size: usize) -> Self {
        Self {
            request,
            max_raw_requests,
            max_calldata_size,
            raw_requests: Vec::new(),
        }
    }

    /// The request being prepared.
    pub fn request(&self) -> &Request {
        self.request
    }

    /// The calldata of the request.
    pub fn calldata(&self) -> &[u8] {
        &self.request.calldata
    }

    /// The number of validators assigned to the request.
    pub fn ask_count(&self) -> u64 {
        self.request.ask_count()
    }

    /// The quorum of the request.
    pub fn min_count(&self) -> u64 {
        self.request.min_count
    }

    /// The block time of admission.
    pub fn prepare_time(&self) -> u64 {
        self.request.request_time
    }

    /// Asks every assigned validator to query `data_source_id` with `calldata`.
    pub fn ask_external_data(
        &mut self,
        external_id: ExternalId,
        data_source_id: DataSourceId,
        calldata: Vec<u8>,
    ) -> Result<(), ExecutorError> {
        if self.raw_requests.len() as u64 >= self.max_raw_requests {
            return Err(ExecutorError::TooManyExternalData(self.max_raw_requests));
        }
        if calldata.len() > self.max_calldata_size {
            return Err(ExecutorError::TooLargeCalldata {
                max: self.max_calldata_size,
                got: calldata.len(),
            });
        }
        if self.raw_requests.iter().any(|r| r.external_id == external_id) {
            return Err(ExecutorError::DuplicateExternalId(external_id));
        }
        self.raw_requests.push(RawRequest {
            external_id,
            data_source_id,
            calldata,
        });
        Ok(())
    }

    /// Reports are not available while preparing.
    pub fn get_external_data(
        &self,
        _external_id: ExternalId,
        _validator_index: usize,
    ) -> Result<Option<&[u8]>, ExecutorError> {
        Err(ExecutorError::WrongPeriodAction)
    }

    /// Return data cannot be set while preparing.
    pub fn set_return_data(&mut self, _data: Vec<u8>) -> Result<(), ExecutorError> {
        Err(ExecutorError::WrongPeriodAction)
    }

    /// The raw requests asked for so far, in order.
    pub fn raw_requests(&self) -> &[RawRequest] {
        &self.raw_requests
    }

    /// Consumes the environment, returning the collected raw requests.
    pub fn into_raw_requests(self) -> Vec<RawRequest> {
        self.raw_requests
    }
}

/// The host environment of the execute phase.
///
/// Exposes the reports of the request by validator index and accepts a single
/// write of return data.
pub struct ExecuteEnv<'a> {
    request: &'a Request,
    reports: BTreeMap<usize, &'a Report>,
    max_result_size: usize,
    resolve_time: u64,
    return_data: Option<Vec<u8>>,
}

impl<'a> ExecuteEnv<'a> {
    /// Creates the environment for resolving `request` from `reports`.
    ///
    /// Reports from validators outside the requested set are ignored.
    pub fn new(
        request: &'a Request,
        reports: &'a [Report],
        max_result_size: usize,
        resolve_time: u64,
    ) -> Self {
        let reports = reports
            .iter()
            .filter_map(|r| request.validator_index(&r.validator).map(|i| (i, r)))
            .collect();
        Self {
            request,
            reports,
            max_result_size,
            resolve_time,
            return_data: None,
        }
    }

    /// The request being resolved.
    pub fn request(&self) -> &Request {
        self.request
    }

    /// The calldata of the request.
    pub fn calldata(&self) -> &[u8] {
        &self.request.calldata
    }

    /// The number of validators assigned to the request.
    pub fn ask_count(&self) -> u64 {
        self.request.ask_count()
    }

    /// The quorum of the request.
    pub fn min_count(&self) -> u64 {
        self.request.min_count
    }

    /// The number of reports received.
    pub fn ans_count(&self) -> u64 {
        self.reports.len() as u64
    }

    /// The block time of admission.
    pub fn prepare_time(&self) -> u64 {
        self.request.request_time
    }

    /// The block time of resolution.
    pub fn execute_time(&self) -> u64 {
        self.resolve_time
    }

    /// New raw requests cannot be made while executing.
    pub fn ask_external_data(
        &mut self,
        _external_id: ExternalId,
        _data_source_id: DataSourceId,
        _calldata: Vec<u8>,
    ) -> Result<(), ExecutorError> {
        Err(ExecutorError::WrongPeriodAction)
    }

    fn raw_report(
        &self,
        external_id: ExternalId,
        validator_index: usize,
    ) -> Result<Option<&'a RawReport>, ExecutorError> {
        if validator_index >= self.request.requested_validators.len() {
            return Err(ExecutorError::BadValidatorIndex(validator_index));
        }
        if self.request.raw_request(external_id).is_none() {
            return Err(ExecutorError::BadExternalId(external_id));
        }
        Ok(self.reports.get(&validator_index).copied().and_then(|report| {
            report
                .raw_reports
                .iter()
                .find(|r| r.external_id == external_id)
        }))
    }

    /// The exit code reported by the validator at `validator_index` for
    /// `external_id`, or `None` if that validator did not report.
    pub fn get_external_data_status(
        &self,
        external_id: ExternalId,
        validator_index: usize,
    ) -> Result<Option<u32>, ExecutorError> {
        Ok(self
            .raw_report(external_id, validator_index)?
            .map(|r| r.exit_code))
    }

    /// The data reported by the validator at `validator_index` for `external_id`,
    /// or `None` if that validator did not report.
    pub fn get_external_data(
        &self,
        external_id: ExternalId,
        validator_index: usize,
    ) -> Result<Option<&[u8]>, ExecutorError> {
        Ok(self
            .raw_report(external_id, validator_index)?
            .map(|r| r.data.as_slice()))
    }

    /// Sets the result of the request. May be called at most once.
    pub fn set_return_data(&mut self, data: Vec<u8>) -> Result<(), ExecutorError> {
        if self.return_data.is_some() {
            return Err(ExecutorError::RepeatSetReturnData);
        }
        if data.len() > self.max_result_size {
            return Err(ExecutorError::TooLargeReturnData {
                max: self.max_result_size,
                got: data.len(),
            });
        }
        self.return_data = Some(data);
        Ok(())
    }

    /// The return data set by the script, if any.
    pub fn return_data(&self) -> Option<&[u8]> {
        self.return_data.as_deref()
    }

    /// Consumes the environment, returning the return data set by the script.
    pub fn into_return_data(self) -> Option<Vec<u8>> {
        self.return_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_types::app::AccountId;

    fn request() -> Request {
        Request {
            oracle_script_id: 1,
            calldata: b"BTC".to_vec(),
            requested_validators: vec![AccountId([1; 32]), AccountId([2; 32])],
            min_count: 1,
            request_height: 5,
            request_time: 1_000,
            client_id: "client".into(),
            raw_requests: vec![RawRequest {
                external_id: 1,
                data_source_id: 1,
                calldata: vec![],
            }],
            execute_gas: 100,
            ibc_channel: None,
        }
    }

    #[test]
    fn gas_conversion_uses_multiplier() {
        assert_eq!(EXECUTOR_GAS_MULTIPLIER, 7);
        assert_eq!(to_executor_gas(10), 70);
        assert_eq!(from_executor_gas(76), 10);
        assert_eq!(to_executor_gas(u64::MAX), u64::MAX);
    }

    #[test]
    fn prepare_env_enforces_raw_request_rules() {
        let req = request();
        let mut env = PrepareEnv::new(&req, 2, 4);
        assert_eq!(env.calldata(), b"BTC");
        env.ask_external_data(1, 10, vec![1]).unwrap();
        assert_eq!(
            env.ask_external_data(1, 11, vec![]),
            Err(ExecutorError::DuplicateExternalId(1))
        );
        assert!(matches!(
            env.ask_external_data(2, 11, vec![0; 5]),
            Err(ExecutorError::TooLargeCalldata { max: 4, got: 5 })
        ));
        env.ask_external_data(2, 11, vec![]).unwrap();
        assert_eq!(
            env.ask_external_data(3, 12, vec![]),
            Err(ExecutorError::TooManyExternalData(2))
        );
        assert_eq!(env.get_external_data(1, 0), Err(ExecutorError::WrongPeriodAction));
        assert_eq!(env.set_return_data(vec![]), Err(ExecutorError::WrongPeriodAction));
        let raw = env.into_raw_requests();
        assert_eq!(raw.iter().map(|r| r.external_id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn execute_env_reads_reports_by_validator_index() {
        let req = request();
        let reports = vec![Report {
            validator: AccountId([2; 32]),
            in_before_resolve: true,
            raw_reports: vec![RawReport {
                external_id: 1,
                exit_code: 0,
                data: b"42".to_vec(),
            }],
        }];
        let env = ExecuteEnv::new(&req, &reports, 8, 2_000);
        assert_eq!(env.ans_count(), 1);
        assert_eq!(env.get_external_data(1, 1).unwrap(), Some(&b"42"[..]));
        assert_eq!(env.get_external_data_status(1, 1).unwrap(), Some(0));
        assert_eq!(env.get_external_data(1, 0).unwrap(), None);
        assert_eq!(env.get_external_data(1, 2), Err(ExecutorError::BadValidatorIndex(2)));
        assert_eq!(env.get_external_data(9, 0), Err(ExecutorError::BadExternalId(9)));
        assert_eq!(env.execute_time(), 2_000);
    }

    #[test]
    fn return_data_is_write_once() {
        let req = request();
        let mut env = ExecuteEnv::new(&req, &[], 4, 0);
        assert!(matches!(
            env.set_return_data(vec![0; 5]),
            Err(ExecutorError::TooLargeReturnData { max: 4, got: 5 })
        ));
        env.set_return_data(b"ok".to_vec()).unwrap();
        assert_eq!(
            env.set_return_data(b"again".to_vec()),
            Err(ExecutorError::RepeatSetReturnData)
        );
        assert_eq!(env.into_return_data(), Some(b"ok".to_vec()));
    }
}
