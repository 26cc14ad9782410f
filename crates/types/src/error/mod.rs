// Path: crates/types/src/error/mod.rs
//! Core error types for the oracle engine.
//!
//! Errors are split by how they propagate:
//! - `OracleError` and `TransactionError` are recoverable. They abort and roll back
//!   the transaction that produced them and are surfaced to the caller verbatim.
//! - `ExecutorError` is produced by the sandboxed script executor. During resolution
//!   it is captured into a `Failure` result and never aborts anything.
//! - `FatalError` signals a misconfigured deployment or corrupt state. It is only
//!   returned from block-boundary processing and the host must halt on it.

use crate::app::AccountId;
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors related to the state store.
#[derive(Error, Debug)]
pub enum StateError {
    /// The requested key was not found in the state.
    #[error("Key not found in state")]
    KeyNotFound,
    /// An error occurred in the state backend.
    #[error("State backend error: {0}")]
    Backend(String),
    /// An error occurred while writing to the state.
    #[error("State write error: {0}")]
    WriteError(String),
    /// The provided value was invalid.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    /// An error occurred during state deserialization.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ErrorCode for StateError {
    fn code(&self) -> &'static str {
        match self {
            Self::KeyNotFound => "STATE_KEY_NOT_FOUND",
            Self::Backend(_) => "STATE_BACKEND_ERROR",
            Self::WriteError(_) => "STATE_WRITE_ERROR",
            Self::InvalidValue(_) => "STATE_INVALID_VALUE",
            Self::Decode(_) => "STATE_DECODE_ERROR",
        }
    }
}

/// Admission and validation errors raised by the oracle service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The oracle script code could not be compiled by the executor.
    #[error("Oracle script compilation failed: {0}")]
    OwasmCompilation(String),
    /// The executor failed while running the prepare phase of a request.
    #[error("Bad script execution: {0}")]
    BadWasmExecution(String),
    /// The referenced data source does not exist.
    #[error("Data source not found: {0}")]
    DataSourceNotFound(u64),
    /// The referenced oracle script does not exist.
    #[error("Oracle script not found: {0}")]
    OracleScriptNotFound(u64),
    /// The referenced request does not exist.
    #[error("Request not found: {0}")]
    RequestNotFound(u64),
    /// A raw report referenced an external id that the request never asked for.
    #[error("Raw request not found: request {request_id}, external id {external_id}")]
    RawRequestNotFound {
        /// The request being reported on.
        request_id: u64,
        /// The unknown external id.
        external_id: u64,
    },
    /// The reporter is not registered for the validator.
    #[error("Reporter not found")]
    ReporterNotFound,
    /// No result has been written for the request.
    #[error("Result not found: {0}")]
    ResultNotFound(u64),
    /// The reporter is already registered for the validator.
    #[error("Reporter already exists")]
    ReporterAlreadyExists,
    /// The validator was not assigned to the request.
    #[error("Validator {0:?} was not requested")]
    ValidatorNotRequested(AccountId),
    /// The validator already submitted a report for the request.
    #[error("Validator {0:?} already reported")]
    ValidatorAlreadyReported(AccountId),
    /// The number of raw reports does not match the number of raw requests.
    #[error("Invalid report size. Expected {expected}, got {got}")]
    InvalidReportSize {
        /// The number of raw requests on the request.
        expected: usize,
        /// The number of raw reports submitted.
        got: usize,
    },
    /// The signer is not an authorized reporter of the validator.
    #[error("Reporter not authorized")]
    ReporterNotAuthorized,
    /// The signer does not own the data source or oracle script being edited.
    #[error("Editor not authorized")]
    EditorNotAuthorized,
    /// The validator is already active.
    #[error("Validator already active")]
    ValidatorAlreadyActive,
    /// The validator tried to reactivate before its penalty duration elapsed.
    #[error("Too soon to activate")]
    TooSoonToActivate,
    /// A name exceeded the maximum length.
    #[error("Name too long. Max {max}, got {got}")]
    TooLongName {
        /// The maximum allowed length.
        max: usize,
        /// The submitted length.
        got: usize,
    },
    /// A description exceeded the maximum length.
    #[error("Description too long. Max {max}, got {got}")]
    TooLongDescription {
        /// The maximum allowed length.
        max: usize,
        /// The submitted length.
        got: usize,
    },
    /// A data source executable was empty.
    #[error("Empty executable")]
    EmptyExecutable,
    /// Oracle script code was empty.
    #[error("Empty wasm code")]
    EmptyWasmCode,
    /// A data source executable exceeded the maximum size.
    #[error("Executable too large. Max {max}, got {got}")]
    TooLargeExecutable {
        /// The maximum allowed size.
        max: usize,
        /// The submitted size.
        got: usize,
    },
    /// Oracle script code exceeded the maximum size.
    #[error("Wasm code too large. Max {max}, got {got}")]
    TooLargeWasmCode {
        /// The maximum allowed size.
        max: usize,
        /// The submitted size.
        got: usize,
    },
    /// `min_count` was zero.
    #[error("Invalid min count: {0}")]
    InvalidMinCount(u64),
    /// `ask_count` was below `min_count` or above the configured maximum.
    #[error("Invalid ask count {ask_count} (min count {min_count}, max {max})")]
    InvalidAskCount {
        /// The requested ask count.
        ask_count: u64,
        /// The requested min count.
        min_count: u64,
        /// The configured maximum ask count.
        max: u64,
    },
    /// Request calldata exceeded the maximum size.
    #[error("Calldata too large. Max {max}, got {got}")]
    TooLargeCalldata {
        /// The maximum allowed size.
        max: usize,
        /// The submitted size.
        got: usize,
    },
    /// The client id exceeded the maximum length.
    #[error("Client id too long. Max {max}, got {got}")]
    TooLongClientId {
        /// The maximum allowed length.
        max: usize,
        /// The submitted length.
        got: usize,
    },
    /// The prepare phase produced no raw requests.
    #[error("Empty raw requests")]
    EmptyRawRequests,
    /// A report carried no raw reports.
    #[error("Empty report")]
    EmptyReport,
    /// A report repeated an external id.
    #[error("Duplicate external id: {0}")]
    DuplicateExternalId(u64),
    /// An oracle script schema exceeded the maximum length.
    #[error("Schema too long. Max {max}, got {got}")]
    TooLongSchema {
        /// The maximum allowed length.
        max: usize,
        /// The submitted length.
        got: usize,
    },
    /// An oracle script source url exceeded the maximum length.
    #[error("URL too long. Max {max}, got {got}")]
    TooLongUrl {
        /// The maximum allowed length.
        max: usize,
        /// The submitted length.
        got: usize,
    },
    /// A raw report's data exceeded the maximum size.
    #[error("Raw report data too large. Max {max}, got {got}")]
    TooLargeRawReportData {
        /// The maximum allowed size.
        max: usize,
        /// The submitted size.
        got: usize,
    },
    /// Fewer eligible validators exist than the request asks for.
    #[error("Insufficient validators. Requested {requested}, available {available}")]
    InsufficientValidators {
        /// The number of validators requested.
        requested: u64,
        /// The number of eligible validators.
        available: u64,
    },
    /// A create message carried the do-not-modify sentinel.
    #[error("Cannot create with [do-not-modify] content")]
    CreateWithDoNotModify,
    /// A validator tried to register itself as its own reporter.
    #[error("Cannot reference self as reporter")]
    SelfReferenceAsReporter,
    /// The request has already been expired and swept.
    #[error("Request {0} already expired")]
    RequestAlreadyExpired(u64),
    /// The accumulated fees exceeded the payer's fee limit.
    #[error("Not enough fee: {denom} requires {required}, limit {limit}")]
    NotEnoughFee {
        /// The denomination whose limit was exceeded.
        denom: String,
        /// The running total that exceeded the limit.
        required: u128,
        /// The payer's limit for that denomination.
        limit: u128,
    },
    /// Prepare or execute gas was zero, or their sum exceeded the maximum.
    #[error("Invalid owasm gas: prepare {prepare_gas}, execute {execute_gas}")]
    InvalidOwasmGas {
        /// The requested prepare gas.
        prepare_gas: u64,
        /// The requested execute gas.
        execute_gas: u64,
    },
    /// Cross-chain requests are disabled by the current parameters.
    #[error("Sending oracle request via cross-chain channel is disabled")]
    IbcRequestDisabled,
    /// The result for the request has already been written.
    #[error("Result already exists for request {0}")]
    ResultAlreadyExists(u64),
    /// Fixed-point arithmetic overflowed.
    #[error("Arithmetic overflow: {0}")]
    Overflow(&'static str),
}

impl ErrorCode for OracleError {
    fn code(&self) -> &'static str {
        match self {
            Self::OwasmCompilation(_) => "ORACLE_OWASM_COMPILATION",
            Self::BadWasmExecution(_) => "ORACLE_BAD_WASM_EXECUTION",
            Self::DataSourceNotFound(_) => "ORACLE_DATA_SOURCE_NOT_FOUND",
            Self::OracleScriptNotFound(_) => "ORACLE_SCRIPT_NOT_FOUND",
            Self::RequestNotFound(_) => "ORACLE_REQUEST_NOT_FOUND",
            Self::RawRequestNotFound { .. } => "ORACLE_RAW_REQUEST_NOT_FOUND",
            Self::ReporterNotFound => "ORACLE_REPORTER_NOT_FOUND",
            Self::ResultNotFound(_) => "ORACLE_RESULT_NOT_FOUND",
            Self::ReporterAlreadyExists => "ORACLE_REPORTER_ALREADY_EXISTS",
            Self::ValidatorNotRequested(_) => "ORACLE_VALIDATOR_NOT_REQUESTED",
            Self::ValidatorAlreadyReported(_) => "ORACLE_VALIDATOR_ALREADY_REPORTED",
            Self::InvalidReportSize { .. } => "ORACLE_INVALID_REPORT_SIZE",
            Self::ReporterNotAuthorized => "ORACLE_REPORTER_NOT_AUTHORIZED",
            Self::EditorNotAuthorized => "ORACLE_EDITOR_NOT_AUTHORIZED",
            Self::ValidatorAlreadyActive => "ORACLE_VALIDATOR_ALREADY_ACTIVE",
            Self::TooSoonToActivate => "ORACLE_TOO_SOON_TO_ACTIVATE",
            Self::TooLongName { .. } => "ORACLE_TOO_LONG_NAME",
            Self::TooLongDescription { .. } => "ORACLE_TOO_LONG_DESCRIPTION",
            Self::EmptyExecutable => "ORACLE_EMPTY_EXECUTABLE",
            Self::EmptyWasmCode => "ORACLE_EMPTY_WASM_CODE",
            Self::TooLargeExecutable { .. } => "ORACLE_TOO_LARGE_EXECUTABLE",
            Self::TooLargeWasmCode { .. } => "ORACLE_TOO_LARGE_WASM_CODE",
            Self::InvalidMinCount(_) => "ORACLE_INVALID_MIN_COUNT",
            Self::InvalidAskCount { .. } => "ORACLE_INVALID_ASK_COUNT",
            Self::TooLargeCalldata { .. } => "ORACLE_TOO_LARGE_CALLDATA",
            Self::TooLongClientId { .. } => "ORACLE_TOO_LONG_CLIENT_ID",
            Self::EmptyRawRequests => "ORACLE_EMPTY_RAW_REQUESTS",
            Self::EmptyReport => "ORACLE_EMPTY_REPORT",
            Self::DuplicateExternalId(_) => "ORACLE_DUPLICATE_EXTERNAL_ID",
            Self::TooLongSchema { .. } => "ORACLE_TOO_LONG_SCHEMA",
            Self::TooLongUrl { .. } => "ORACLE_TOO_LONG_URL",
            Self::TooLargeRawReportData { .. } => "ORACLE_TOO_LARGE_RAW_REPORT_DATA",
            Self::InsufficientValidators { .. } => "ORACLE_INSUFFICIENT_VALIDATORS",
            Self::CreateWithDoNotModify => "ORACLE_CREATE_WITH_DO_NOT_MODIFY",
            Self::SelfReferenceAsReporter => "ORACLE_SELF_REFERENCE_AS_REPORTER",
            Self::RequestAlreadyExpired(_) => "ORACLE_REQUEST_ALREADY_EXPIRED",
            Self::NotEnoughFee { .. } => "ORACLE_NOT_ENOUGH_FEE",
            Self::InvalidOwasmGas { .. } => "ORACLE_INVALID_OWASM_GAS",
            Self::IbcRequestDisabled => "ORACLE_IBC_REQUEST_DISABLED",
            Self::ResultAlreadyExists(_) => "ORACLE_RESULT_ALREADY_EXISTS",
            Self::Overflow(_) => "ORACLE_OVERFLOW",
        }
    }
}

/// Errors produced by the sandboxed script executor or its environment.
///
/// During resolution these never abort the block; their display text becomes the
/// failure reason of the request's result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// The script could not be compiled or instantiated.
    #[error("compile error: {0}")]
    Compilation(String),
    /// The script trapped or returned an error at runtime.
    #[error("runtime error: {0}")]
    Runtime(String),
    /// The script exhausted its gas budget.
    #[error("out of gas")]
    OutOfGas,
    /// `set_return_data` was called more than once.
    #[error("set return data is called more than once")]
    RepeatSetReturnData,
    /// Return data exceeded the maximum output size.
    #[error("return data too large: max {max}, got {got}")]
    TooLargeReturnData {
        /// The maximum allowed size.
        max: usize,
        /// The produced size.
        got: usize,
    },
    /// The prepare phase asked for more raw requests than allowed.
    #[error("too many external data requests: max {0}")]
    TooManyExternalData(u64),
    /// The prepare phase reused an external id.
    #[error("duplicate external id: {0}")]
    DuplicateExternalId(u64),
    /// Raw request calldata exceeded the maximum size.
    #[error("external calldata too large: max {max}, got {got}")]
    TooLargeCalldata {
        /// The maximum allowed size.
        max: usize,
        /// The produced size.
        got: usize,
    },
    /// A validator index outside the requested set was read.
    #[error("bad validator index: {0}")]
    BadValidatorIndex(usize),
    /// An unknown external id was read.
    #[error("bad external id: {0}")]
    BadExternalId(u64),
    /// An environment function was called in the wrong phase.
    #[error("wrong period action")]
    WrongPeriodAction,
}

impl ErrorCode for ExecutorError {
    fn code(&self) -> &'static str {
        match self {
            Self::Compilation(_) => "EXECUTOR_COMPILATION",
            Self::Runtime(_) => "EXECUTOR_RUNTIME",
            Self::OutOfGas => "EXECUTOR_OUT_OF_GAS",
            Self::RepeatSetReturnData => "EXECUTOR_REPEAT_SET_RETURN_DATA",
            Self::TooLargeReturnData { .. } => "EXECUTOR_TOO_LARGE_RETURN_DATA",
            Self::TooManyExternalData(_) => "EXECUTOR_TOO_MANY_EXTERNAL_DATA",
            Self::DuplicateExternalId(_) => "EXECUTOR_DUPLICATE_EXTERNAL_ID",
            Self::TooLargeCalldata { .. } => "EXECUTOR_TOO_LARGE_CALLDATA",
            Self::BadValidatorIndex(_) => "EXECUTOR_BAD_VALIDATOR_INDEX",
            Self::BadExternalId(_) => "EXECUTOR_BAD_EXTERNAL_ID",
            Self::WrongPeriodAction => "EXECUTOR_WRONG_PERIOD_ACTION",
        }
    }
}

/// Errors related to transaction processing.
#[derive(Error, Debug)]
pub enum TransactionError {
    /// An error occurred during deserialization.
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    /// The transaction is invalid for a model-specific reason.
    #[error("Invalid transaction: {0}")]
    Invalid(String),
    /// An error originating from the oracle service.
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),
    /// An error originating from the state store.
    #[error("State error: {0}")]
    State(#[from] StateError),
    /// The account has insufficient funds to cover a transfer.
    #[error("Insufficient funds: {denom} balance {balance}, needed {needed}")]
    InsufficientFunds {
        /// The denomination being transferred.
        denom: String,
        /// The available balance.
        balance: u128,
        /// The amount required.
        needed: u128,
    },
    /// The transaction resulted in a balance overflow.
    #[error("Balance overflow")]
    BalanceOverflow,
    /// The transaction ran out of gas.
    #[error("Out of gas in {descriptor}: limit {limit}, wanted {wanted}")]
    OutOfGas {
        /// What the gas was being consumed for.
        descriptor: &'static str,
        /// The gas limit of the transaction.
        limit: u64,
        /// The total gas the transaction would have consumed.
        wanted: u64,
    },
    /// The requested method is not exposed by the service.
    #[error("Unsupported transaction type: {0}")]
    Unsupported(String),
}

impl ErrorCode for TransactionError {
    fn code(&self) -> &'static str {
        match self {
            Self::Deserialization(_) => "TX_DESERIALIZATION_ERROR",
            Self::Invalid(_) => "TX_INVALID",
            Self::Oracle(e) => e.code(),
            Self::State(e) => e.code(),
            Self::InsufficientFunds { .. } => "TX_INSUFFICIENT_FUNDS",
            Self::BalanceOverflow => "TX_BALANCE_OVERFLOW",
            Self::OutOfGas { .. } => "TX_OUT_OF_GAS",
            Self::Unsupported(_) => "TX_UNSUPPORTED",
        }
    }
}

/// Unrecoverable conditions detected at a block boundary.
///
/// These indicate a misconfigured deployment or corrupted state rather than bad
/// input. The host must halt block processing when one is returned.
#[derive(Error, Debug)]
pub enum FatalError {
    /// The service was constructed with parameters that would stall it.
    #[error("Invalid oracle configuration: {0}")]
    InvalidConfig(String),
    /// The state store failed underneath block-boundary processing.
    #[error("State failure during block processing: {0}")]
    State(#[from] StateError),
    /// A record that an invariant guarantees to exist was missing or malformed.
    #[error("Corrupt oracle state: {0}")]
    CorruptState(String),
    /// A response promised to a cross-chain channel could not be handed to the relay.
    #[error("Failed to relay response for request {request_id} on {channel}: {reason}")]
    RelayFailed {
        /// The request whose response could not be sent.
        request_id: u64,
        /// The `port/channel` pair of the destination.
        channel: String,
        /// The relay's description of the failure.
        reason: String,
    },
}

impl ErrorCode for FatalError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "FATAL_INVALID_CONFIG",
            Self::State(_) => "FATAL_STATE",
            Self::CorruptState(_) => "FATAL_CORRUPT_STATE",
            Self::RelayFailed { .. } => "FATAL_RELAY_FAILED",
        }
    }
}

impl From<TransactionError> for FatalError {
    fn from(e: TransactionError) -> Self {
        match e {
            TransactionError::State(s) => FatalError::State(s),
            other => FatalError::CorruptState(other.to_string()),
        }
    }
}
