// Path: crates/services/src/oracle/registry.rs

//! Data sources, oracle scripts and reporter grants.

use super::{
    store, CreateDataSourceParams, CreateOracleScriptParams, EditDataSourceParams,
    EditOracleScriptParams, OracleService,
};
use oracle_api::state::StateAccess;
use oracle_api::transaction::context::TxContext;
use oracle_types::app::{
    modify, AccountId, DataSource, DataSourceId, OracleEvent, OracleScript, OracleScriptId,
    DO_NOT_MODIFY,
};
use oracle_types::error::{OracleError, StateError, TransactionError};

pub const MAX_NAME_LENGTH: usize = 128;
pub const MAX_DESCRIPTION_LENGTH: usize = 4096;
pub const MAX_SCHEMA_LENGTH: usize = 512;
pub const MAX_URL_LENGTH: usize = 128;
pub const MAX_EXECUTABLE_SIZE: usize = 8 * 1024;
pub const MAX_WASM_CODE_SIZE: usize = 512 * 1024;

fn is_sentinel(bytes: &[u8]) -> bool {
    bytes == DO_NOT_MODIFY.as_bytes()
}

fn check_len(
    value: &str,
    max: usize,
    err: fn(usize, usize) -> OracleError,
) -> Result<(), OracleError> {
    if value.len() > max {
        return Err(err(max, value.len()));
    }
    Ok(())
}

fn check_name_and_description(name: &str, description: &str) -> Result<(), OracleError> {
    check_len(name, MAX_NAME_LENGTH, |max, got| OracleError::TooLongName { max, got })?;
    check_len(description, MAX_DESCRIPTION_LENGTH, |max, got| {
        OracleError::TooLongDescription { max, got }
    })
}

fn check_executable(executable: &[u8]) -> Result<(), OracleError> {
    if executable.is_empty() {
        return Err(OracleError::EmptyExecutable);
    }
    if executable.len() > MAX_EXECUTABLE_SIZE {
        return Err(OracleError::TooLargeExecutable {
            max: MAX_EXECUTABLE_SIZE,
            got: executable.len(),
        });
    }
    Ok(())
}

fn check_script(schema: &str, url: &str, code: &[u8]) -> Result<(), OracleError> {
    check_len(schema, MAX_SCHEMA_LENGTH, |max, got| OracleError::TooLongSchema { max, got })?;
    check_len(url, MAX_URL_LENGTH, |max, got| OracleError::TooLongUrl { max, got })?;
    if code.is_empty() {
        return Err(OracleError::EmptyWasmCode);
    }
    if code.len() > MAX_WASM_CODE_SIZE {
        return Err(OracleError::TooLargeWasmCode {
            max: MAX_WASM_CODE_SIZE,
            got: code.len(),
        });
    }
    Ok(())
}

pub fn validate_create_data_source(params: &CreateDataSourceParams) -> Result<(), OracleError> {
    check_name_and_description(&params.name, &params.description)?;
    check_executable(&params.executable)?;
    if params.name == DO_NOT_MODIFY
        || params.description == DO_NOT_MODIFY
        || is_sentinel(&params.executable)
    {
        return Err(OracleError::CreateWithDoNotModify);
    }
    Ok(())
}

pub fn validate_edit_data_source(params: &EditDataSourceParams) -> Result<(), OracleError> {
    check_name_and_description(&params.name, &params.description)?;
    check_executable(&params.executable)
}

pub fn validate_create_oracle_script(params: &CreateOracleScriptParams) -> Result<(), OracleError> {
    check_name_and_description(&params.name, &params.description)?;
    check_script(&params.schema, &params.source_code_url, &params.code)?;
    if [
        &params.name,
        &params.description,
        &params.schema,
        &params.source_code_url,
    ]
    .iter()
    .any(|field| field.as_str() == DO_NOT_MODIFY)
        || is_sentinel(&params.code)
    {
        return Err(OracleError::CreateWithDoNotModify);
    }
    Ok(())
}

pub fn validate_edit_oracle_script(params: &EditOracleScriptParams) -> Result<(), OracleError> {
    check_name_and_description(&params.name, &params.description)?;
    check_script(&params.schema, &params.source_code_url, &params.code)
}

/// True if `reporter` may report for `validator`. A validator always reports for itself.
pub fn is_reporter(
    state: &dyn StateAccess,
    validator: &AccountId,
    reporter: &AccountId,
) -> Result<bool, StateError> {
    Ok(validator == reporter || store::has_reporter_grant(state, validator, reporter)?)
}

pub fn add_reporter(
    state: &mut dyn StateAccess,
    validator: &AccountId,
    reporter: &AccountId,
    ctx: &mut TxContext,
) -> Result<(), TransactionError> {
    if validator == reporter {
        return Err(OracleError::SelfReferenceAsReporter.into());
    }
    if store::has_reporter_grant(state, validator, reporter)? {
        return Err(OracleError::ReporterAlreadyExists.into());
    }
    store::set_reporter_grant(state, validator, reporter)?;
    ctx.emit(OracleEvent::ReporterAdded {
        validator: *validator,
        reporter: *reporter,
    });
    Ok(())
}

pub fn remove_reporter(
    state: &mut dyn StateAccess,
    validator: &AccountId,
    reporter: &AccountId,
    ctx: &mut TxContext,
) -> Result<(), TransactionError> {
    if !store::has_reporter_grant(state, validator, reporter)? {
        return Err(OracleError::ReporterNotFound.into());
    }
    store::delete_reporter_grant(state, validator, reporter)?;
    ctx.emit(OracleEvent::ReporterRemoved {
        validator: *validator,
        reporter: *reporter,
    });
    Ok(())
}

impl OracleService {
    pub(crate) fn add_data_source(
        &self,
        state: &mut dyn StateAccess,
        params: CreateDataSourceParams,
        ctx: &mut TxContext,
    ) -> Result<DataSourceId, TransactionError> {
        let filename = self.blobs.put(&params.executable)?;
        let id = store::next_data_source_id(state)?;
        store::set_data_source(
            state,
            id,
            &DataSource {
                owner: params.owner,
                name: params.name,
                description: params.description,
                filename,
                fee: params.fee,
            },
        )?;
        log::info!("[Oracle] Data source {} created", id);
        ctx.emit(OracleEvent::DataSourceCreated { id });
        Ok(id)
    }

    pub(crate) fn update_data_source(
        &self,
        state: &mut dyn StateAccess,
        params: EditDataSourceParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let id = params.data_source_id;
        let current = store::get_data_source(state, id)?;
        if current.owner != ctx.signer_account_id {
            return Err(OracleError::EditorNotAuthorized.into());
        }
        let filename = if is_sentinel(&params.executable) {
            current.filename
        } else {
            self.blobs.put(&params.executable)?
        };
        store::set_data_source(
            state,
            id,
            &DataSource {
                owner: params.owner,
                name: modify(current.name, params.name),
                description: modify(current.description, params.description),
                filename,
                fee: params.fee,
            },
        )?;
        log::info!("[Oracle] Data source {} edited", id);
        ctx.emit(OracleEvent::DataSourceEdited { id });
        Ok(())
    }

    fn compile_and_cache(&self, code: &[u8]) -> Result<[u8; 32], TransactionError> {
        let compiled = self
            .executor
            .compile(code)
            .map_err(|e| OracleError::OwasmCompilation(e.to_string()))?;
        Ok(self.blobs.put(&compiled)?)
    }

    pub(crate) fn add_oracle_script(
        &self,
        state: &mut dyn StateAccess,
        params: CreateOracleScriptParams,
        ctx: &mut TxContext,
    ) -> Result<OracleScriptId, TransactionError> {
        let filename = self.compile_and_cache(&params.code)?;
        let id = store::next_oracle_script_id(state)?;
        store::set_oracle_script(
            state,
            id,
            &OracleScript {
                owner: params.owner,
                name: params.name,
                description: params.description,
                filename,
                schema: params.schema,
                source_code_url: params.source_code_url,
            },
        )?;
        log::info!("[Oracle] Oracle script {} created", id);
        ctx.emit(OracleEvent::OracleScriptCreated { id });
        Ok(id)
    }

    pub(crate) fn update_oracle_script(
        &self,
        state: &mut dyn StateAccess,
        params: EditOracleScriptParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let id = params.oracle_script_id;
        let current = store::get_oracle_script(state, id)?;
        if current.owner != ctx.signer_account_id {
            return Err(OracleError::EditorNotAuthorized.into());
        }
        let filename = if is_sentinel(&params.code) {
            current.filename
        } else {
            self.compile_and_cache(&params.code)?
        };
        store::set_oracle_script(
            state,
            id,
            &OracleScript {
                owner: params.owner,
                name: modify(current.name, params.name),
                description: modify(current.description, params.description),
                filename,
                schema: modify(current.schema, params.schema),
                source_code_url: modify(current.source_code_url, params.source_code_url),
            },
        )?;
        log::info!("[Oracle] Oracle script {} edited", id);
        ctx.emit(OracleEvent::OracleScriptEdited { id });
        Ok(())
    }
}
