// Path: crates/services/src/oracle/validator_status.rs

//! Tracks which validators take part in sampling.
//!
//! A validator that misses a report is deactivated and must wait out the penalty
//! duration before it can reactivate itself.

use super::store;
use oracle_api::state::StateAccess;
use oracle_api::transaction::context::TxContext;
use oracle_telemetry::oracle_metrics;
use oracle_types::app::{AccountId, OracleEvent, ValidatorStatus};
use oracle_types::error::{OracleError, StateError, TransactionError};
use oracle_types::service_configs::OracleParams;

/// Marks `validator` active as of `now`.
pub fn activate(
    state: &mut dyn StateAccess,
    params: &OracleParams,
    validator: &AccountId,
    now: u64,
    ctx: &mut TxContext,
) -> Result<(), TransactionError> {
    let status = store::validator_status(state, validator)?;
    if status.is_active {
        return Err(OracleError::ValidatorAlreadyActive.into());
    }
    if now < status.since.saturating_add(params.inactive_penalty_duration) {
        return Err(OracleError::TooSoonToActivate.into());
    }
    store::set_validator_status(
        state,
        validator,
        &ValidatorStatus {
            is_active: true,
            since: now,
        },
    )?;
    log::info!("[Oracle] Validator {} activated", validator);
    ctx.emit(OracleEvent::ValidatorActivated {
        validator: *validator,
    });
    Ok(())
}

/// Deactivates `validator` for missing a report of a request made at `at`.
///
/// Returns true if the validator was deactivated. A validator that is already
/// inactive, or that became active after the request was made, is left alone.
pub fn miss_report(
    state: &mut dyn StateAccess,
    validator: &AccountId,
    at: u64,
    ctx: &mut TxContext,
) -> Result<bool, StateError> {
    let status = store::validator_status(state, validator)?;
    if !status.is_active || at <= status.since {
        return Ok(false);
    }
    store::set_validator_status(
        state,
        validator,
        &ValidatorStatus {
            is_active: false,
            since: at,
        },
    )?;
    log::warn!("[Oracle] Validator {} deactivated for a missed report", validator);
    oracle_metrics().inc_deactivations();
    ctx.emit(OracleEvent::ValidatorDeactivated {
        validator: *validator,
    });
    Ok(true)
}
