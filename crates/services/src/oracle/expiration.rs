// Path: crates/services/src/oracle/expiration.rs

//! The per-block sweep over requests that have outlived `expiration_block_count`.

use super::lifecycle::Resolution;
use super::{store, validator_status, OracleService};
use oracle_api::state::StateAccess;
use oracle_api::transaction::context::TxContext;
use oracle_telemetry::oracle_metrics;
use oracle_types::app::ResolveStatus;
use oracle_types::error::FatalError;

impl OracleService {
    /// Expires every request old enough to expire, in id order, and returns how many
    /// were swept.
    ///
    /// Unresolved requests resolve as `Expired`. Validators that never reported are
    /// deactivated. The request and its reports are deleted; the result is kept.
    pub(crate) fn sweep_expired(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext,
    ) -> Result<u64, FatalError> {
        let last_expired = store::request_last_expired(state)?;
        let request_count = store::request_count(state)?;
        let mut swept = 0u64;

        for id in last_expired.saturating_add(1)..=request_count {
            let request = store::get_request(state, id)?.ok_or_else(|| {
                FatalError::CorruptState(format!("request {} missing during expiration", id))
            })?;
            if request
                .request_height
                .saturating_add(self.params.expiration_block_count)
                > ctx.block_height
            {
                break;
            }

            if !store::has_result(state, id)? {
                let ans_count = store::report_count(state, id)?;
                log::info!("[Sweep] Request {} expired with {} reports", id, ans_count);
                self.save_result(
                    state,
                    id,
                    &request,
                    ans_count,
                    Resolution {
                        status: ResolveStatus::Expired,
                        result: Vec::new(),
                        gas_used: 0,
                        reason: None,
                    },
                    ctx,
                )?;
            }

            for validator in &request.requested_validators {
                if !store::has_report(state, id, validator)? {
                    validator_status::miss_report(state, validator, request.request_time, ctx)?;
                }
            }

            store::delete_request(state, id)?;
            store::delete_reports(state, id)?;
            store::set_request_last_expired(state, id)?;
            swept += 1;
        }

        if swept > 0 {
            oracle_metrics().inc_expired(swept);
        }
        Ok(swept)
    }
}
