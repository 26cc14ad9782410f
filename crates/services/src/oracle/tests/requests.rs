// Path: crates/services/src/oracle/tests/requests.rs

use super::*;
use oracle_api::vm::to_executor_gas;
use oracle_test_utils::{assert_err_code, assert_ok};
use oracle_types::app::{ResolveStatus, ValidatorStatus};

fn expiring_in(blocks: u64) -> OracleParams {
    OracleParams {
        expiration_block_count: blocks,
        ..OracleParams::default()
    }
}

fn resolved(events: &[OracleEvent], id: RequestId) -> Option<(ResolveStatus, Option<String>)> {
    events.iter().find_map(|e| match e {
        OracleEvent::Resolved {
            request_id,
            status,
            reason,
            ..
        } if *request_id == id => Some((*status, reason.clone())),
        _ => None,
    })
}

#[tokio::test]
async fn request_resolves_at_the_end_of_the_block_that_reaches_quorum() {
    let mut h = Harness::new();
    let id = assert_ok!(h.submit(h.price_request(4, 2)));
    assert_eq!(id, 1);
    assert_eq!(h.balance(&h.payer), 1_000 - 2 * DS_FEE * 4);
    assert_eq!(h.balance(&data_provider_pool()), 2 * DS_FEE * 4);

    let validators = h.requested(id);
    assert_eq!(validators.len(), 4);
    let mut sorted = validators.clone();
    sorted.sort();
    let mut all = h.validators.clone();
    all.sort();
    assert_eq!(sorted, all);

    assert_ok!(h.report(id, validators[0]));
    assert!(store::pending_resolve_list(&h.state).unwrap().is_empty());
    assert_ok!(h.report(id, validators[1]));
    assert_ok!(h.report(id, validators[2]));
    assert_eq!(store::pending_resolve_list(&h.state).unwrap(), vec![id]);
    assert!(!store::has_result(&h.state, id).unwrap());

    let events = assert_ok!(h.end_block().await);
    assert_eq!(resolved(&events, id), Some((ResolveStatus::Success, None)));
    let result = store::get_result(&h.state, id).unwrap();
    assert_eq!(result.resolve_status, ResolveStatus::Success);
    assert_eq!(result.result, b"100".to_vec());
    assert_eq!(result.ans_count, 3);
    assert_eq!(result.request_time, time_at(2));
    assert_eq!(result.resolve_time, time_at(2));
    assert_eq!(result.client_id, "alice-client");
    assert!(store::pending_resolve_list(&h.state).unwrap().is_empty());

    let execute = h.executor.calls().into_iter().last().unwrap();
    assert_eq!(execute.phase, "execute");
    assert_eq!(
        execute.gas_limit,
        to_executor_gas(h.service.params().base_owasm_gas + 1_000)
    );

    // Two reports of 2 × 3 bytes reached quorum, paid at one unit per byte.
    assert_eq!(h.balance(&h.owner), 12);
    assert_eq!(h.balance(&data_provider_pool()), 40 - 12);
    assert!(store::provider_rewards(&h.state).unwrap().is_empty());
}

#[tokio::test]
async fn reports_after_resolution_are_kept_but_marked_late() {
    let mut h = Harness::new();
    let id = assert_ok!(h.submit(h.price_request(3, 1)));
    let validators = h.requested(id);
    assert_ok!(h.report(id, validators[0]));
    assert_ok!(h.end_block().await);

    assert_ok!(h.report(id, validators[1]));
    let reports = store::get_reports(&h.state, id).unwrap();
    assert_eq!(reports.len(), 2);
    for report in reports {
        assert_eq!(report.in_before_resolve, report.validator == validators[0]);
    }
    assert!(store::pending_resolve_list(&h.state).unwrap().is_empty());

    let events = assert_ok!(h.end_block().await);
    assert_eq!(resolved(&events, id), None);
    assert_eq!(store::get_result(&h.state, id).unwrap().ans_count, 1);
}

#[tokio::test]
async fn report_checks_run_in_order() {
    let mut h = Harness::new();
    let id = assert_ok!(h.submit(h.price_request(2, 2)));
    let validators = h.requested(id);
    let outsider = h
        .validators
        .iter()
        .copied()
        .find(|v| !validators.contains(v))
        .unwrap();

    assert_err_code!(h.report(99, validators[0]), "ORACLE_REQUEST_NOT_FOUND");
    assert_err_code!(h.report(id, outsider), "ORACLE_VALIDATOR_NOT_REQUESTED");
    assert_ok!(h.report(id, validators[0]));
    assert_err_code!(
        h.report(id, validators[0]),
        "ORACLE_VALIDATOR_ALREADY_REPORTED"
    );

    let mut ctx = h.ctx(validators[1]);
    let short = ReportDataParams {
        request_id: id,
        validator: validators[1],
        raw_reports: vec![RawReport {
            external_id: 1,
            exit_code: 0,
            data: vec![],
        }],
    };
    assert_err_code!(
        h.service.report_data(&mut h.state, short, &mut ctx),
        "ORACLE_INVALID_REPORT_SIZE"
    );
    let unknown = ReportDataParams {
        request_id: id,
        validator: validators[1],
        raw_reports: vec![
            RawReport {
                external_id: 1,
                exit_code: 0,
                data: vec![],
            },
            RawReport {
                external_id: 7,
                exit_code: 0,
                data: vec![],
            },
        ],
    };
    assert_err_code!(
        h.service.report_data(&mut h.state, unknown, &mut ctx),
        "ORACLE_RAW_REQUEST_NOT_FOUND"
    );
    assert!(ctx.events.is_empty());
    assert_eq!(store::report_count(&h.state, id).unwrap(), 1);
}

#[tokio::test]
async fn stale_request_expires_and_deactivates_validators_that_did_not_report() {
    let mut h = Harness::with(expiring_in(3), RecordingRelay::new());
    let id = assert_ok!(h.submit(h.price_request(4, 3)));
    let validators = h.requested(id);
    assert_ok!(h.report(id, validators[0]));

    for _ in 2..5 {
        let events = assert_ok!(h.end_block().await);
        assert_eq!(resolved(&events, id), None);
    }
    assert_eq!(store::request_last_expired(&h.state).unwrap(), 0);

    let events = assert_ok!(h.end_block().await);
    assert_eq!(resolved(&events, id), Some((ResolveStatus::Expired, None)));
    let result = store::get_result(&h.state, id).unwrap();
    assert_eq!(result.resolve_status, ResolveStatus::Expired);
    assert_eq!(result.ans_count, 1);
    assert!(result.result.is_empty());

    let deactivated: Vec<AccountId> = events
        .iter()
        .filter_map(|e| match e {
            OracleEvent::ValidatorDeactivated { validator } => Some(*validator),
            _ => None,
        })
        .collect();
    assert_eq!(deactivated, validators[1..].to_vec());
    assert!(store::validator_status(&h.state, &validators[0])
        .unwrap()
        .is_active);
    for validator in &validators[1..] {
        assert_eq!(
            store::validator_status(&h.state, validator).unwrap(),
            ValidatorStatus {
                is_active: false,
                since: time_at(2),
            }
        );
    }

    assert!(store::get_request(&h.state, id).unwrap().is_none());
    assert_eq!(store::report_count(&h.state, id).unwrap(), 0);
    assert_eq!(store::request_last_expired(&h.state).unwrap(), id);
    assert_err_code!(
        h.report(id, validators[0]),
        "ORACLE_REQUEST_ALREADY_EXPIRED"
    );

    // Only one validator is still eligible.
    assert_err_code!(
        h.submit(h.price_request(2, 1)),
        "ORACLE_INSUFFICIENT_VALIDATORS"
    );

    let mut ctx = h.ctx(validators[1]);
    assert_err_code!(
        h.service.activate(&mut h.state, &mut ctx),
        "ORACLE_TOO_SOON_TO_ACTIVATE"
    );
    h.height += h.service.params().inactive_penalty_duration / BLOCK_TIME;
    let mut ctx = h.ctx(validators[1]);
    assert_ok!(h.service.activate(&mut h.state, &mut ctx));
    assert_eq!(
        ctx.events,
        vec![OracleEvent::ValidatorActivated {
            validator: validators[1]
        }]
    );
}

#[tokio::test]
async fn sweep_stops_at_the_first_request_that_has_not_expired() {
    let mut h = Harness::with(expiring_in(3), RecordingRelay::new());
    let first = assert_ok!(h.submit(h.price_request(2, 1)));
    let (reporter, absent) = (h.requested(first)[0], h.requested(first)[1]);
    assert_ok!(h.report(first, reporter));
    assert_ok!(h.end_block().await); // height 2 resolves the first request

    let second = assert_ok!(h.submit(h.price_request(2, 2)));
    assert_ok!(h.end_block().await); // 3
    assert_ok!(h.end_block().await); // 4
    assert_eq!(store::request_last_expired(&h.state).unwrap(), 0);

    let events = assert_ok!(h.end_block().await); // 5
    assert_eq!(store::request_last_expired(&h.state).unwrap(), first);
    assert!(store::get_request(&h.state, first).unwrap().is_none());
    assert!(store::get_request(&h.state, second).unwrap().is_some());
    assert_eq!(resolved(&events, first), None);
    assert_eq!(
        store::get_result(&h.state, first).unwrap().resolve_status,
        ResolveStatus::Success
    );
    assert!(events.contains(&OracleEvent::ValidatorDeactivated { validator: absent }));
    assert!(!store::validator_status(&h.state, &absent).unwrap().is_active);
    assert!(store::validator_status(&h.state, &reporter).unwrap().is_active);

    let events = assert_ok!(h.end_block().await); // 6
    assert_eq!(store::request_last_expired(&h.state).unwrap(), second);
    assert_eq!(resolved(&events, second), Some((ResolveStatus::Expired, None)));

    assert_ok!(h.end_block().await);
    assert_eq!(store::request_last_expired(&h.state).unwrap(), second);
}

#[tokio::test]
async fn fee_limit_violation_rolls_back_the_whole_request() {
    let mut h = Harness::new();
    let mut params = h.price_request(2, 1);
    params.fee_limit = Coins::single(DENOM, 15);

    let mut ctx = h.ctx(h.payer);
    let err = h.service.request_data(&mut h.state, params, &mut ctx);
    assert!(matches!(
        err,
        Err(TransactionError::Oracle(OracleError::NotEnoughFee {
            required: 20,
            limit: 15,
            ..
        }))
    ));
    assert!(ctx.events.is_empty());
    assert_eq!(h.balance(&h.payer), 1_000);
    assert_eq!(h.balance(&data_provider_pool()), 0);
    assert_eq!(store::request_count(&h.state).unwrap(), 0);
}

#[tokio::test]
async fn running_out_of_gas_after_collecting_fees_rolls_back() {
    let mut h = Harness::new();
    let cfg = h.service.params().clone();
    let needed = 2 * cfg.per_validator_request_gas + 2 * (cfg.base_owasm_gas + 1_000);

    let mut ctx = TxContext::new(h.height, time_at(h.height), CHAIN, h.payer, needed - 1);
    let before = h.state.clone();
    let params = h.price_request(2, 1);
    assert_err_code!(
        h.service.request_data(&mut h.state, params.clone(), &mut ctx),
        "TX_OUT_OF_GAS"
    );
    assert!(ctx.events.is_empty());
    assert_eq!(h.state, before);
    assert_eq!(h.executor.calls().last().unwrap().phase, "prepare");

    let mut ctx = TxContext::new(h.height, time_at(h.height), CHAIN, h.payer, needed);
    assert_ok!(h.service.request_data(&mut h.state, params, &mut ctx));
    assert_eq!(ctx.gas.consumed(), needed);
}

#[tokio::test]
async fn executor_failures_resolve_as_failure() {
    let mut h = Harness::new();
    let mut broken = h.price_request(1, 1);
    broken.oracle_script_id = 2;
    let mut silent = h.price_request(1, 1);
    silent.oracle_script_id = 3;
    let broken = assert_ok!(h.submit(broken));
    let silent = assert_ok!(h.submit(silent));
    for id in [broken, silent] {
        let validator = h.requested(id)[0];
        assert_ok!(h.report(id, validator));
    }

    let events = assert_ok!(h.end_block().await);
    assert_eq!(
        resolved(&events, broken),
        Some((ResolveStatus::Failure, Some("runtime error: boom".into())))
    );
    assert_eq!(
        resolved(&events, silent),
        Some((ResolveStatus::Failure, Some("no return data".into())))
    );
    for id in [broken, silent] {
        let result = store::get_result(&h.state, id).unwrap();
        assert_eq!(result.resolve_status, ResolveStatus::Failure);
        assert!(result.result.is_empty());
    }
}

#[tokio::test]
async fn reporters_can_report_for_the_validator_that_granted_them() {
    let mut h = Harness::new();
    let id = assert_ok!(h.submit(h.price_request(2, 2)));
    let validators = h.requested(id);
    let feeder = account("feeder");

    assert_err_code!(
        h.report_as(feeder, id, validators[0]),
        "ORACLE_REPORTER_NOT_AUTHORIZED"
    );
    let mut ctx = h.ctx(validators[0]);
    assert_ok!(h.service.add_reporter(
        &mut h.state,
        ReporterParams { reporter: feeder },
        &mut ctx
    ));
    assert_ok!(h.report_as(feeder, id, validators[0]));
    assert_err_code!(
        h.report_as(feeder, id, validators[1]),
        "ORACLE_REPORTER_NOT_AUTHORIZED"
    );

    let mut ctx = h.ctx(validators[0]);
    assert_ok!(h.service.remove_reporter(
        &mut h.state,
        ReporterParams { reporter: feeder },
        &mut ctx
    ));
    let next = assert_ok!(h.submit(h.price_request(4, 1)));
    assert_err_code!(
        h.report_as(feeder, next, validators[0]),
        "ORACLE_REPORTER_NOT_AUTHORIZED"
    );
}

#[tokio::test]
async fn channel_requests_are_answered_on_their_channel() {
    let mut h = Harness::with(expiring_in(2), RecordingRelay::new());
    let answered = assert_ok!(h.submit_from_channel(h.channel_request(2, 1)));
    let unanswered = assert_ok!(h.submit_from_channel(h.channel_request(2, 2)));
    let validator = h.requested(answered)[0];
    assert_ok!(h.report(answered, validator));
    assert_eq!(h.balance(&h.payer), 1_000 - 2 * (2 * DS_FEE * 2));

    assert_ok!(h.end_block().await); // 2
    let sent = h.relay.sent();
    assert_eq!(sent.len(), 1);
    let (channel, packet) = &sent[0];
    assert_eq!(channel, &IbcChannel::new("oracle", "channel-0"));
    assert_eq!(packet.request_id, answered);
    assert_eq!(packet.client_id, "counterparty-7");
    assert_eq!(packet.ans_count, 1);
    assert_eq!(packet.resolve_status, ResolveStatus::Success);
    assert_eq!(packet.result, b"100".to_vec());

    assert_ok!(h.end_block().await); // 3
    assert_ok!(h.end_block().await); // 4 expires both
    let sent = h.relay.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].1.request_id, unanswered);
    assert_eq!(sent[1].1.resolve_status, ResolveStatus::Expired);
    assert!(sent[1].1.result.is_empty());
}

#[tokio::test]
async fn failing_relay_halts_the_block_without_committing() {
    let mut h = Harness::with(OracleParams::default(), RecordingRelay::failing());
    let id = assert_ok!(h.submit_from_channel(h.channel_request(1, 1)));
    let validator = h.requested(id)[0];
    assert_ok!(h.report(id, validator));

    let before = h.state.clone();
    let err = h.end_block().await;
    assert!(matches!(
        err,
        Err(FatalError::RelayFailed { request_id: 1, ref channel, .. }) if channel == "oracle/channel-0"
    ));
    assert_eq!(h.state, before);
    assert_eq!(store::pending_resolve_list(&h.state).unwrap(), vec![id]);
}

#[tokio::test]
async fn channel_requests_can_be_disabled() {
    let params = OracleParams {
        ibc_request_enabled: false,
        ..OracleParams::default()
    };
    let mut h = Harness::with(params, RecordingRelay::new());
    assert_err_code!(
        h.submit_from_channel(h.channel_request(1, 1)),
        "ORACLE_IBC_REQUEST_DISABLED"
    );
    assert_ok!(h.submit(h.price_request(1, 1)));
}
