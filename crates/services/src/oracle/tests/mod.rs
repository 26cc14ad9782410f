// Path: crates/services/src/oracle/tests/mod.rs
//! Service-level tests driving the oracle through its public entry points and the
//! end-block hook, against in-memory collaborators.

mod requests;

use super::*;
use oracle_api::prelude::{ExecuteEnv, PrepareEnv};
use oracle_test_utils::{
    account, assert_ok, MemoryBlobCache, MemoryState, RecordingRelay, ScriptedExecutor,
    StateLedger, StaticValidatorSet,
};
use oracle_types::app::{ChainId, OracleEvent, RawReport};
use oracle_types::error::ExecutorError;

const T0: u64 = 1_700_000_000_000_000_000;
const BLOCK_TIME: u64 = 5_000_000_000;
const CHAIN: ChainId = ChainId(1);
const GAS_LIMIT: u64 = 5_000_000;
const DENOM: &str = "uband";
const DS_FEE: u128 = 5;

const PRICE_SCRIPT: &[u8] = b"price-script";
const BROKEN_SCRIPT: &[u8] = b"broken-script";
const SILENT_SCRIPT: &[u8] = b"silent-script";

fn time_at(height: u64) -> u64 {
    T0 + height * BLOCK_TIME
}

/// Asks data sources 1 and 2 with the request calldata.
fn ask_prices(env: &mut PrepareEnv<'_>) -> Result<u64, ExecutorError> {
    let calldata = env.calldata().to_vec();
    env.ask_external_data(1, 1, calldata.clone())?;
    env.ask_external_data(2, 2, calldata)?;
    Ok(1_000)
}

/// Returns the first reported answer to external id 1.
fn first_price(env: &mut ExecuteEnv<'_>) -> Result<u64, ExecutorError> {
    let mut answer = None;
    for index in 0..env.ask_count() as usize {
        if let Some(data) = env.get_external_data(1, index)? {
            answer = Some(data.to_vec());
            break;
        }
    }
    env.set_return_data(answer.unwrap_or_default())?;
    Ok(2_100)
}

fn build_service(
    params: OracleParams,
    executor: Arc<ScriptedExecutor>,
    powers: &[(AccountId, u64)],
    relay: Arc<RecordingRelay>,
) -> Result<OracleService, FatalError> {
    OracleService::new(
        params,
        executor,
        Arc::new(StateLedger::new()),
        Arc::new(StaticValidatorSet::from_powers(powers)),
        Arc::new(MemoryBlobCache::new()),
        relay,
    )
}

struct Harness {
    service: OracleService,
    state: MemoryState,
    ledger: StateLedger,
    executor: Arc<ScriptedExecutor>,
    relay: Arc<RecordingRelay>,
    validators: Vec<AccountId>,
    owner: AccountId,
    payer: AccountId,
    height: u64,
}

impl Harness {
    fn new() -> Self {
        Self::with(OracleParams::default(), RecordingRelay::new())
    }

    /// Four active validators of equal power, data sources 1 and 2 charging
    /// `DS_FEE` each, oracle scripts 1 (price), 2 (broken) and 3 (silent), and a
    /// funded payer. Setup happens at height 1; the harness starts at height 2.
    fn with(params: OracleParams, relay: RecordingRelay) -> Self {
        let validators: Vec<AccountId> = (0..4)
            .map(|i| account(&format!("validator-{}", i)))
            .collect();
        let powers: Vec<(AccountId, u64)> = validators.iter().map(|v| (*v, 100)).collect();
        let executor = Arc::new(
            ScriptedExecutor::new()
                .with_script(PRICE_SCRIPT, ask_prices, first_price)
                .with_script(BROKEN_SCRIPT, ask_prices, |_env| {
                    Err(ExecutorError::Runtime("boom".into()))
                })
                .with_script(SILENT_SCRIPT, ask_prices, |_env| Ok(10)),
        );
        let relay = Arc::new(relay);
        let service = build_service(params, executor.clone(), &powers, relay.clone())
            .expect("harness params are valid");

        let mut h = Self {
            service,
            state: MemoryState::new(),
            ledger: StateLedger::new(),
            executor,
            relay,
            validators,
            owner: account("owner"),
            payer: account("alice"),
            height: 1,
        };

        for validator in h.validators.clone() {
            let mut ctx = h.ctx(validator);
            assert_ok!(h.service.activate(&mut h.state, &mut ctx));
        }
        assert_ok!(h
            .ledger
            .mint(&mut h.state, &h.payer, &Coins::single(DENOM, 1_000)));
        for name in ["coingecko", "binance"] {
            let mut ctx = h.ctx(h.owner);
            let params = CreateDataSourceParams {
                owner: h.owner,
                name: name.into(),
                description: String::new(),
                executable: format!("#!/bin/sh\necho {}", name).into_bytes(),
                fee: Coins::single(DENOM, DS_FEE),
            };
            assert_ok!(h.service.create_data_source(&mut h.state, params, &mut ctx));
        }
        for code in [PRICE_SCRIPT, BROKEN_SCRIPT, SILENT_SCRIPT] {
            let mut ctx = h.ctx(h.owner);
            let params = CreateOracleScriptParams {
                owner: h.owner,
                name: String::from_utf8_lossy(code).into_owned(),
                description: String::new(),
                schema: "{symbol:string}/{px:u64}".into(),
                source_code_url: String::new(),
                code: code.to_vec(),
            };
            assert_ok!(h.service.create_oracle_script(&mut h.state, params, &mut ctx));
        }
        h.height = 2;
        h
    }

    fn ctx(&self, signer: AccountId) -> TxContext {
        TxContext::new(self.height, time_at(self.height), CHAIN, signer, GAS_LIMIT)
    }

    fn price_request(&self, ask_count: u64, min_count: u64) -> RequestDataParams {
        RequestDataParams {
            oracle_script_id: 1,
            calldata: b"BTC".to_vec(),
            ask_count,
            min_count,
            client_id: "alice-client".into(),
            fee_limit: Coins::single(DENOM, 1_000),
            prepare_gas: 1_000,
            execute_gas: 1_000,
        }
    }

    fn channel_request(&self, ask_count: u64, min_count: u64) -> ChannelRequestParams {
        ChannelRequestParams {
            packet: OracleRequestPacket {
                client_id: "counterparty-7".into(),
                oracle_script_id: 1,
                calldata: b"ETH".to_vec(),
                ask_count,
                min_count,
                fee_limit: Coins::single(DENOM, 1_000),
                prepare_gas: 1_000,
                execute_gas: 1_000,
            },
            channel: IbcChannel::new("oracle", "channel-0"),
        }
    }

    fn submit(&mut self, params: RequestDataParams) -> Result<RequestId, TransactionError> {
        let mut ctx = self.ctx(self.payer);
        self.service.request_data(&mut self.state, params, &mut ctx)
    }

    fn submit_from_channel(
        &mut self,
        params: ChannelRequestParams,
    ) -> Result<RequestId, TransactionError> {
        let mut ctx = self.ctx(self.payer);
        self.service
            .request_from_channel(&mut self.state, params, &mut ctx)
    }

    fn report(&mut self, id: RequestId, validator: AccountId) -> Result<(), TransactionError> {
        self.report_as(validator, id, validator)
    }

    fn report_as(
        &mut self,
        signer: AccountId,
        id: RequestId,
        validator: AccountId,
    ) -> Result<(), TransactionError> {
        let raw = |external_id| RawReport {
            external_id,
            exit_code: 0,
            data: b"100".to_vec(),
        };
        let params = ReportDataParams {
            request_id: id,
            validator,
            raw_reports: vec![raw(1), raw(2)],
        };
        let mut ctx = self.ctx(signer);
        self.service.report_data(&mut self.state, params, &mut ctx)
    }

    fn requested(&self, id: RequestId) -> Vec<AccountId> {
        store::must_get_request(&self.state, id)
            .unwrap()
            .requested_validators
    }

    /// Runs the end-block hook at the current height, then advances one block.
    async fn end_block(&mut self) -> Result<Vec<OracleEvent>, FatalError> {
        let mut ctx = TxContext::internal(self.height, time_at(self.height), CHAIN);
        let result = self.service.on_end_block(&mut self.state, &mut ctx).await;
        self.height += 1;
        result.map(|()| ctx.events)
    }

    fn balance(&self, account: &AccountId) -> u128 {
        self.ledger.balance(&self.state, account, DENOM).unwrap()
    }
}
