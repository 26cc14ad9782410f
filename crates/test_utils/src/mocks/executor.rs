//! An `Executor` whose scripts are Rust closures keyed by their code bytes.

use oracle_api::vm::{ExecuteEnv, ExecutionOutput, Executor, PrepareEnv};
use oracle_types::error::ExecutorError;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

/// The prepare phase of a scripted oracle script. Returns the executor gas used.
pub type PrepareScript =
    Arc<dyn Fn(&mut PrepareEnv<'_>) -> Result<u64, ExecutorError> + Send + Sync>;
/// The execute phase of a scripted oracle script. Returns the executor gas used.
pub type ExecuteScript =
    Arc<dyn Fn(&mut ExecuteEnv<'_>) -> Result<u64, ExecutorError> + Send + Sync>;

#[derive(Clone)]
struct Script {
    prepare: PrepareScript,
    execute: ExecuteScript,
}

/// One recorded call into the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorCall {
    /// `"prepare"` or `"execute"`
    pub phase: &'static str,
    /// The executor gas limit passed in
    pub gas_limit: u64,
    /// The maximum output size passed in
    pub max_output_size: usize,
}

/// Runs registered closures in place of compiled scripts.
///
/// `compile` accepts only registered code and returns it unchanged, so the
/// compiled bytes stored by the service look up the same closures later.
#[derive(Default)]
pub struct ScriptedExecutor {
    scripts: Mutex<BTreeMap<Vec<u8>, Script>>,
    calls: Mutex<Vec<ExecutorCall>>,
}

impl ScriptedExecutor {
    /// Create an executor with no scripts
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the two phases of the script whose code is `code`
    pub fn with_script<P, E>(self, code: &[u8], prepare: P, execute: E) -> Self
    where
        P: Fn(&mut PrepareEnv<'_>) -> Result<u64, ExecutorError> + Send + Sync + 'static,
        E: Fn(&mut ExecuteEnv<'_>) -> Result<u64, ExecutorError> + Send + Sync + 'static,
    {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                code.to_vec(),
                Script {
                    prepare: Arc::new(prepare),
                    execute: Arc::new(execute),
                },
            );
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<ExecutorCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn script(&self, code: &[u8]) -> Result<Script, ExecutorError> {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(code)
            .cloned()
            .ok_or_else(|| ExecutorError::Runtime("unknown script".to_string()))
    }

    fn record(&self, phase: &'static str, gas_limit: u64, max_output_size: usize) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ExecutorCall {
                phase,
                gas_limit,
                max_output_size,
            });
    }
}

fn metered(gas_used: u64, gas_limit: u64) -> Result<ExecutionOutput, ExecutorError> {
    if gas_used > gas_limit {
        return Err(ExecutorError::OutOfGas);
    }
    Ok(ExecutionOutput { gas_used })
}

impl Executor for ScriptedExecutor {
    fn compile(&self, code: &[u8]) -> Result<Vec<u8>, ExecutorError> {
        if self
            .scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(code)
        {
            Ok(code.to_vec())
        } else {
            Err(ExecutorError::Compilation("invalid module".to_string()))
        }
    }

    fn prepare(
        &self,
        code: &[u8],
        gas_limit: u64,
        max_output_size: usize,
        env: &mut PrepareEnv<'_>,
    ) -> Result<ExecutionOutput, ExecutorError> {
        self.record("prepare", gas_limit, max_output_size);
        let script = self.script(code)?;
        metered((script.prepare)(env)?, gas_limit)
    }

    fn execute(
        &self,
        code: &[u8],
        gas_limit: u64,
        max_output_size: usize,
        env: &mut ExecuteEnv<'_>,
    ) -> Result<ExecutionOutput, ExecutorError> {
        self.record("execute", gas_limit, max_output_size);
        let script = self.script(code)?;
        metered((script.execute)(env)?, gas_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_types::app::{AccountId, Request};

    #[test]
    fn runs_registered_closures_and_meters_gas() {
        let exec = ScriptedExecutor::new().with_script(
            b"ask-one",
            |env| {
                let calldata = env.calldata().to_vec();
                env.ask_external_data(1, 1, calldata)?;
                Ok(50)
            },
            |_env| Ok(10),
        );
        assert!(exec.compile(b"ask-one").is_ok());
        assert!(matches!(
            exec.compile(b"other"),
            Err(ExecutorError::Compilation(_))
        ));

        let req = Request {
            oracle_script_id: 1,
            calldata: b"x".to_vec(),
            requested_validators: vec![AccountId([1; 32])],
            min_count: 1,
            request_height: 1,
            request_time: 0,
            client_id: String::new(),
            raw_requests: vec![],
            execute_gas: 1,
            ibc_channel: None,
        };
        let mut env = PrepareEnv::new(&req, 4, 16);
        let out = exec.prepare(b"ask-one", 100, 16, &mut env).unwrap();
        assert_eq!(out.gas_used, 50);
        assert_eq!(env.raw_requests().len(), 1);

        let mut env = PrepareEnv::new(&req, 4, 16);
        assert_eq!(
            exec.prepare(b"ask-one", 49, 16, &mut env),
            Err(ExecutorError::OutOfGas)
        );
        assert_eq!(exec.calls().len(), 2);
        assert_eq!(exec.calls()[1].gas_limit, 49);
    }
}
