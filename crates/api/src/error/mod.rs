// Path: crates/api/src/error/mod.rs
// Re-export all core error types from the central types crate.
pub use oracle_types::error::{
    ErrorCode, ExecutorError, FatalError, OracleError, StateError, TransactionError,
};
