// Path: crates/api/src/lib.rs

//! # Oracle Engine API Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]
//! # Oracle Engine API
//!
//! Core traits and interfaces for the oracle data-request engine. This crate
//! defines the stable contract between the oracle service and the external
//! collaborators it is driven by: the state store, the script executor, the
//! token ledger, the validator set, the blob cache and the packet relay.

/// Defines the `Bank` trait for token transfers.
pub mod bank;
/// Re-exports all core error types from the central `oracle-types` crate.
pub mod error;
/// Defines the `PacketRelay` trait for cross-chain responses.
pub mod ibc;
/// Defines traits for services that hook into the block processing lifecycle.
pub mod lifecycle;
/// Traits for pluggable blockchain services.
pub mod services;
/// Core traits for state management, including `StateAccess` and `StateOverlay`.
pub mod state;
/// A content-addressed blob cache for executables and compiled scripts.
pub mod storage;
/// Defines the transaction context and gas metering.
pub mod transaction;
/// Defines the read-only view of the bonded validator set.
pub mod validator;
/// Defines the sandboxed script executor and its host environments.
pub mod vm;

/// A curated set of the most commonly used traits and types.
pub mod prelude {
    pub use crate::bank::Bank;
    pub use crate::error::{
        ErrorCode, ExecutorError, FatalError, OracleError, StateError, TransactionError,
    };
    pub use crate::ibc::PacketRelay;
    pub use crate::lifecycle::OnEndBlock;
    pub use crate::services::BlockchainService;
    pub use crate::state::{StateAccess, StateAccessExt, StateOverlay};
    pub use crate::storage::BlobCache;
    pub use crate::transaction::context::TxContext;
    pub use crate::transaction::gas::GasMeter;
    pub use crate::validator::ValidatorSetView;
    pub use crate::vm::{ExecuteEnv, Executor, PrepareEnv};
}
