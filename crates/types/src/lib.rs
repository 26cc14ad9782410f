// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
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

//! # Oracle Engine Types
//!
//! This crate is the foundational library for the oracle data-request engine,
//! containing all core data structures, error types, and configuration objects.
//!
//! ## Architectural Role
//!
//! As the base crate, `oracle-types` has minimal dependencies and is itself a
//! dependency for every other crate in the workspace. This structure prevents
//! circular dependencies and provides a stable, canonical definition for shared
//! types like `Request`, `OracleResult`, `AccountId`, `Coins` and the error enums.

/// The maximum size in bytes for a value read from state during consensus.
pub const MAX_STATE_VALUE_BYTES: usize = 256 * 1024; // 256 KiB

/// Core application-level data structures: requests, reports, results, coins and events.
pub mod app;
/// The canonical, deterministic binary codec for consensus-critical state.
pub mod codec;
/// A unified set of all error types used across the engine.
pub mod error;
/// Packet structures for cross-chain oracle requests and responses.
pub mod ibc;
/// Constants and builders for the state keys owned by the oracle engine.
pub mod keys;
/// A prelude containing useful extension traits like `OptionExt`.
pub mod prelude;
/// Configuration structures for the oracle service.
pub mod service_configs;
