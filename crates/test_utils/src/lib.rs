// Path: crates/test_utils/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Oracle Engine Test Utilities
//!
//! In-memory implementations of the collaborators the oracle service is driven by,
//! plus assertion macros and deterministic randomness for reproducible tests.

pub mod assertions;
pub mod mocks;
pub mod randomness;
pub mod state;

pub use mocks::{
    account, MemoryBlobCache, RecordingRelay, ScriptedExecutor, StateLedger, StaticValidatorSet,
};
pub use randomness::TestRng;
pub use state::MemoryState;
