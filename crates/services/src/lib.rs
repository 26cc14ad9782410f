// Path: crates/services/src/lib.rs
#![forbid(unsafe_code)]
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

//! # Oracle Engine Services
//!
//! The on-chain oracle service. It admits data requests, assigns a weighted random
//! subset of validators to each, collects their reports, resolves requests through
//! the sandboxed executor and settles data-source fees and data-provider rewards.

pub mod oracle;
