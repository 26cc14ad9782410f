// Path: crates/api/src/transaction/mod.rs
//! Defines the per-call transaction context and gas metering.

pub mod context;
pub mod gas;
