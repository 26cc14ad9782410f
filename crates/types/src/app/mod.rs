// Path: crates/types/src/app/mod.rs
//! Core application-level data structures of the oracle engine.

/// Multi-denomination token amounts.
pub mod coins;
/// Fixed-point decimal arithmetic.
pub mod decimal;
/// Data structures for oracle events.
pub mod events;
/// Data structures for on-chain identity, including the canonical AccountId.
pub mod identity;
/// Requests, reports, results and registry records.
pub mod oracle;

pub use coins::{Coin, Coins};
pub use decimal::Dec;
pub use events::*;
pub use identity::{module_account, AccountId, ChainId};
pub use oracle::*;
