//! In-memory implementations of the oracle engine's collaborators.

mod bank;
mod blobs;
mod executor;
mod relay;
mod validators;

pub use bank::StateLedger;
pub use blobs::MemoryBlobCache;
pub use executor::{ExecuteScript, ExecutorCall, PrepareScript, ScriptedExecutor};
pub use relay::RecordingRelay;
pub use validators::StaticValidatorSet;

use oracle_types::app::AccountId;
use sha2::{Digest, Sha256};

/// A deterministic account derived from a human-readable label.
pub fn account(label: &str) -> AccountId {
    AccountId(Sha256::digest(label.as_bytes()).into())
}
