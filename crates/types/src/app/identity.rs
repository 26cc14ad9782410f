// Path: crates/types/src/app/identity.rs

//! Defines the canonical `AccountId` and `ChainId` types.
//!
//! Validators, reporters, requesters and data-source owners are all identified by
//! an `AccountId`. Module-owned accounts (such as the data-provider pool) are derived
//! deterministically from their name so every replica agrees on the address.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A unique identifier for a blockchain, mixed into validator sampling entropy.
#[derive(
    Encode,
    Decode,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    Default,
    Hash,
)]
#[serde(transparent)] // Ensures JSON/TOML is just the raw u32
pub struct ChainId(pub u32);

impl From<u32> for ChainId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
impl From<ChainId> for u32 {
    fn from(c: ChainId) -> Self {
        c.0
    }
}

impl core::fmt::Display for ChainId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique, stable identifier for an on-chain account, represented as a 32-byte array.
#[derive(
    Encode,
    Decode,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    Default,
    Hash,
)]
pub struct AccountId(pub [u8; 32]);

impl AsRef<[u8]> for AccountId {
    /// Allows treating the `AccountId` as a byte slice.
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for AccountId {
    /// Allows creating an `AccountId` directly from a 32-byte array.
    fn from(hash: [u8; 32]) -> Self {
        Self(hash)
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Derives the account owned by a named module, e.g. `"oracle::data_provider_pool"`.
pub fn module_account(name: &str) -> AccountId {
    let digest = Sha256::new()
        .chain_update(b"module::")
        .chain_update(name.as_bytes())
        .finalize();
    AccountId(digest.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_accounts_are_stable_and_distinct() {
        let pool = module_account("oracle::data_provider_pool");
        assert_eq!(pool, module_account("oracle::data_provider_pool"));
        assert_ne!(pool, module_account("oracle::fee_collector"));
        assert_eq!(pool.to_string().len(), 64);
    }
}
