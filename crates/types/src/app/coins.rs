// Path: crates/types/src/app/coins.rs

//! Multi-denomination token amounts.

use parity_scale_codec::{Decode, Encode, Input};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A single denomination and amount.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Coin {
    /// The denomination, e.g. `"uband"`.
    pub denom: String,
    /// The amount in whole units of `denom`.
    pub amount: u128,
}

/// A set of coins keyed by denomination.
///
/// Zero amounts are never stored, so two `Coins` values are equal exactly when
/// they hold the same non-zero amounts. The `BTreeMap` gives a canonical encoding.
#[derive(Encode, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Coins(BTreeMap<String, u128>);

impl Decode for Coins {
    fn decode<I: Input>(input: &mut I) -> Result<Self, parity_scale_codec::Error> {
        BTreeMap::<String, u128>::decode(input).map(Self::from_map)
    }
}

impl<'de> Deserialize<'de> for Coins {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<String, u128>::deserialize(deserializer).map(Self::from_map)
    }
}

impl Coins {
    fn from_map(mut map: BTreeMap<String, u128>) -> Self {
        map.retain(|_, amount| *amount != 0);
        Self(map)
    }

    /// Creates an empty set of coins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from `(denom, amount)` pairs, summing repeated denominations.
    pub fn from_pairs(pairs: &[(&str, u128)]) -> Self {
        let mut coins = Self::new();
        for (denom, amount) in pairs {
            let current = coins.amount_of(denom);
            coins.set(denom, current.saturating_add(*amount));
        }
        coins
    }

    /// A set holding a single denomination.
    pub fn single(denom: &str, amount: u128) -> Self {
        let mut coins = Self::new();
        coins.set(denom, amount);
        coins
    }

    fn set(&mut self, denom: &str, amount: u128) {
        if amount == 0 {
            self.0.remove(denom);
        } else {
            self.0.insert(denom.to_string(), amount);
        }
    }

    /// Returns the amount held of `denom`, or zero.
    pub fn amount_of(&self, denom: &str) -> u128 {
        self.0.get(denom).copied().unwrap_or(0)
    }

    /// True if no denomination holds a non-zero amount.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(denom, amount)` pairs in denomination order.
    pub fn iter(&self) -> impl Iterator<Item = Coin> + '_ {
        self.0.iter().map(|(denom, amount)| Coin {
            denom: denom.clone(),
            amount: *amount,
        })
    }

    /// Adds `other` to `self`, returning `None` on overflow.
    pub fn checked_add(&self, other: &Coins) -> Option<Coins> {
        let mut out = self.clone();
        for (denom, amount) in &other.0 {
            let sum = out.amount_of(denom).checked_add(*amount)?;
            out.set(denom, sum);
        }
        Some(out)
    }

    /// Multiplies every amount by `factor`, returning `None` on overflow.
    pub fn checked_mul(&self, factor: u64) -> Option<Coins> {
        let mut out = Coins::new();
        for (denom, amount) in &self.0 {
            out.set(denom, amount.checked_mul(u128::from(factor))?);
        }
        Some(out)
    }

    /// Returns the first denomination in which `self` exceeds `limit`, if any.
    pub fn first_exceeding(&self, limit: &Coins) -> Option<Coin> {
        self.iter().find(|c| c.amount > limit.amount_of(&c.denom))
    }
}
