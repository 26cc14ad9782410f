//! Deterministic randomness for reproducible tests

use oracle_types::app::{AccountId, ValidatorPower};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Deterministic random number generator for tests
pub struct TestRng {
    /// Internal RNG with fixed seed
    rng: StdRng,
}

impl TestRng {
    /// Create a new test RNG with the specified seed
    pub fn new(seed: u64) -> Self {
        // The u64 seed occupies the first 8 bytes of the 32-byte seed array.
        let mut seed_array = [0u8; 32];
        for (dst, src) in seed_array.iter_mut().zip(seed.to_le_bytes()) {
            *dst = src;
        }

        Self {
            rng: StdRng::from_seed(seed_array),
        }
    }

    /// Create a test RNG with the default seed 12345
    pub fn with_default_seed() -> Self {
        Self::new(12345)
    }

    /// Fill a buffer with random bytes
    pub fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }

    /// Generate a random value
    pub fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    /// Generate a random value
    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Generate a random account
    pub fn account(&mut self) -> AccountId {
        let mut bytes = [0u8; 32];
        self.rng.fill_bytes(&mut bytes);
        AccountId(bytes)
    }

    /// Generate `n` validators with distinct accounts and powers in `1..=max_power`
    pub fn validators(&mut self, n: usize, max_power: u64) -> Vec<ValidatorPower> {
        (0..n)
            .map(|_| ValidatorPower {
                account: self.account(),
                power: self.rng.gen_range(1..=max_power.max(1)),
            })
            .collect()
    }
}

// Implement Default trait instead of just a method named default
impl Default for TestRng {
    fn default() -> Self {
        Self::with_default_seed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = TestRng::new(7);
        let mut b = TestRng::new(7);
        assert_eq!(a.next_u64(), b.next_u64());
        assert_eq!(a.validators(3, 10), b.validators(3, 10));
        assert_ne!(TestRng::new(8).next_u64(), TestRng::new(7).next_u64());
    }
}
