// Path: crates/services/src/oracle/sampler.rs

//! Deterministic, power-weighted selection of the validators assigned to a request.
//!
//! Randomness comes from a SHA-256 counter stream seeded by the rolling seed, the
//! request id and the chain id. The same inputs always select the same validators.

use super::store;
use oracle_api::state::StateAccess;
use oracle_types::app::{AccountId, ChainId, RequestId, ValidatorPower};
use oracle_types::error::{OracleError, TransactionError};
use sha2::{Digest, Sha256};

/// A deterministic stream of `u64` words.
///
/// Word `i` is the first eight bytes of `sha256(seed ‖ i_be)`, read big-endian.
#[derive(Debug, Clone)]
pub struct SeedStream {
    seed: [u8; 32],
    counter: u64,
}

impl SeedStream {
    /// Seeds the stream with `sha256(rolling_seed ‖ request_id_be ‖ chain_id_be)`.
    pub fn new(rolling_seed: &[u8; 32], request_id: RequestId, chain_id: ChainId) -> Self {
        let seed = Sha256::new()
            .chain_update(rolling_seed)
            .chain_update(request_id.to_be_bytes())
            .chain_update(chain_id.0.to_be_bytes())
            .finalize();
        Self {
            seed: seed.into(),
            counter: 0,
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let digest = Sha256::new()
            .chain_update(self.seed)
            .chain_update(self.counter.to_be_bytes())
            .finalize();
        self.counter = self.counter.wrapping_add(1);
        let mut word = [0u8; 8];
        word.iter_mut()
            .zip(digest.iter())
            .for_each(|(dst, src)| *dst = *src);
        u64::from_be_bytes(word)
    }
}

/// Picks one index with probability proportional to its weight.
///
/// Returns `None` if the weights are empty or sum to zero.
pub fn choose_one(stream: &mut SeedStream, weights: &[u64]) -> Option<usize> {
    let total: u128 = weights.iter().map(|w| u128::from(*w)).sum();
    if total == 0 {
        return None;
    }
    let target = u128::from(stream.next_u64()) % total;
    let mut cumulative = 0u128;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += u128::from(*weight);
        if target < cumulative {
            return Some(index);
        }
    }
    None
}

/// Picks `size` distinct indices by successive elimination: each pick is removed
/// from the pool before the next draw.
pub fn choose_some(stream: &mut SeedStream, weights: &[u64], size: usize) -> Option<Vec<usize>> {
    let mut pool: Vec<(usize, u64)> = weights.iter().copied().enumerate().collect();
    let mut chosen = Vec::with_capacity(size);
    for _ in 0..size {
        let remaining: Vec<u64> = pool.iter().map(|(_, w)| *w).collect();
        let pick = choose_one(stream, &remaining)?;
        let (index, _) = pool.remove(pick);
        chosen.push(index);
    }
    Some(chosen)
}

/// Runs `choose_some` `tries` times on the same stream and keeps the subset with the
/// highest total weight. The earliest subset wins ties.
pub fn choose_some_max_weight(
    stream: &mut SeedStream,
    weights: &[u64],
    size: usize,
    tries: u64,
) -> Option<Vec<usize>> {
    let mut best: Option<(u128, Vec<usize>)> = None;
    for _ in 0..tries.max(1) {
        let subset = choose_some(stream, weights, size)?;
        let weight: u128 = subset
            .iter()
            .filter_map(|i| weights.get(*i))
            .map(|w| u128::from(*w))
            .sum();
        if best.as_ref().map_or(true, |(w, _)| weight > *w) {
            best = Some((weight, subset));
        }
    }
    best.map(|(_, subset)| subset)
}

/// Sorts validators by power descending, then account ascending.
pub fn canonical_order(mut validators: Vec<ValidatorPower>) -> Vec<ValidatorPower> {
    validators.sort_by(|a, b| b.power.cmp(&a.power).then_with(|| a.account.cmp(&b.account)));
    validators
}

/// Selects `size` distinct validators for request `request_id`.
///
/// Only validators that are active in the oracle and have positive power are
/// eligible.
pub fn sample(
    state: &dyn StateAccess,
    bonded: Vec<ValidatorPower>,
    size: u64,
    request_id: RequestId,
    chain_id: ChainId,
    tries: u64,
) -> Result<Vec<AccountId>, TransactionError> {
    let mut eligible = Vec::with_capacity(bonded.len());
    for validator in canonical_order(bonded) {
        if validator.power > 0 && store::validator_status(state, &validator.account)?.is_active {
            eligible.push(validator);
        }
    }
    let insufficient = || OracleError::InsufficientValidators {
        requested: size,
        available: eligible.len() as u64,
    };
    let wanted = usize::try_from(size).map_err(|_| insufficient())?;
    if wanted > eligible.len() {
        return Err(insufficient().into());
    }

    let weights: Vec<u64> = eligible.iter().map(|v| v.power).collect();
    let seed = store::rolling_seed(state)?;
    let mut stream = SeedStream::new(&seed, request_id, chain_id);
    let picks =
        choose_some_max_weight(&mut stream, &weights, wanted, tries).ok_or_else(insufficient)?;
    Ok(picks
        .into_iter()
        .filter_map(|i| eligible.get(i).map(|v| v.account))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_test_utils::{MemoryState, TestRng};
    use oracle_types::app::ValidatorStatus;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn activate_all(state: &mut MemoryState, validators: &[ValidatorPower]) {
        for v in validators {
            store::set_validator_status(
                state,
                &v.account,
                &ValidatorStatus {
                    is_active: true,
                    since: 0,
                },
            )
            .unwrap();
        }
    }

    fn validators(seed: u64, n: usize) -> Vec<ValidatorPower> {
        TestRng::new(seed).validators(n, 1_000)
    }

    #[test]
    fn stream_is_deterministic_per_input() {
        let seed = [7u8; 32];
        let mut a = SeedStream::new(&seed, 1, ChainId(1));
        let mut b = SeedStream::new(&seed, 1, ChainId(1));
        let mut c = SeedStream::new(&seed, 2, ChainId(1));
        let first = a.next_u64();
        assert_eq!(first, b.next_u64());
        assert_ne!(first, c.next_u64());
        assert_ne!(first, a.next_u64());
    }

    #[test]
    fn zero_weights_are_never_chosen() {
        let mut stream = SeedStream::new(&[0u8; 32], 1, ChainId(1));
        for _ in 0..64 {
            assert_eq!(choose_one(&mut stream, &[0, 5, 0]), Some(1));
        }
        assert_eq!(choose_one(&mut stream, &[0, 0]), None);
        assert_eq!(choose_one(&mut stream, &[]), None);
    }

    #[test]
    fn max_weight_keeps_the_heaviest_subset() {
        let weights = [100, 1, 1, 1];
        let mut stream = SeedStream::new(&[3u8; 32], 9, ChainId(2));
        let picked = choose_some_max_weight(&mut stream, &weights, 1, 8).unwrap();
        assert_eq!(picked, vec![0]);
    }

    #[test]
    fn canonical_order_breaks_power_ties_by_account() {
        let ordered = canonical_order(vec![
            ValidatorPower { account: AccountId([2; 32]), power: 5 },
            ValidatorPower { account: AccountId([3; 32]), power: 9 },
            ValidatorPower { account: AccountId([1; 32]), power: 5 },
        ]);
        let accounts: Vec<u8> = ordered.iter().map(|v| v.account.0[0]).collect();
        assert_eq!(accounts, vec![3, 1, 2]);
    }

    #[test]
    fn inactive_and_powerless_validators_are_ineligible() {
        let mut state = MemoryState::new();
        let active = validators(1, 3);
        activate_all(&mut state, &active);
        let mut bonded = active.clone();
        bonded.push(ValidatorPower { account: AccountId([0xee; 32]), power: 10_000 });
        bonded.push(ValidatorPower { account: AccountId([0xdd; 32]), power: 0 });
        store::set_validator_status(
            &mut state,
            &AccountId([0xdd; 32]),
            &ValidatorStatus { is_active: true, since: 0 },
        )
        .unwrap();

        let chosen = sample(&state, bonded.clone(), 3, 1, ChainId(1), 3).unwrap();
        let expected: BTreeSet<_> = active.iter().map(|v| v.account).collect();
        assert_eq!(chosen.iter().copied().collect::<BTreeSet<_>>(), expected);

        let err = sample(&state, bonded, 4, 1, ChainId(1), 3).unwrap_err();
        assert!(matches!(
            err,
            TransactionError::Oracle(OracleError::InsufficientValidators {
                requested: 4,
                available: 3
            })
        ));
    }

    proptest! {
        #[test]
        fn sample_is_sized_distinct_and_deterministic(
            seed in any::<u64>(),
            n in 1usize..20,
            size_frac in 0u64..=100,
            request_id in 1u64..1_000,
        ) {
            let mut state = MemoryState::new();
            let vals = validators(seed, n);
            activate_all(&mut state, &vals);
            let size = (n as u64 * size_frac) / 100;

            let first = sample(&state, vals.clone(), size, request_id, ChainId(1), 3).unwrap();
            prop_assert_eq!(first.len() as u64, size);
            let distinct: BTreeSet<_> = first.iter().collect();
            prop_assert_eq!(distinct.len(), first.len());

            let mut shuffled = vals.clone();
            shuffled.reverse();
            let second = sample(&state, shuffled, size, request_id, ChainId(1), 3).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn oversized_requests_fail(seed in any::<u64>(), n in 0usize..10, extra in 1u64..5) {
            let mut state = MemoryState::new();
            let vals = validators(seed, n);
            activate_all(&mut state, &vals);
            let result = sample(&state, vals, n as u64 + extra, 1, ChainId(1), 3);
            let is_insufficient = matches!(
                result,
                Err(TransactionError::Oracle(OracleError::InsufficientValidators { .. }))
            );
            prop_assert!(is_insufficient);
        }
    }
}
