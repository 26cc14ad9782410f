//! A fixed `ValidatorSetView`.

use oracle_api::state::StateAccess;
use oracle_api::validator::ValidatorSetView;
use oracle_types::app::{AccountId, ValidatorPower};
use oracle_types::error::StateError;

/// A validator set that never changes, regardless of state.
#[derive(Debug, Clone, Default)]
pub struct StaticValidatorSet {
    validators: Vec<ValidatorPower>,
}

impl StaticValidatorSet {
    /// Create a set from validators with power
    pub fn new(validators: Vec<ValidatorPower>) -> Self {
        Self { validators }
    }

    /// Create a set from `(account, power)` pairs
    pub fn from_powers(powers: &[(AccountId, u64)]) -> Self {
        Self::new(
            powers
                .iter()
                .map(|(account, power)| ValidatorPower {
                    account: *account,
                    power: *power,
                })
                .collect(),
        )
    }

    /// The accounts of the set, in insertion order
    pub fn accounts(&self) -> Vec<AccountId> {
        self.validators.iter().map(|v| v.account).collect()
    }
}

impl ValidatorSetView for StaticValidatorSet {
    fn bonded_validators(&self, _state: &dyn StateAccess) -> Result<Vec<ValidatorPower>, StateError> {
        Ok(self.validators.clone())
    }
}
