// Path: crates/api/src/validator/mod.rs
//! Defines the read-only view of the bonded validator set.

use crate::state::StateAccess;
use oracle_types::app::ValidatorPower;
use oracle_types::error::StateError;

/// Supplies the bonded validators and their voting power.
///
/// The order of the returned list carries no meaning; the sampler canonicalises it.
pub trait ValidatorSetView: Send + Sync {
    /// Returns every bonded validator with its current power.
    fn bonded_validators(&self, state: &dyn StateAccess) -> Result<Vec<ValidatorPower>, StateError>;
}
