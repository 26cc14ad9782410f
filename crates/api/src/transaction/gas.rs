// Path: crates/api/src/transaction/gas.rs
//! Transaction gas metering.

use oracle_types::error::TransactionError;

/// Tracks gas consumed by a transaction against a fixed limit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GasMeter {
    limit: u64,
    consumed: u64,
}

impl GasMeter {
    /// A meter that allows up to `limit` gas.
    pub fn new(limit: u64) -> Self {
        Self { limit, consumed: 0 }
    }

    /// A meter that never runs out.
    pub fn unlimited() -> Self {
        Self::new(u64::MAX)
    }

    /// The gas limit.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// The gas consumed so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// The gas still available.
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.consumed)
    }

    /// Consumes `amount` gas, failing with `OutOfGas` if the limit would be exceeded.
    ///
    /// On failure the meter is left exhausted.
    pub fn consume(&mut self, amount: u64, descriptor: &'static str) -> Result<(), TransactionError> {
        let wanted = self.consumed.saturating_add(amount);
        if wanted > self.limit {
            self.consumed = self.limit;
            return Err(TransactionError::OutOfGas {
                descriptor,
                limit: self.limit,
                wanted,
            });
        }
        self.consumed = wanted;
        Ok(())
    }
}
