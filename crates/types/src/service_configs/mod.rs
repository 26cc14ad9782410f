// Path: crates/types/src/service_configs/mod.rs
//! Configuration structures for the oracle service and on-chain service metadata.

use crate::app::Dec;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// The smallest accepted `reward_decreasing_fraction`, 0.0001.
pub const MIN_REWARD_DECREASING_FRACTION: Dec = Dec::from_raw(100_000_000_000_000);

/// Governance-controlled parameters of the oracle service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct OracleParams {
    /// The maximum number of raw requests a prepare phase may produce.
    pub max_raw_request_count: u64,
    /// The maximum number of validators a request may ask.
    pub max_ask_count: u64,
    /// The maximum size in bytes of request calldata.
    pub max_calldata_size: u64,
    /// The maximum size in bytes of a single raw report's data.
    pub max_report_data_size: u64,
    /// The maximum size in bytes of a result's return data.
    pub max_result_size: u64,
    /// The number of blocks after admission before a request expires.
    pub expiration_block_count: u64,
    /// The gas charged on top of every prepare and execute budget.
    pub base_owasm_gas: u64,
    /// The gas charged per asked validator at admission.
    pub per_validator_request_gas: u64,
    /// The number of subsets drawn when sampling validators.
    pub sampling_try_count: u64,
    /// The cooldown, in nanoseconds, before a deactivated validator may reactivate.
    pub inactive_penalty_duration: u64,
    /// Whether requests from counterparty chains are accepted.
    pub ibc_request_enabled: bool,
    /// The denomination data-provider rewards are paid in.
    pub data_provider_reward_denom: String,
    /// The starting reward per byte of reported data.
    pub data_provider_reward_per_byte: Dec,
    /// The accumulated reward that triggers a rate decrease.
    pub data_provider_reward_threshold: Dec,
    /// The fraction the per-byte rate decreases by each time the threshold is hit.
    pub reward_decreasing_fraction: Dec,
    /// The number of blocks between reward payout sweeps.
    pub reward_payout_interval: u64,
}

impl Default for OracleParams {
    fn default() -> Self {
        Self {
            max_raw_request_count: 12,
            max_ask_count: 16,
            max_calldata_size: 256,
            max_report_data_size: 512,
            max_result_size: 512,
            expiration_block_count: 100,
            base_owasm_gas: 20_000,
            per_validator_request_gas: 30_000,
            sampling_try_count: 3,
            inactive_penalty_duration: 600_000_000_000, // 10 minutes
            ibc_request_enabled: true,
            data_provider_reward_denom: "uband".to_string(),
            data_provider_reward_per_byte: Dec::ONE,
            data_provider_reward_threshold: Dec::from_raw(200_000_000 * Dec::ONE.raw()),
            reward_decreasing_fraction: Dec::from_raw(50_000_000_000_000_000), // 0.05
            reward_payout_interval: 1,
        }
    }
}

impl OracleParams {
    /// Checks the parameters for values that would stall or break the engine.
    pub fn validate(&self) -> Result<(), String> {
        let non_zero = [
            ("max_raw_request_count", self.max_raw_request_count),
            ("max_ask_count", self.max_ask_count),
            ("max_calldata_size", self.max_calldata_size),
            ("max_report_data_size", self.max_report_data_size),
            ("max_result_size", self.max_result_size),
            ("expiration_block_count", self.expiration_block_count),
            ("sampling_try_count", self.sampling_try_count),
            ("reward_payout_interval", self.reward_payout_interval),
        ];
        if let Some((name, _)) = non_zero.iter().find(|(_, v)| *v == 0) {
            return Err(format!("{} must be positive", name));
        }
        if self.data_provider_reward_denom.is_empty() {
            return Err("data_provider_reward_denom must not be empty".to_string());
        }
        if self.data_provider_reward_threshold <= Dec::ZERO {
            return Err("data_provider_reward_threshold must be positive".to_string());
        }
        if self.reward_decreasing_fraction < MIN_REWARD_DECREASING_FRACTION
            || self.reward_decreasing_fraction >= Dec::ONE
        {
            return Err(format!(
                "reward_decreasing_fraction must be in [{}, 1), got {}",
                MIN_REWARD_DECREASING_FRACTION, self.reward_decreasing_fraction
            ));
        }
        Ok(())
    }
}

bitflags::bitflags! {
    /// A bitmask representing the lifecycle hooks a service exposes.
    /// This is distinct from the service's callable methods.
    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[serde(transparent)]
    pub struct Capabilities: u32 {
        /// Implements the OnEndBlock trait and its `on_end_block` hook.
        const ON_END_BLOCK = 0b0010;
    }
}

impl Encode for Capabilities {
    fn encode_to<T: parity_scale_codec::Output + ?Sized>(&self, dest: &mut T) {
        self.bits().encode_to(dest)
    }
}

impl Decode for Capabilities {
    fn decode<I: parity_scale_codec::Input>(
        input: &mut I,
    ) -> Result<Self, parity_scale_codec::Error> {
        let bits = u32::decode(input)?;
        Self::from_bits(bits).ok_or_else(|| "Invalid bits for Capabilities".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_bytes_canonical, to_bytes_canonical};

    #[test]
    fn defaults_are_valid() {
        let params = OracleParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.data_provider_reward_threshold.to_string(), "200000000");
        assert_eq!(params.reward_decreasing_fraction.to_string(), "0.05");
    }

    #[test]
    fn loads_partial_toml_over_defaults() {
        let params: OracleParams = toml::from_str(
            r#"
            max_ask_count = 4
            reward_decreasing_fraction = "0.5"
            data_provider_reward_per_byte = "2.5"
            "#,
        )
        .unwrap();
        assert_eq!(params.max_ask_count, 4);
        assert_eq!(params.max_raw_request_count, 12);
        assert_eq!(params.reward_decreasing_fraction.to_string(), "0.5");
        assert_eq!(params.data_provider_reward_per_byte.to_string(), "2.5");
    }

    #[test]
    fn rejects_degenerate_values() {
        let mut params = OracleParams {
            sampling_try_count: 0,
            ..Default::default()
        };
        assert!(params.validate().unwrap_err().contains("sampling_try_count"));

        params.sampling_try_count = 1;
        params.reward_decreasing_fraction = Dec::ONE;
        assert!(params.validate().is_err());
        params.reward_decreasing_fraction = Dec::ZERO;
        assert!(params.validate().is_err());

        let params = OracleParams {
            data_provider_reward_threshold: Dec::ZERO,
            ..Default::default()
        };
        assert!(params
            .validate()
            .unwrap_err()
            .contains("data_provider_reward_threshold"));
    }

    #[test]
    fn json_round_trip_keeps_decimals_as_strings() {
        let json = serde_json::to_value(OracleParams::default()).unwrap();
        assert_eq!(json["data_provider_reward_per_byte"], "1");
    }

    #[test]
    fn capabilities_reject_unknown_bits() {
        let bytes = to_bytes_canonical(&Capabilities::ON_END_BLOCK).unwrap();
        assert_eq!(
            from_bytes_canonical::<Capabilities>(&bytes).unwrap(),
            Capabilities::ON_END_BLOCK
        );
        let bad = to_bytes_canonical(&0b1000u32).unwrap();
        assert!(from_bytes_canonical::<Capabilities>(&bad).is_err());
    }
}
