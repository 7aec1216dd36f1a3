//! Module parameters
//!
//! Host-managed configuration, persisted by the module and read on demand.

use crate::error::{HyperchainError, Result};
use crate::types::Coin;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fee rate in basis points (10_000 = 100%)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeRate(u32);

impl FeeRate {
    pub const MAX_BPS: u32 = 10_000;

    pub const fn from_bps(bps: u32) -> Self {
        Self(bps)
    }

    pub fn bps(&self) -> u32 {
        self.0
    }

    pub fn validate(&self) -> Result<()> {
        if self.0 > Self::MAX_BPS {
            return Err(HyperchainError::InvalidArgument(
                "bridge fee rate cannot be greater than 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:04}", self.0 / Self::MAX_BPS, self.0 % Self::MAX_BPS)
    }
}

/// Bridge module parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    #[serde(default = "default_max_hyperchains_per_account")]
    pub max_hyperchains_per_account: u64,

    #[serde(default = "default_max_validators_per_hyperchain")]
    pub max_validators_per_hyperchain: u64,

    /// Cap on active bridges sourced from one chain
    #[serde(default = "default_max_bridges_per_hyperchain")]
    pub max_bridges_per_hyperchain: u64,

    #[serde(default = "default_min_hyperchain_creation_deposit")]
    pub min_hyperchain_creation_deposit: Coin,

    #[serde(default = "default_min_validator_stake")]
    pub min_validator_stake: Coin,

    /// Reserved: validated and stored, not charged on transfers
    #[serde(default = "default_bridge_fee_rate")]
    pub bridge_fee_rate: FeeRate,
}

fn default_max_hyperchains_per_account() -> u64 {
    5
}

fn default_max_validators_per_hyperchain() -> u64 {
    100
}

fn default_max_bridges_per_hyperchain() -> u64 {
    10
}

fn default_min_hyperchain_creation_deposit() -> Coin {
    Coin::new("unmx", 1_000_000_000) // 1000 NMX
}

fn default_min_validator_stake() -> Coin {
    Coin::new("unmx", 100_000_000) // 100 NMX
}

fn default_bridge_fee_rate() -> FeeRate {
    FeeRate::from_bps(100) // 1%
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_hyperchains_per_account: default_max_hyperchains_per_account(),
            max_validators_per_hyperchain: default_max_validators_per_hyperchain(),
            max_bridges_per_hyperchain: default_max_bridges_per_hyperchain(),
            min_hyperchain_creation_deposit: default_min_hyperchain_creation_deposit(),
            min_validator_stake: default_min_validator_stake(),
            bridge_fee_rate: default_bridge_fee_rate(),
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<()> {
        validate_count("max_hyperchains_per_account", self.max_hyperchains_per_account)?;
        validate_count(
            "max_validators_per_hyperchain",
            self.max_validators_per_hyperchain,
        )?;
        validate_count("max_bridges_per_hyperchain", self.max_bridges_per_hyperchain)?;
        validate_coin(
            "min_hyperchain_creation_deposit",
            &self.min_hyperchain_creation_deposit,
        )?;
        validate_coin("min_validator_stake", &self.min_validator_stake)?;
        self.bridge_fee_rate.validate()
    }
}

fn validate_count(name: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(HyperchainError::InvalidArgument(format!(
            "parameter {} cannot be zero",
            name
        )));
    }
    Ok(())
}

fn validate_coin(name: &str, coin: &Coin) -> Result<()> {
    coin.validate()?;
    if coin.is_zero() {
        return Err(HyperchainError::InvalidArgument(format!(
            "parameter {} amount cannot be zero",
            name
        )));
    }
    Ok(())
}
