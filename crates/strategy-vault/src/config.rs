//! Configuration for the vault

use crate::domain::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest supported `decimals_offset`.
pub const MAX_DECIMALS_OFFSET: u8 = 18;

/// Vault configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Address the vault holds assets and strategy positions under
    pub vault_address: Address,
    /// Underlying asset
    pub asset: Address,
    /// Maximum allocation table length
    pub max_strategies: usize,
    /// Extra share precision (virtual shares = 10^offset)
    pub decimals_offset: u8,
    /// Push idle capital to strategies after every deposit/mint
    pub auto_rebalance_on_deposit: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            vault_address: Address::zero(),
            asset: Address::zero(),
            max_strategies: 32,
            decimals_offset: 0,
            auto_rebalance_on_deposit: false,
        }
    }
}

impl VaultConfig {
    /// Config for `vault_address` holding `asset`, defaults elsewhere.
    pub fn new(vault_address: Address, asset: Address) -> Self {
        Self {
            vault_address,
            asset,
            ..Self::default()
        }
    }

    /// Check the config before building a vault.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vault_address.is_zero() {
            return Err(ConfigError::ZeroAddress("vault_address"));
        }
        if self.asset.is_zero() {
            return Err(ConfigError::ZeroAddress("asset"));
        }
        if self.max_strategies == 0 {
            return Err(ConfigError::NoStrategySlots);
        }
        if self.decimals_offset > MAX_DECIMALS_OFFSET {
            return Err(ConfigError::DecimalsOffsetTooLarge {
                offset: self.decimals_offset,
                max: MAX_DECIMALS_OFFSET,
            });
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required address left unset
    #[error("Config field {0} must be a nonzero address")]
    ZeroAddress(&'static str),

    /// `max_strategies` is zero
    #[error("max_strategies must be at least 1")]
    NoStrategySlots,

    /// `decimals_offset` out of range
    #[error("decimals_offset {offset} exceeds {max}")]
    DecimalsOffsetTooLarge {
        /// Configured offset
        offset: u8,
        /// Maximum supported
        max: u8,
    },

    /// Asset ledger tracks a different asset
    #[error("Asset ledger holds {actual:?}, config expects {expected:?}")]
    LedgerAssetMismatch {
        /// Configured asset
        expected: Address,
        /// Ledger asset
        actual: Address,
    },
}
