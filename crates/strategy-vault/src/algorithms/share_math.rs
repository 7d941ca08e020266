//! # Share Math
//!
//! Asset/share conversion at the current share price.
//!
//! Conversions add one virtual asset and `10^decimals_offset` virtual shares
//! so the first deposit prices 1:1 and a donation cannot inflate the price
//! enough to round depositors down to zero shares.

use crate::domain::{Rounding, VaultError};
use primitive_types::U256;

/// 10^18, the fixed-point unit used by `share_price`.
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Virtual assets added to total managed value.
pub const VIRTUAL_ASSETS: u128 = 1;

/// `x * y / denominator` with a 256-bit intermediate product.
pub fn mul_div(x: u128, y: u128, denominator: u128, rounding: Rounding) -> Result<u128, VaultError> {
    if denominator == 0 {
        return Err(VaultError::ArithmeticOverflow);
    }
    let product = U256::from(x) * U256::from(y);
    let (mut quotient, remainder) = product.div_mod(U256::from(denominator));
    if rounding == Rounding::Up && !remainder.is_zero() {
        quotient += U256::one();
    }
    if quotient > U256::from(u128::MAX) {
        return Err(VaultError::ArithmeticOverflow);
    }
    Ok(quotient.as_u128())
}

/// Snapshot of the figures a conversion depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShareMath {
    /// Total managed value.
    pub total_assets: u128,
    /// Shares outstanding.
    pub total_supply: u128,
    /// Extra share precision.
    pub decimals_offset: u8,
}

impl ShareMath {
    /// Create a snapshot.
    pub fn new(total_assets: u128, total_supply: u128, decimals_offset: u8) -> Self {
        Self {
            total_assets,
            total_supply,
            decimals_offset,
        }
    }

    fn virtual_shares(&self) -> Result<u128, VaultError> {
        10u128
            .checked_pow(u32::from(self.decimals_offset))
            .ok_or(VaultError::ArithmeticOverflow)
    }

    fn supply_term(&self) -> Result<u128, VaultError> {
        self.total_supply
            .checked_add(self.virtual_shares()?)
            .ok_or(VaultError::ArithmeticOverflow)
    }

    fn assets_term(&self) -> Result<u128, VaultError> {
        self.total_assets
            .checked_add(VIRTUAL_ASSETS)
            .ok_or(VaultError::ArithmeticOverflow)
    }

    /// Shares worth `assets`.
    pub fn to_shares(&self, assets: u128, rounding: Rounding) -> Result<u128, VaultError> {
        mul_div(assets, self.supply_term()?, self.assets_term()?, rounding)
    }

    /// Assets worth `shares`.
    pub fn to_assets(&self, shares: u128, rounding: Rounding) -> Result<u128, VaultError> {
        mul_div(shares, self.assets_term()?, self.supply_term()?, rounding)
    }

    /// Assets per `10^18` shares, rounded down.
    pub fn share_price(&self) -> Result<u128, VaultError> {
        self.to_assets(WAD, Rounding::Down)
    }
}
