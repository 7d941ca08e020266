//! # Valuation Aggregator
//!
//! Total managed value = idle balance + Σ enabled strategies' reported value.
//!
//! Disabled strategies are excluded even while they still hold vault funds.
//! Their value reappears on re-enable.

use crate::domain::{Address, AllocationTable, StrategySnapshot, VaultError};

/// Idle balance plus every enabled strategy's value for `vault`.
pub fn total_managed_value(
    idle: u128,
    table: &AllocationTable,
    vault: Address,
) -> Result<u128, VaultError> {
    let mut total = idle;
    for (_, entry) in table.enabled() {
        let value = entry.adapter.total_assets_of(vault)?;
        total = total
            .checked_add(value)
            .ok_or(VaultError::ArithmeticOverflow)?;
    }
    Ok(total)
}

/// Per-entry view including the value reported by disabled strategies.
pub fn strategy_snapshots(
    table: &AllocationTable,
    vault: Address,
) -> Result<Vec<StrategySnapshot>, VaultError> {
    table
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            Ok(StrategySnapshot {
                index,
                address: entry.address,
                liquidity: entry.liquidity,
                target_weight: entry.target_weight,
                cap_weight: entry.cap_weight,
                enabled: entry.enabled,
                reported_value: entry.adapter.total_assets_of(vault)?,
            })
        })
        .collect()
}
