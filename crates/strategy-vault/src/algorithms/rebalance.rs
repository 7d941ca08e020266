//! # Rebalance Engine
//!
//! Push-only distribution of idle capital by target weight. Over-weighted
//! strategies are never drawn down; only idle cash moves outward.

use super::share_math::mul_div;
use crate::domain::{AllocationTable, Rounding, VaultError, MAX_BPS};

/// One planned deposit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedDeposit {
    /// Entry index.
    pub index: usize,
    /// Assets to push.
    pub amount: u128,
}

/// Deposits for `idle`: `floor(idle * weight / 10000)` per enabled entry
/// with nonzero weight, skipping zero amounts.
pub fn plan_rebalance(idle: u128, table: &AllocationTable) -> Result<Vec<PlannedDeposit>, VaultError> {
    let mut plan = Vec::new();
    if idle == 0 {
        return Ok(plan);
    }
    for (index, entry) in table.enabled() {
        if entry.target_weight == 0 {
            continue;
        }
        let amount = mul_div(
            idle,
            u128::from(entry.target_weight),
            u128::from(MAX_BPS),
            Rounding::Down,
        )?;
        if amount > 0 {
            plan.push(PlannedDeposit { index, amount });
        }
    }
    Ok(plan)
}

/// Total assets a plan pushes.
pub fn planned_total(plan: &[PlannedDeposit]) -> u128 {
    plan.iter().map(|d| d.amount).sum()
}
