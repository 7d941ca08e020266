//! # Withdrawal Plan
//!
//! Sourcing plan for a withdrawal, computed from a read-only snapshot of
//! liquidity before anything is mutated:
//!
//! ```text
//! idle ──▶ instant strategies (table order) ──▶ locked strategies (table order)
//!  paid now        pulled + paid now                 queued for claim
//! ```
//!
//! If the three phases cannot cover the request the plan fails and the
//! withdrawal never starts.

use crate::domain::{Address, AllocationTable, LiquidityClass, VaultError};

/// Liquidity one enabled strategy can contribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiquiditySource {
    /// Entry index.
    pub index: usize,
    /// Strategy address.
    pub strategy: Address,
    /// Liquidity class.
    pub liquidity: LiquidityClass,
    /// Value reported for the vault.
    pub available: u128,
}

/// One planned pull or request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedSource {
    /// Entry index.
    pub index: usize,
    /// Strategy address.
    pub strategy: Address,
    /// Assets to pull or request.
    pub amount: u128,
}

/// Full sourcing plan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WithdrawalPlan {
    /// Requested assets.
    pub assets: u128,
    /// Paid straight from idle.
    pub from_idle: u128,
    /// Pulled from instant strategies.
    pub instant: Vec<PlannedSource>,
    /// Requested from locked strategies.
    pub queued: Vec<PlannedSource>,
}

impl WithdrawalPlan {
    /// Assets pulled from instant strategies.
    pub fn instant_total(&self) -> u128 {
        self.instant.iter().map(|s| s.amount).sum()
    }

    /// Assets queued against locked strategies.
    pub fn queued_total(&self) -> u128 {
        self.queued.iter().map(|s| s.amount).sum()
    }

    /// Assets delivered to the receiver immediately.
    pub fn paid_now(&self) -> u128 {
        self.from_idle + self.instant_total()
    }
}

/// Read each enabled entry's liquidity class and reported value.
pub fn collect_sources(
    table: &AllocationTable,
    vault: Address,
) -> Result<Vec<LiquiditySource>, VaultError> {
    table
        .enabled()
        .map(|(index, entry)| {
            Ok(LiquiditySource {
                index,
                strategy: entry.address,
                liquidity: entry.liquidity,
                available: entry.adapter.total_assets_of(vault)?,
            })
        })
        .collect()
}

/// Total liquidity: idle plus every source.
pub fn total_liquidity(idle: u128, sources: &[LiquiditySource]) -> u128 {
    sources
        .iter()
        .fold(idle, |acc, s| acc.saturating_add(s.available))
}

/// Plan a withdrawal of `assets`.
///
/// Table order is the only priority rule within each phase.
pub fn plan_withdrawal(
    assets: u128,
    idle: u128,
    sources: &[LiquiditySource],
) -> Result<WithdrawalPlan, VaultError> {
    let mut remaining = assets;
    let from_idle = remaining.min(idle);
    remaining -= from_idle;

    let drain = |class: LiquidityClass, remaining: &mut u128| {
        let mut planned = Vec::new();
        for source in sources.iter().filter(|s| s.liquidity == class) {
            if *remaining == 0 {
                break;
            }
            if source.available == 0 {
                continue;
            }
            let amount = (*remaining).min(source.available);
            *remaining -= amount;
            planned.push(PlannedSource {
                index: source.index,
                strategy: source.strategy,
                amount,
            });
        }
        planned
    };

    let instant = drain(LiquidityClass::Instant, &mut remaining);
    let queued = drain(LiquidityClass::Locked, &mut remaining);

    if remaining > 0 {
        return Err(VaultError::InsufficientLiquidity {
            requested: assets,
            available: assets - remaining,
        });
    }

    Ok(WithdrawalPlan {
        assets,
        from_idle,
        instant,
        queued,
    })
}
