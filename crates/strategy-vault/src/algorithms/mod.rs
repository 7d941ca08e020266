//! Algorithms module for the vault
//!
//! Contains:
//! - Share math (asset/share conversion)
//! - Valuation aggregator
//! - Rebalance planner
//! - Withdrawal sourcing planner

pub mod rebalance;
pub mod share_math;
pub mod valuation;
pub mod withdrawal_plan;

pub use rebalance::{plan_rebalance, planned_total, PlannedDeposit};
pub use share_math::{mul_div, ShareMath, WAD};
pub use valuation::{strategy_snapshots, total_managed_value};
pub use withdrawal_plan::{
    collect_sources, plan_withdrawal, total_liquidity, LiquiditySource, PlannedSource,
    WithdrawalPlan,
};
