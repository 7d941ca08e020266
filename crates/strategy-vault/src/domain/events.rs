//! # Domain Events
//!
//! Notifications emitted by committed vault operations. Events raised by a
//! failed operation are discarded with its other effects.

use super::value_objects::{Address, Bps, LiquidityClass, RequestId};
use serde::{Deserialize, Serialize};

/// Vault event payloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultEvent {
    /// Strategy appended to the allocation table.
    StrategyAdded {
        /// Entry index.
        index: usize,
        /// Strategy address.
        strategy: Address,
        /// Liquidity class.
        liquidity: LiquidityClass,
        /// Cap weight.
        cap_weight: Bps,
    },
    /// Strategy enabled or disabled.
    StrategyToggled {
        /// Entry index.
        index: usize,
        /// Strategy address.
        strategy: Address,
        /// New flag.
        enabled: bool,
    },
    /// Target weights replaced.
    AllocationsUpdated {
        /// Weights as written, table order.
        weights: Vec<Bps>,
    },
    /// Idle capital pushed into strategies.
    Rebalanced {
        /// Total assets deposited into strategies.
        pushed: u128,
        /// Total assets pulled from strategies. Always zero.
        pulled: u128,
    },
    /// Assets deposited, shares minted.
    Deposited {
        /// Account supplying assets.
        caller: Address,
        /// Account receiving shares.
        receiver: Address,
        /// Assets deposited.
        assets: u128,
        /// Shares minted.
        shares: u128,
    },
    /// Shares burned for assets (paid now, queued, or both).
    Withdrawn {
        /// Account executing the withdrawal.
        caller: Address,
        /// Account receiving paid assets.
        receiver: Address,
        /// Account whose shares were burned.
        owner: Address,
        /// Total assets owed.
        assets: u128,
        /// Shares burned.
        shares: u128,
        /// Assets delivered immediately.
        paid: u128,
        /// Assets queued against locked strategies.
        queued: u128,
    },
    /// Shortfall queued against a locked strategy.
    WithdrawalQueued {
        /// Account the claim pays out to.
        owner: Address,
        /// Assets queued.
        assets: u128,
        /// Strategy-issued request id.
        request_id: RequestId,
        /// Locked strategy.
        strategy: Address,
    },
    /// Queued request settled.
    ClaimSettled {
        /// Account paid.
        owner: Address,
        /// Assets delivered by the strategy.
        assets: u128,
        /// Request id.
        request_id: RequestId,
        /// Strategy.
        strategy: Address,
    },
    /// Pause flag changed.
    PauseChanged {
        /// Account that flipped the flag.
        caller: Address,
        /// New flag.
        paused: bool,
    },
    /// Request issued during a failed withdrawal, re-assigned to the vault.
    RequestRecovered {
        /// Strategy.
        strategy: Address,
        /// Request id.
        request_id: RequestId,
        /// Assets now owed to the vault.
        assets: u128,
    },
}

impl VaultEvent {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StrategyAdded { .. } => "strategy_added",
            Self::StrategyToggled { .. } => "strategy_toggled",
            Self::AllocationsUpdated { .. } => "allocations_updated",
            Self::Rebalanced { .. } => "rebalanced",
            Self::Deposited { .. } => "deposited",
            Self::Withdrawn { .. } => "withdrawn",
            Self::WithdrawalQueued { .. } => "withdrawal_queued",
            Self::ClaimSettled { .. } => "claim_settled",
            Self::PauseChanged { .. } => "pause_changed",
            Self::RequestRecovered { .. } => "request_recovered",
        }
    }
}
