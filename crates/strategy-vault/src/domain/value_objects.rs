//! # Domain Value Objects
//!
//! Immutable value types shared by the vault engine.

use primitive_types::H160;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 160-bit account identifier.
pub type Address = H160;

/// Basis points (1/10000).
pub type Bps = u16;

/// Full weight: 100% in basis points.
pub const MAX_BPS: Bps = 10_000;

/// Opaque withdrawal request identifier issued by a locked strategy.
///
/// Each strategy owns its id space, so an id is only meaningful together
/// with the issuing strategy's address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for RequestId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// How a strategy returns funds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiquidityClass {
    /// Funds come back synchronously within the same operation.
    Instant,
    /// Funds come back through a request now / claim later cycle.
    Locked,
}

impl LiquidityClass {
    /// Check if funds are available synchronously.
    pub fn is_instant(&self) -> bool {
        matches!(self, Self::Instant)
    }
}

/// Roles gating vault entry points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Adds strategies, toggles them.
    Admin,
    /// Sets allocations, triggers rebalances.
    Manager,
    /// Pauses and unpauses asset movement.
    Pauser,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Pauser => "pauser",
        };
        f.write_str(name)
    }
}

/// Rounding direction for share conversions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    /// Floor.
    Down,
    /// Ceiling.
    Up,
}

/// Read-only view of one allocation table entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySnapshot {
    /// Position in the table (priority order).
    pub index: usize,
    /// Strategy address.
    pub address: Address,
    /// Liquidity class.
    pub liquidity: LiquidityClass,
    /// Target weight.
    pub target_weight: Bps,
    /// Cap weight.
    pub cap_weight: Bps,
    /// Whether the entry participates in valuation and routing.
    pub enabled: bool,
    /// Value the strategy reports for the vault, enabled or not.
    pub reported_value: u128,
}

/// A withdrawal shortfall queued against a locked strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedWithdrawal {
    /// Strategy that issued the request.
    pub strategy: Address,
    /// Strategy-issued request id.
    pub request_id: RequestId,
    /// Assets owed once the request is claimed.
    pub assets: u128,
}

/// Outcome of a successful withdrawal or redemption.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    /// Shares burned from the owner.
    pub shares_burned: u128,
    /// Total assets the shares were worth.
    pub assets: u128,
    /// Assets delivered to the receiver immediately.
    pub paid: u128,
    /// Shortfalls queued against locked strategies.
    pub queued: Vec<QueuedWithdrawal>,
}

impl WithdrawalReceipt {
    /// Total assets queued for later claim.
    pub fn queued_total(&self) -> u128 {
        self.queued.iter().map(|q| q.assets).sum()
    }

    /// Check if the withdrawal was fully paid out immediately.
    pub fn is_fully_paid(&self) -> bool {
        self.queued.is_empty()
    }
}

/// Build an address from a small integer, handy for fixtures.
pub fn address_from_low_u64(value: u64) -> Address {
    H160::from_low_u64_be(value)
}
