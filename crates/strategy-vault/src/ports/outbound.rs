//! # Outbound Ports
//!
//! Traits for the vault's external collaborators: strategy backends, the
//! asset and shares ledgers, role and pause storage, time, and event
//! delivery. The engine only ever talks to these traits.

use crate::domain::{
    Address, LedgerError, LiquidityClass, RequestId, Role, StrategyError, VaultEvent,
};
use thiserror::Error;

/// Capability contract of a yield strategy.
///
/// The liquidity class is fixed per instance. Instant strategies must fail
/// `request_withdraw`/`claim_withdraw`; locked strategies must fail
/// `withdraw`.
pub trait StrategyAdapter: Send + Sync {
    /// Strategy address (where deposited assets are sent).
    fn address(&self) -> Address;

    /// Underlying asset.
    fn asset(&self) -> Address;

    /// Liquidity class.
    fn liquidity(&self) -> LiquidityClass;

    /// Check if the strategy returns funds synchronously.
    fn is_instant(&self) -> bool {
        self.liquidity().is_instant()
    }

    /// Credit `depositor` for `assets` already transferred to `address()`.
    ///
    /// Returns a strategy-specific receipt amount.
    fn deposit(&self, depositor: Address, assets: u128) -> Result<u128, StrategyError>;

    /// Instantly withdraw `assets` of `owner`'s position to `to`.
    ///
    /// Returns the assets reported as delivered.
    fn withdraw(&self, owner: Address, assets: u128, to: Address) -> Result<u128, StrategyError>;

    /// Open a time-locked withdrawal for `assets` of `owner`'s position.
    fn request_withdraw(&self, owner: Address, assets: u128) -> Result<RequestId, StrategyError>;

    /// Settle an unlocked request, sending the assets to `to`.
    fn claim_withdraw(
        &self,
        owner: Address,
        request_id: RequestId,
        to: Address,
    ) -> Result<u128, StrategyError>;

    /// Value attributable to `account`, in asset units.
    fn total_assets_of(&self, account: Address) -> Result<u128, StrategyError>;
}

/// Ledger of the vault's underlying asset.
pub trait AssetLedger: Send + Sync {
    /// Asset identifier.
    fn asset(&self) -> Address;

    /// Balance of `account`.
    fn balance_of(&self, account: Address) -> u128;

    /// Move `amount` from `from` to `to`.
    fn transfer(&self, from: Address, to: Address, amount: u128) -> Result<(), LedgerError>;
}

/// Ledger of vault shares.
pub trait SharesLedger: Send + Sync {
    /// Shares outstanding.
    fn total_supply(&self) -> u128;

    /// Shares held by `account`.
    fn balance_of(&self, account: Address) -> u128;

    /// Shares `spender` may burn on behalf of `owner`.
    fn allowance(&self, owner: Address, spender: Address) -> u128;

    /// Set the allowance from `owner` to `spender`.
    fn approve(&self, owner: Address, spender: Address, amount: u128) -> Result<(), LedgerError>;

    /// Create shares.
    fn mint(&self, to: Address, amount: u128) -> Result<(), LedgerError>;

    /// Destroy shares.
    fn burn(&self, from: Address, amount: u128) -> Result<(), LedgerError>;

    /// Consume allowance, failing with `InsufficientAllowance`.
    fn spend_allowance(
        &self,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> Result<(), LedgerError>;
}

/// Role storage.
pub trait AccessControl: Send + Sync {
    /// Check if `account` holds `role`.
    fn has_role(&self, role: Role, account: Address) -> bool;
}

/// Pause flag storage.
pub trait PauseState: Send + Sync {
    /// Current flag.
    fn is_paused(&self) -> bool;

    /// Set the flag.
    fn set_paused(&self, paused: bool);
}

/// Time source in unix seconds.
pub trait TimeSource: Send + Sync {
    /// Current time.
    fn now(&self) -> u64;
}

/// Delivery of committed vault events.
pub trait VaultEventSink: Send + Sync {
    /// Publish one event.
    fn publish(&self, event: &VaultEvent) -> Result<(), PublishError>;
}

/// Error type for publish operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PublishError {
    /// Sink not connected.
    #[error("Event sink not connected")]
    NotConnected,
    /// Failed to serialize the event.
    #[error("Serialization error: {0}")]
    Serialization(String),
}
