//! # Inbound Ports
//!
//! API trait defining what the vault can do.
//!
//! Every mutating call is atomic: it either completes in full or leaves the
//! vault, its ledgers and its strategies as they were. The caller identity is
//! passed explicitly.

use crate::domain::{
    Address, Bps, RequestId, StrategySnapshot, VaultError, WithdrawalReceipt,
};
use crate::ports::outbound::StrategyAdapter;
use std::sync::Arc;

/// Vault API - inbound port.
pub trait VaultApi: Send + Sync {
    // === Configuration ===

    /// Append a strategy (admin).
    fn add_strategy(
        &self,
        caller: Address,
        adapter: Arc<dyn StrategyAdapter>,
        cap_weight: Bps,
    ) -> Result<usize, VaultError>;

    /// Enable or disable a strategy (admin).
    fn set_strategy_enabled(
        &self,
        caller: Address,
        index: usize,
        enabled: bool,
    ) -> Result<(), VaultError>;

    /// Replace all target weights (manager).
    fn set_allocations(&self, caller: Address, weights: &[Bps]) -> Result<(), VaultError>;

    /// Push idle capital into strategies (manager). Returns assets pushed.
    fn rebalance(&self, caller: Address) -> Result<u128, VaultError>;

    /// Stop asset movement (pauser).
    fn pause(&self, caller: Address) -> Result<(), VaultError>;

    /// Resume asset movement (pauser).
    fn unpause(&self, caller: Address) -> Result<(), VaultError>;

    // === Asset movement ===

    /// Deposit assets, returning shares minted to `receiver`.
    fn deposit(&self, caller: Address, assets: u128, receiver: Address)
        -> Result<u128, VaultError>;

    /// Mint exact shares, returning assets pulled from `caller`.
    fn mint(&self, caller: Address, shares: u128, receiver: Address) -> Result<u128, VaultError>;

    /// Withdraw exact assets from `owner`'s position.
    fn withdraw(
        &self,
        caller: Address,
        assets: u128,
        receiver: Address,
        owner: Address,
    ) -> Result<WithdrawalReceipt, VaultError>;

    /// Redeem exact shares from `owner`'s position.
    fn redeem(
        &self,
        caller: Address,
        shares: u128,
        receiver: Address,
        owner: Address,
    ) -> Result<WithdrawalReceipt, VaultError>;

    /// Settle a queued request; assets go to the request's owner.
    /// Returns assets claimed.
    fn claim(&self, request_id: RequestId, strategy: Address) -> Result<u128, VaultError>;

    // === Views ===

    /// Idle balance plus enabled strategies' reported value.
    fn total_managed_value(&self) -> Result<u128, VaultError>;

    /// Assets held directly by the vault.
    fn idle_balance(&self) -> u128;

    /// Assets a withdrawal could source now or through the queue.
    fn available_liquidity(&self) -> Result<u128, VaultError>;

    /// Assets the given shares are worth (floor).
    fn convert_to_assets(&self, shares: u128) -> Result<u128, VaultError>;

    /// Shares the given assets are worth (floor).
    fn convert_to_shares(&self, assets: u128) -> Result<u128, VaultError>;

    /// Shares minted by `deposit(assets)`.
    fn preview_deposit(&self, assets: u128) -> Result<u128, VaultError>;

    /// Assets pulled by `mint(shares)`.
    fn preview_mint(&self, shares: u128) -> Result<u128, VaultError>;

    /// Shares burned by `withdraw(assets)`.
    fn preview_withdraw(&self, assets: u128) -> Result<u128, VaultError>;

    /// Assets owed by `redeem(shares)`.
    fn preview_redeem(&self, shares: u128) -> Result<u128, VaultError>;

    /// Assets per 10^18 shares.
    fn share_price(&self) -> Result<u128, VaultError>;

    /// Largest `withdraw` the owner could make now.
    fn max_withdraw(&self, owner: Address) -> Result<u128, VaultError>;

    /// Largest `redeem` the owner could make now.
    fn max_redeem(&self, owner: Address) -> Result<u128, VaultError>;

    /// Assets queued for `owner` and not yet claimed.
    fn pending_of(&self, owner: Address) -> Result<u128, VaultError>;

    /// Recorded owner of a request.
    fn request_owner(
        &self,
        strategy: Address,
        request_id: RequestId,
    ) -> Result<Option<Address>, VaultError>;

    /// Open requests of `owner`: (strategy, id, assets).
    fn open_requests(&self, owner: Address) -> Result<Vec<(Address, RequestId, u128)>, VaultError>;

    /// Allocation table with each strategy's reported value.
    fn strategies(&self) -> Result<Vec<StrategySnapshot>, VaultError>;

    /// Number of entries in the allocation table.
    fn strategy_count(&self) -> Result<usize, VaultError>;

    /// Check the pause flag.
    fn is_paused(&self) -> bool;
}
