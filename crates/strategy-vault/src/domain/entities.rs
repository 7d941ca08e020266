//! # Domain Entities
//!
//! Vault-owned state: the allocation table and the pending claim registry.

use super::errors::VaultError;
use super::value_objects::{Address, Bps, LiquidityClass, RequestId, MAX_BPS};
use crate::ports::outbound::StrategyAdapter;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One strategy in the allocation table.
#[derive(Clone)]
pub struct StrategyEntry {
    /// Handle to the strategy backend.
    pub adapter: Arc<dyn StrategyAdapter>,
    /// Strategy address, cached at registration.
    pub address: Address,
    /// Liquidity class, fixed per adapter instance.
    pub liquidity: LiquidityClass,
    /// Target share of idle capital.
    pub target_weight: Bps,
    /// Upper bound on the target weight.
    pub cap_weight: Bps,
    /// Disabled entries are skipped by valuation, rebalance and routing.
    pub enabled: bool,
}

impl StrategyEntry {
    /// Create an enabled entry with zero target weight.
    pub fn new(adapter: Arc<dyn StrategyAdapter>, cap_weight: Bps) -> Self {
        Self {
            address: adapter.address(),
            liquidity: adapter.liquidity(),
            adapter,
            target_weight: 0,
            cap_weight,
            enabled: true,
        }
    }

    /// Check if this entry should receive capital on rebalance.
    pub fn is_allocatable(&self) -> bool {
        self.enabled && self.target_weight > 0
    }
}

impl fmt::Debug for StrategyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyEntry")
            .field("address", &self.address)
            .field("liquidity", &self.liquidity)
            .field("target_weight", &self.target_weight)
            .field("cap_weight", &self.cap_weight)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Ordered, append-only list of strategy entries.
///
/// Insertion order is the priority order used when draining liquidity.
#[derive(Clone, Debug, Default)]
pub struct AllocationTable {
    entries: Vec<StrategyEntry>,
}

impl AllocationTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in priority order.
    pub fn entries(&self) -> &[StrategyEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&StrategyEntry> {
        self.entries.get(index)
    }

    /// Entry registered under `address`.
    pub fn find(&self, address: Address) -> Option<&StrategyEntry> {
        self.entries.iter().find(|e| e.address == address)
    }

    /// Enabled entries in priority order, paired with their index.
    pub fn enabled(&self) -> impl Iterator<Item = (usize, &StrategyEntry)> {
        self.entries.iter().enumerate().filter(|(_, e)| e.enabled)
    }

    /// Current target weights in table order.
    pub fn weights(&self) -> Vec<Bps> {
        self.entries.iter().map(|e| e.target_weight).collect()
    }

    /// Append a strategy.
    ///
    /// The adapter must hold `vault_asset`, its cap must be within 10000 bps,
    /// it must not already be listed and the table must have room.
    pub fn add_entry(
        &mut self,
        adapter: Arc<dyn StrategyAdapter>,
        cap_weight: Bps,
        vault_asset: Address,
        max_entries: usize,
    ) -> Result<usize, VaultError> {
        let actual = adapter.asset();
        if actual != vault_asset {
            return Err(VaultError::AssetMismatch {
                expected: vault_asset,
                actual,
            });
        }
        if cap_weight > MAX_BPS {
            return Err(VaultError::CapOutOfRange { cap: cap_weight });
        }
        let address = adapter.address();
        if self.find(address).is_some() {
            return Err(VaultError::DuplicateStrategy(address));
        }
        if self.entries.len() >= max_entries {
            return Err(VaultError::TooManyStrategies { max: max_entries });
        }

        self.entries.push(StrategyEntry::new(adapter, cap_weight));
        Ok(self.entries.len() - 1)
    }

    /// Toggle an entry. The target weight is kept.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> Result<(), VaultError> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(VaultError::UnknownStrategy(index))?;
        entry.enabled = enabled;
        Ok(())
    }

    /// Validate a full weight vector without touching the table.
    ///
    /// Returns the weights that would be written: disabled entries forced
    /// to zero.
    pub fn stage_allocations(&self, weights: &[Bps]) -> Result<Vec<Bps>, VaultError> {
        if weights.len() != self.entries.len() {
            return Err(VaultError::LengthMismatch {
                expected: self.entries.len(),
                actual: weights.len(),
            });
        }
        if self.entries.is_empty() {
            return Err(VaultError::NoStrategies);
        }

        let mut staged = Vec::with_capacity(weights.len());
        for (index, (entry, &weight)) in self.entries.iter().zip(weights).enumerate() {
            if !entry.enabled {
                staged.push(0);
                continue;
            }
            if weight > entry.cap_weight {
                return Err(VaultError::CapExceeded {
                    index,
                    weight,
                    cap: entry.cap_weight,
                });
            }
            staged.push(weight);
        }

        let sum: u32 = staged.iter().map(|&w| u32::from(w)).sum();
        if sum != u32::from(MAX_BPS) {
            return Err(VaultError::WeightSumInvalid { sum });
        }
        Ok(staged)
    }

    /// Validate then commit a weight vector. All or nothing.
    pub fn set_allocations(&mut self, weights: &[Bps]) -> Result<Vec<Bps>, VaultError> {
        let staged = self.stage_allocations(weights)?;
        for (entry, &weight) in self.entries.iter_mut().zip(&staged) {
            entry.target_weight = weight;
        }
        Ok(staged)
    }
}

/// Aggregate amount owed to one owner through open requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PendingWithdrawal {
    /// Assets queued but not yet claimed.
    pub assets_pending: u128,
}

/// Ownership record for one strategy-issued request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawalRequest {
    /// Account the claim pays out to.
    pub owner: Address,
    /// Assets requested from the strategy.
    pub assets: u128,
}

/// Tracks pending totals per owner and request ownership per
/// `(strategy, request id)`.
#[derive(Clone, Debug, Default)]
pub struct PendingClaimRegistry {
    pending: HashMap<Address, PendingWithdrawal>,
    requests: HashMap<(Address, RequestId), WithdrawalRequest>,
}

impl PendingClaimRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assets pending for `owner`.
    pub fn pending_of(&self, owner: Address) -> u128 {
        self.pending
            .get(&owner)
            .map(|p| p.assets_pending)
            .unwrap_or(0)
    }

    /// Ownership record for a request.
    pub fn request(&self, strategy: Address, request_id: RequestId) -> Option<&WithdrawalRequest> {
        self.requests.get(&(strategy, request_id))
    }

    /// Open requests owned by `owner`, sorted by strategy then id.
    pub fn open_requests(&self, owner: Address) -> Vec<(Address, RequestId, u128)> {
        let mut open: Vec<_> = self
            .requests
            .iter()
            .filter(|(_, r)| r.owner == owner)
            .map(|(&(strategy, id), r)| (strategy, id, r.assets))
            .collect();
        open.sort();
        open
    }

    /// Number of open requests across all owners.
    pub fn open_request_count(&self) -> usize {
        self.requests.len()
    }

    /// Record a queued shortfall and add it to the owner's pending total.
    pub fn record(
        &mut self,
        strategy: Address,
        request_id: RequestId,
        owner: Address,
        assets: u128,
    ) -> Result<(), VaultError> {
        let key = (strategy, request_id);
        if self.requests.contains_key(&key) {
            return Err(VaultError::DuplicateRequest {
                strategy,
                request_id,
            });
        }
        let entry = self.pending.entry(owner).or_default();
        entry.assets_pending = entry
            .assets_pending
            .checked_add(assets)
            .ok_or(VaultError::ArithmeticOverflow)?;
        self.requests.insert(key, WithdrawalRequest { owner, assets });
        Ok(())
    }

    /// Remove a request's ownership record.
    pub fn take(
        &mut self,
        strategy: Address,
        request_id: RequestId,
    ) -> Result<WithdrawalRequest, VaultError> {
        self.requests
            .remove(&(strategy, request_id))
            .ok_or(VaultError::UnknownRequest {
                strategy,
                request_id,
            })
    }

    /// Reduce the owner's pending total, floored at zero.
    pub fn release(&mut self, owner: Address, assets: u128) {
        if let Some(entry) = self.pending.get_mut(&owner) {
            entry.assets_pending = entry.assets_pending.saturating_sub(assets);
            if entry.assets_pending == 0 {
                self.pending.remove(&owner);
            }
        }
    }
}

/// Everything the vault owns exclusively. Cloned as the rollback snapshot.
#[derive(Clone, Debug, Default)]
pub struct VaultState {
    /// Strategy allocation table.
    pub table: AllocationTable,
    /// Pending withdrawals and request ownership.
    pub claims: PendingClaimRegistry,
}
