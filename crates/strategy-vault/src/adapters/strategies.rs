//! Reference Strategy Adapters
//!
//! `InstantStrategy` pays withdrawals synchronously. `LockedStrategy` only
//! issues time-locked requests that become claimable after a fixed delay.
//! Both keep per-account positions in asset units and hold the backing
//! tokens under their own address on an `InMemoryAssetLedger`.

use super::ledgers::InMemoryAssetLedger;
use crate::domain::{Address, LiquidityClass, RequestId, StrategyError};
use crate::ports::outbound::{AssetLedger, StrategyAdapter, TimeSource};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Per-account positions plus the total the strategy has accounted for.
#[derive(Debug, Default)]
struct PositionBook {
    positions: HashMap<Address, u128>,
    accounted: u128,
}

impl PositionBook {
    fn position(&self, account: Address) -> u128 {
        self.positions.get(&account).copied().unwrap_or(0)
    }

    /// Credit a deposit, requiring the tokens to have already arrived.
    fn credit_funded(
        &mut self,
        held: u128,
        account: Address,
        assets: u128,
    ) -> Result<(), StrategyError> {
        let unaccounted = held.saturating_sub(self.accounted);
        if unaccounted < assets {
            return Err(StrategyError::InsufficientBalance {
                requested: assets,
                available: unaccounted,
            });
        }
        self.accounted += assets;
        *self.positions.entry(account).or_insert(0) += assets;
        Ok(())
    }

    fn debit(&mut self, account: Address, assets: u128) -> Result<(), StrategyError> {
        let available = self.position(account);
        if available < assets {
            return Err(StrategyError::InsufficientBalance {
                requested: assets,
                available,
            });
        }
        if available == assets {
            self.positions.remove(&account);
        } else {
            self.positions.insert(account, available - assets);
        }
        Ok(())
    }
}

/// Strategy that returns funds in the same call.
pub struct InstantStrategy {
    address: Address,
    ledger: Arc<InMemoryAssetLedger>,
    book: RwLock<PositionBook>,
}

impl InstantStrategy {
    /// Create a strategy at `address` backed by `ledger`.
    pub fn new(address: Address, ledger: Arc<InMemoryAssetLedger>) -> Self {
        Self {
            address,
            ledger,
            book: RwLock::new(PositionBook::default()),
        }
    }

    /// Simulate yield: mint `amount` to the strategy and credit `account`.
    pub fn accrue_yield(&self, account: Address, amount: u128) -> Result<(), StrategyError> {
        self.ledger.mint(self.address, amount)?;
        let mut book = self.book.write();
        book.accounted += amount;
        *book.positions.entry(account).or_insert(0) += amount;
        debug!(strategy = ?self.address, ?account, amount, "yield accrued");
        Ok(())
    }
}

impl StrategyAdapter for InstantStrategy {
    fn address(&self) -> Address {
        self.address
    }

    fn asset(&self) -> Address {
        self.ledger.asset()
    }

    fn liquidity(&self) -> LiquidityClass {
        LiquidityClass::Instant
    }

    fn deposit(&self, depositor: Address, assets: u128) -> Result<u128, StrategyError> {
        let held = self.ledger.balance_of(self.address);
        self.book.write().credit_funded(held, depositor, assets)?;
        Ok(assets)
    }

    fn withdraw(&self, owner: Address, assets: u128, to: Address) -> Result<u128, StrategyError> {
        let mut book = self.book.write();
        book.debit(owner, assets)?;
        if let Err(e) = self.ledger.transfer(self.address, to, assets) {
            *book.positions.entry(owner).or_insert(0) += assets;
            return Err(e.into());
        }
        book.accounted -= assets;
        Ok(assets)
    }

    fn request_withdraw(&self, _owner: Address, _assets: u128) -> Result<RequestId, StrategyError> {
        Err(StrategyError::Unsupported {
            operation: "request_withdraw",
        })
    }

    fn claim_withdraw(
        &self,
        _owner: Address,
        _request_id: RequestId,
        _to: Address,
    ) -> Result<u128, StrategyError> {
        Err(StrategyError::Unsupported {
            operation: "claim_withdraw",
        })
    }

    fn total_assets_of(&self, account: Address) -> Result<u128, StrategyError> {
        Ok(self.book.read().position(account))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RequestState {
    Pending,
    Claimed,
}

#[derive(Clone, Debug)]
struct LockedRequest {
    owner: Address,
    assets: u128,
    unlock_at: u64,
    state: RequestState,
}

#[derive(Debug, Default)]
struct LockedBook {
    book: PositionBook,
    requests: HashMap<RequestId, LockedRequest>,
    next_id: u64,
}

/// Strategy whose withdrawals go through a request/claim cycle.
pub struct LockedStrategy {
    address: Address,
    ledger: Arc<InMemoryAssetLedger>,
    clock: Arc<dyn TimeSource>,
    lock_secs: u64,
    state: RwLock<LockedBook>,
}

impl LockedStrategy {
    /// Create a strategy whose requests unlock `lock_secs` after issue.
    pub fn new(
        address: Address,
        ledger: Arc<InMemoryAssetLedger>,
        clock: Arc<dyn TimeSource>,
        lock_secs: u64,
    ) -> Self {
        Self {
            address,
            ledger,
            clock,
            lock_secs,
            state: RwLock::new(LockedBook {
                next_id: 1,
                ..LockedBook::default()
            }),
        }
    }

    /// Simulate yield on `account`'s position.
    pub fn accrue_yield(&self, account: Address, amount: u128) -> Result<(), StrategyError> {
        self.ledger.mint(self.address, amount)?;
        let mut state = self.state.write();
        state.book.accounted += amount;
        *state.book.positions.entry(account).or_insert(0) += amount;
        Ok(())
    }

    /// Unlock time of a request.
    pub fn unlock_time(&self, request_id: RequestId) -> Option<u64> {
        self.state.read().requests.get(&request_id).map(|r| r.unlock_at)
    }

    /// Number of requests not yet claimed.
    pub fn pending_request_count(&self) -> usize {
        self.state
            .read()
            .requests
            .values()
            .filter(|r| r.state == RequestState::Pending)
            .count()
    }
}

impl StrategyAdapter for LockedStrategy {
    fn address(&self) -> Address {
        self.address
    }

    fn asset(&self) -> Address {
        self.ledger.asset()
    }

    fn liquidity(&self) -> LiquidityClass {
        LiquidityClass::Locked
    }

    fn deposit(&self, depositor: Address, assets: u128) -> Result<u128, StrategyError> {
        let held = self.ledger.balance_of(self.address);
        self.state
            .write()
            .book
            .credit_funded(held, depositor, assets)?;
        Ok(assets)
    }

    fn withdraw(&self, _owner: Address, _assets: u128, _to: Address) -> Result<u128, StrategyError> {
        Err(StrategyError::Unsupported {
            operation: "withdraw",
        })
    }

    fn request_withdraw(&self, owner: Address, assets: u128) -> Result<RequestId, StrategyError> {
        let mut state = self.state.write();
        state.book.debit(owner, assets)?;

        let request_id = RequestId(state.next_id);
        state.next_id += 1;
        let unlock_at = self.clock.now().saturating_add(self.lock_secs);
        state.requests.insert(
            request_id,
            LockedRequest {
                owner,
                assets,
                unlock_at,
                state: RequestState::Pending,
            },
        );

        info!(strategy = ?self.address, %request_id, assets, unlock_at, "withdrawal requested");
        Ok(request_id)
    }

    fn claim_withdraw(
        &self,
        owner: Address,
        request_id: RequestId,
        to: Address,
    ) -> Result<u128, StrategyError> {
        let mut state = self.state.write();
        let request = state
            .requests
            .get(&request_id)
            .cloned()
            .ok_or(StrategyError::RequestNotFound(request_id))?;

        if request.owner != owner {
            return Err(StrategyError::NotRequestOwner(request_id));
        }
        if request.state == RequestState::Claimed {
            return Err(StrategyError::AlreadyClaimed(request_id));
        }
        let now = self.clock.now();
        if now < request.unlock_at {
            return Err(StrategyError::NotYetClaimable {
                request_id,
                unlock_at: request.unlock_at,
                now,
            });
        }

        self.ledger.transfer(self.address, to, request.assets)?;
        state.book.accounted -= request.assets;
        if let Some(r) = state.requests.get_mut(&request_id) {
            r.state = RequestState::Claimed;
        }

        debug!(strategy = ?self.address, %request_id, assets = request.assets, "request claimed");
        Ok(request.assets)
    }

    fn total_assets_of(&self, account: Address) -> Result<u128, StrategyError> {
        Ok(self.state.read().book.position(account))
    }
}
