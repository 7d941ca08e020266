//! Strategy Vault Service
//!
//! Main service implementing `VaultApi`.
//!
//! Every mutating call runs as one `VaultTransaction` while holding the
//! vault's state lock. A strategy that calls back into the vault during an
//! operation finds the state already borrowed and gets `Reentrancy`.

use super::transaction::VaultTransaction;
use crate::algorithms::{
    collect_sources, plan_rebalance, plan_withdrawal, planned_total, strategy_snapshots,
    total_liquidity, total_managed_value, ShareMath,
};
use crate::config::{ConfigError, VaultConfig};
use crate::domain::{
    invariant_pending_consistent, invariant_weight_sum, Address, Bps, QueuedWithdrawal,
    RequestId, Role, Rounding, StrategySnapshot, VaultError, VaultEvent, VaultState,
    WithdrawalReceipt,
};
use crate::ports::inbound::VaultApi;
use crate::ports::outbound::{
    AccessControl, AssetLedger, PauseState, SharesLedger, StrategyAdapter, VaultEventSink,
};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Collaborators the vault is wired to.
#[derive(Clone)]
pub struct VaultPorts {
    /// Ledger of the underlying asset.
    pub assets: Arc<dyn AssetLedger>,
    /// Ledger of vault shares.
    pub shares: Arc<dyn SharesLedger>,
    /// Role storage.
    pub access: Arc<dyn AccessControl>,
    /// Pause flag.
    pub pause: Arc<dyn PauseState>,
    /// Committed event delivery.
    pub events: Arc<dyn VaultEventSink>,
}

/// Multi-strategy vault.
///
/// Orchestrates one operation at a time:
/// 1. Acquire the state lock (rejecting same-thread re-entry)
/// 2. Check roles, pause flag and amounts
/// 3. Plan from a read-only snapshot
/// 4. Commit effects through a `VaultTransaction`
/// 5. Publish events, or roll everything back
pub struct StrategyVault {
    config: VaultConfig,
    state: ReentrantMutex<RefCell<VaultState>>,
    ports: VaultPorts,
}

impl StrategyVault {
    /// Build a vault from a validated config.
    pub fn new(config: VaultConfig, ports: VaultPorts) -> Result<Self, ConfigError> {
        config.validate()?;
        let actual = ports.assets.asset();
        if actual != config.asset {
            return Err(ConfigError::LedgerAssetMismatch {
                expected: config.asset,
                actual,
            });
        }

        info!(
            vault = ?config.vault_address,
            asset = ?config.asset,
            max_strategies = config.max_strategies,
            "Strategy vault initialized"
        );

        Ok(Self {
            config,
            state: ReentrantMutex::new(RefCell::new(VaultState::default())),
            ports,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Address the vault holds assets under.
    pub fn address(&self) -> Address {
        self.config.vault_address
    }

    fn require_role(&self, role: Role, caller: Address) -> Result<(), VaultError> {
        if self.ports.access.has_role(role, caller) {
            Ok(())
        } else {
            Err(VaultError::Unauthorized {
                role,
                account: caller,
            })
        }
    }

    fn require_unpaused(&self) -> Result<(), VaultError> {
        if self.ports.pause.is_paused() {
            return Err(VaultError::Paused);
        }
        Ok(())
    }

    fn idle(&self) -> u128 {
        self.ports.assets.balance_of(self.address())
    }

    fn share_math(&self, state: &VaultState) -> Result<ShareMath, VaultError> {
        let total_assets = total_managed_value(self.idle(), &state.table, self.address())?;
        Ok(ShareMath::new(
            total_assets,
            self.ports.shares.total_supply(),
            self.config.decimals_offset,
        ))
    }

    fn adapter_at(
        &self,
        state: &VaultState,
        index: usize,
    ) -> Result<Arc<dyn StrategyAdapter>, VaultError> {
        state
            .table
            .get(index)
            .map(|entry| entry.adapter.clone())
            .ok_or(VaultError::UnknownStrategy(index))
    }

    /// Run a read against vault state.
    fn read<T>(&self, f: impl FnOnce(&VaultState) -> Result<T, VaultError>) -> Result<T, VaultError> {
        let guard = self.state.lock();
        let state = guard.try_borrow().map_err(|_| VaultError::Reentrancy)?;
        f(&state)
    }

    /// Run a mutating operation as one transaction.
    fn transact<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut VaultState, &mut VaultTransaction<'_>) -> Result<T, VaultError>,
    ) -> Result<T, VaultError> {
        let guard = self.state.lock();
        let mut state = guard.try_borrow_mut().map_err(|_| {
            warn!(operation, "Re-entrant vault call rejected");
            VaultError::Reentrancy
        })?;

        let mut tx = VaultTransaction::begin(
            self.address(),
            &state,
            &*self.ports.shares,
            &*self.ports.assets,
        );
        match f(&mut state, &mut tx) {
            Ok(value) => {
                tx.commit(&*self.ports.events);
                Ok(value)
            }
            Err(e) => {
                warn!(operation, error = %e, "Vault operation failed");
                tx.rollback(&mut state, &*self.ports.events);
                Err(e)
            }
        }
    }

    /// Push idle capital into enabled strategies by target weight.
    fn push_idle(
        &self,
        state: &VaultState,
        tx: &mut VaultTransaction<'_>,
    ) -> Result<u128, VaultError> {
        let idle = self.idle();
        let plan = plan_rebalance(idle, &state.table)?;
        for deposit in &plan {
            let adapter = self.adapter_at(state, deposit.index)?;
            tx.push_to_strategy(&adapter, deposit.amount)?;
            debug!(
                strategy = ?adapter.address(),
                amount = deposit.amount,
                "Pushed idle capital"
            );
        }
        let pushed = planned_total(&plan);
        tx.emit(VaultEvent::Rebalanced { pushed, pulled: 0 });
        info!(idle_before = idle, pushed, "Rebalanced");
        Ok(pushed)
    }

    /// Pull `assets` into the vault and mint `shares` to `receiver`.
    fn enter(
        &self,
        state: &VaultState,
        tx: &mut VaultTransaction<'_>,
        caller: Address,
        assets: u128,
        shares: u128,
        receiver: Address,
    ) -> Result<(), VaultError> {
        tx.transfer_assets(caller, self.address(), assets)?;
        tx.mint_shares(receiver, shares)?;
        tx.emit(VaultEvent::Deposited {
            caller,
            receiver,
            assets,
            shares,
        });
        info!(?caller, ?receiver, assets, shares, "Deposited");

        if self.config.auto_rebalance_on_deposit {
            self.push_idle(state, tx)?;
        }
        Ok(())
    }

    /// Burn `shares` and source `assets` from idle, instant strategies and
    /// locked-strategy requests, in that order.
    #[allow(clippy::too_many_arguments)]
    fn settle(
        &self,
        state: &mut VaultState,
        tx: &mut VaultTransaction<'_>,
        caller: Address,
        assets: u128,
        shares: u128,
        receiver: Address,
        owner: Address,
    ) -> Result<WithdrawalReceipt, VaultError> {
        let vault = self.address();

        // Plan: reads only.
        let available = self.ports.shares.balance_of(owner);
        if available < shares {
            return Err(VaultError::InsufficientShares {
                required: shares,
                available,
            });
        }
        if caller != owner {
            let allowance = self.ports.shares.allowance(owner, caller);
            if allowance < shares {
                return Err(VaultError::InsufficientAllowance {
                    required: shares,
                    available: allowance,
                });
            }
        }
        let sources = collect_sources(&state.table, vault)?;
        let plan = plan_withdrawal(assets, self.idle(), &sources)?;
        debug!(
            assets,
            from_idle = plan.from_idle,
            instant = plan.instant_total(),
            queued = plan.queued_total(),
            "Withdrawal planned"
        );

        // Commit.
        if caller != owner {
            tx.spend_allowance(owner, caller, shares)?;
        }
        tx.burn_shares(owner, shares)?;

        for pull in &plan.instant {
            let adapter = self.adapter_at(state, pull.index)?;
            let delivered = tx.pull_from_strategy(&adapter, pull.amount)?;
            if delivered > pull.amount {
                warn!(
                    strategy = ?pull.strategy,
                    requested = pull.amount,
                    delivered,
                    "Strategy over-delivered, excess kept idle"
                );
            }
        }

        let mut queued = Vec::with_capacity(plan.queued.len());
        for request in &plan.queued {
            let adapter = self.adapter_at(state, request.index)?;
            let request_id = adapter.request_withdraw(vault, request.amount)?;
            tx.note_issued(request.strategy, request_id, request.amount);
            state
                .claims
                .record(request.strategy, request_id, owner, request.amount)?;
            tx.emit(VaultEvent::WithdrawalQueued {
                owner,
                assets: request.amount,
                request_id,
                strategy: request.strategy,
            });
            queued.push(QueuedWithdrawal {
                strategy: request.strategy,
                request_id,
                assets: request.amount,
            });
        }
        debug_assert!(invariant_pending_consistent(&state.claims, owner));

        let paid = plan.paid_now();
        tx.transfer_assets(vault, receiver, paid)?;

        let queued_total = plan.queued_total();
        tx.emit(VaultEvent::Withdrawn {
            caller,
            receiver,
            owner,
            assets,
            shares,
            paid,
            queued: queued_total,
        });
        info!(
            ?owner,
            ?receiver,
            assets,
            shares,
            paid,
            queued = queued_total,
            "Withdrawn"
        );

        Ok(WithdrawalReceipt {
            shares_burned: shares,
            assets,
            paid,
            queued,
        })
    }
}

impl VaultApi for StrategyVault {
    fn add_strategy(
        &self,
        caller: Address,
        adapter: Arc<dyn StrategyAdapter>,
        cap_weight: Bps,
    ) -> Result<usize, VaultError> {
        self.transact("add_strategy", |state, tx| {
            self.require_role(Role::Admin, caller)?;
            let index = state.table.add_entry(
                adapter.clone(),
                cap_weight,
                self.config.asset,
                self.config.max_strategies,
            )?;
            tx.emit(VaultEvent::StrategyAdded {
                index,
                strategy: adapter.address(),
                liquidity: adapter.liquidity(),
                cap_weight,
            });
            info!(
                index,
                strategy = ?adapter.address(),
                liquidity = ?adapter.liquidity(),
                cap_weight,
                "Strategy added"
            );
            Ok(index)
        })
    }

    fn set_strategy_enabled(
        &self,
        caller: Address,
        index: usize,
        enabled: bool,
    ) -> Result<(), VaultError> {
        self.transact("set_strategy_enabled", |state, tx| {
            self.require_role(Role::Admin, caller)?;
            state.table.set_enabled(index, enabled)?;
            let strategy = self.adapter_at(state, index)?.address();
            tx.emit(VaultEvent::StrategyToggled {
                index,
                strategy,
                enabled,
            });
            info!(index, ?strategy, enabled, "Strategy toggled");
            Ok(())
        })
    }

    fn set_allocations(&self, caller: Address, weights: &[Bps]) -> Result<(), VaultError> {
        self.transact("set_allocations", |state, tx| {
            self.require_role(Role::Manager, caller)?;
            let written = state.table.set_allocations(weights)?;
            debug_assert!(invariant_weight_sum(&state.table));
            info!(weights = ?written, "Allocations updated");
            tx.emit(VaultEvent::AllocationsUpdated { weights: written });
            Ok(())
        })
    }

    fn rebalance(&self, caller: Address) -> Result<u128, VaultError> {
        self.transact("rebalance", |state, tx| {
            self.require_role(Role::Manager, caller)?;
            self.push_idle(state, tx)
        })
    }

    fn pause(&self, caller: Address) -> Result<(), VaultError> {
        self.transact("pause", |_, tx| {
            self.require_role(Role::Pauser, caller)?;
            self.ports.pause.set_paused(true);
            tx.emit(VaultEvent::PauseChanged {
                caller,
                paused: true,
            });
            info!(?caller, "Vault paused");
            Ok(())
        })
    }

    fn unpause(&self, caller: Address) -> Result<(), VaultError> {
        self.transact("unpause", |_, tx| {
            self.require_role(Role::Pauser, caller)?;
            self.ports.pause.set_paused(false);
            tx.emit(VaultEvent::PauseChanged {
                caller,
                paused: false,
            });
            info!(?caller, "Vault unpaused");
            Ok(())
        })
    }

    fn deposit(
        &self,
        caller: Address,
        assets: u128,
        receiver: Address,
    ) -> Result<u128, VaultError> {
        self.transact("deposit", |state, tx| {
            self.require_unpaused()?;
            if assets == 0 {
                return Err(VaultError::ZeroAmount);
            }
            let shares = self.share_math(state)?.to_shares(assets, Rounding::Down)?;
            if shares == 0 {
                return Err(VaultError::ZeroAmount);
            }
            self.enter(state, tx, caller, assets, shares, receiver)?;
            Ok(shares)
        })
    }

    fn mint(&self, caller: Address, shares: u128, receiver: Address) -> Result<u128, VaultError> {
        self.transact("mint", |state, tx| {
            self.require_unpaused()?;
            if shares == 0 {
                return Err(VaultError::ZeroAmount);
            }
            let assets = self.share_math(state)?.to_assets(shares, Rounding::Up)?;
            if assets == 0 {
                return Err(VaultError::ZeroAmount);
            }
            self.enter(state, tx, caller, assets, shares, receiver)?;
            Ok(assets)
        })
    }

    fn withdraw(
        &self,
        caller: Address,
        assets: u128,
        receiver: Address,
        owner: Address,
    ) -> Result<WithdrawalReceipt, VaultError> {
        self.transact("withdraw", |state, tx| {
            self.require_unpaused()?;
            if assets == 0 {
                return Err(VaultError::ZeroAmount);
            }
            let shares = self.share_math(state)?.to_shares(assets, Rounding::Up)?;
            self.settle(state, tx, caller, assets, shares, receiver, owner)
        })
    }

    fn redeem(
        &self,
        caller: Address,
        shares: u128,
        receiver: Address,
        owner: Address,
    ) -> Result<WithdrawalReceipt, VaultError> {
        self.transact("redeem", |state, tx| {
            self.require_unpaused()?;
            if shares == 0 {
                return Err(VaultError::ZeroAmount);
            }
            let assets = self.share_math(state)?.to_assets(shares, Rounding::Down)?;
            if assets == 0 {
                return Err(VaultError::ZeroAmount);
            }
            self.settle(state, tx, caller, assets, shares, receiver, owner)
        })
    }

    fn claim(&self, request_id: RequestId, strategy: Address) -> Result<u128, VaultError> {
        self.transact("claim", |state, tx| {
            self.require_unpaused()?;
            let request = state.claims.take(strategy, request_id)?;
            let adapter = state
                .table
                .find(strategy)
                .map(|entry| entry.adapter.clone())
                .ok_or(VaultError::UnknownRequest {
                    strategy,
                    request_id,
                })?;

            let claimed = adapter.claim_withdraw(self.address(), request_id, request.owner)?;
            state.claims.release(request.owner, request.assets);
            debug_assert!(invariant_pending_consistent(&state.claims, request.owner));
            if claimed != request.assets {
                warn!(
                    ?strategy,
                    %request_id,
                    recorded = request.assets,
                    claimed,
                    "Claim amount differs from recorded request"
                );
            }

            tx.emit(VaultEvent::ClaimSettled {
                owner: request.owner,
                assets: claimed,
                request_id,
                strategy,
            });
            info!(owner = ?request.owner, ?strategy, %request_id, claimed, "Claim settled");
            Ok(claimed)
        })
    }

    fn total_managed_value(&self) -> Result<u128, VaultError> {
        self.read(|state| total_managed_value(self.idle(), &state.table, self.address()))
    }

    fn idle_balance(&self) -> u128 {
        self.idle()
    }

    fn available_liquidity(&self) -> Result<u128, VaultError> {
        self.read(|state| {
            let sources = collect_sources(&state.table, self.address())?;
            Ok(total_liquidity(self.idle(), &sources))
        })
    }

    fn convert_to_assets(&self, shares: u128) -> Result<u128, VaultError> {
        self.read(|state| self.share_math(state)?.to_assets(shares, Rounding::Down))
    }

    fn convert_to_shares(&self, assets: u128) -> Result<u128, VaultError> {
        self.read(|state| self.share_math(state)?.to_shares(assets, Rounding::Down))
    }

    fn preview_deposit(&self, assets: u128) -> Result<u128, VaultError> {
        self.convert_to_shares(assets)
    }

    fn preview_mint(&self, shares: u128) -> Result<u128, VaultError> {
        self.read(|state| self.share_math(state)?.to_assets(shares, Rounding::Up))
    }

    fn preview_withdraw(&self, assets: u128) -> Result<u128, VaultError> {
        self.read(|state| self.share_math(state)?.to_shares(assets, Rounding::Up))
    }

    fn preview_redeem(&self, shares: u128) -> Result<u128, VaultError> {
        self.convert_to_assets(shares)
    }

    fn share_price(&self) -> Result<u128, VaultError> {
        self.read(|state| self.share_math(state)?.share_price())
    }

    fn max_withdraw(&self, owner: Address) -> Result<u128, VaultError> {
        if self.is_paused() {
            return Ok(0);
        }
        self.read(|state| {
            let math = self.share_math(state)?;
            let position =
                math.to_assets(self.ports.shares.balance_of(owner), Rounding::Down)?;
            let sources = collect_sources(&state.table, self.address())?;
            Ok(position.min(total_liquidity(self.idle(), &sources)))
        })
    }

    fn max_redeem(&self, owner: Address) -> Result<u128, VaultError> {
        if self.is_paused() {
            return Ok(0);
        }
        self.read(|state| {
            let math = self.share_math(state)?;
            let balance = self.ports.shares.balance_of(owner);
            let sources = collect_sources(&state.table, self.address())?;
            let liquidity = total_liquidity(self.idle(), &sources);
            if math.to_assets(balance, Rounding::Down)? <= liquidity {
                Ok(balance)
            } else {
                Ok(math.to_shares(liquidity, Rounding::Down)?.min(balance))
            }
        })
    }

    fn pending_of(&self, owner: Address) -> Result<u128, VaultError> {
        self.read(|state| Ok(state.claims.pending_of(owner)))
    }

    fn request_owner(
        &self,
        strategy: Address,
        request_id: RequestId,
    ) -> Result<Option<Address>, VaultError> {
        self.read(|state| Ok(state.claims.request(strategy, request_id).map(|r| r.owner)))
    }

    fn open_requests(&self, owner: Address) -> Result<Vec<(Address, RequestId, u128)>, VaultError> {
        self.read(|state| Ok(state.claims.open_requests(owner)))
    }

    fn strategies(&self) -> Result<Vec<StrategySnapshot>, VaultError> {
        self.read(|state| strategy_snapshots(&state.table, self.address()))
    }

    fn strategy_count(&self) -> Result<usize, VaultError> {
        self.read(|state| Ok(state.table.len()))
    }

    fn is_paused(&self) -> bool {
        self.ports.pause.is_paused()
    }
}
