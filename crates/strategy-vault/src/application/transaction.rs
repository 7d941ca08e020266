//! # Vault Transaction
//!
//! Unit of work around one mutating vault call.
//!
//! Vault-owned state is restored from a snapshot. Effects on collaborators
//! are undone by replaying compensations in reverse. Events are buffered and
//! only published on commit.
//!
//! A request already issued by a locked strategy cannot be cancelled, so on
//! rollback it is re-recorded under the vault's own address and surfaces as
//! `RequestRecovered`. A later `claim` returns those assets to idle.

use crate::domain::{Address, LedgerError, RequestId, VaultError, VaultEvent, VaultState};
use crate::ports::outbound::{AssetLedger, SharesLedger, StrategyAdapter, VaultEventSink};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Undo record for one effect on a collaborator.
enum Compensation {
    /// Undo a burn.
    Mint { to: Address, shares: u128 },
    /// Undo a mint.
    Burn { from: Address, shares: u128 },
    /// Undo an allowance spend.
    RestoreAllowance {
        owner: Address,
        spender: Address,
        amount: u128,
    },
    /// Undo an asset transfer by moving the tokens back.
    ReverseTransfer {
        from: Address,
        to: Address,
        amount: u128,
    },
    /// Undo a credited strategy deposit by pulling it back out.
    Recall {
        adapter: Arc<dyn StrategyAdapter>,
        amount: u128,
    },
    /// Undo an instant pull by depositing the assets again.
    Redeposit {
        adapter: Arc<dyn StrategyAdapter>,
        amount: u128,
    },
}

/// One open unit of work.
pub struct VaultTransaction<'a> {
    vault: Address,
    snapshot: VaultState,
    shares: &'a dyn SharesLedger,
    assets: &'a dyn AssetLedger,
    compensations: Vec<Compensation>,
    events: Vec<VaultEvent>,
    issued: Vec<(Address, RequestId, u128)>,
}

impl<'a> VaultTransaction<'a> {
    /// Open a transaction, snapshotting `state`.
    pub fn begin(
        vault: Address,
        state: &VaultState,
        shares: &'a dyn SharesLedger,
        assets: &'a dyn AssetLedger,
    ) -> Self {
        Self {
            vault,
            snapshot: state.clone(),
            shares,
            assets,
            compensations: Vec::new(),
            events: Vec::new(),
            issued: Vec::new(),
        }
    }

    /// Buffer an event for publication on commit.
    pub fn emit(&mut self, event: VaultEvent) {
        self.events.push(event);
    }

    /// Events buffered so far.
    pub fn pending_events(&self) -> &[VaultEvent] {
        &self.events
    }

    /// Mint shares; undone by burning them.
    pub fn mint_shares(&mut self, to: Address, shares: u128) -> Result<(), VaultError> {
        self.shares.mint(to, shares)?;
        self.compensations
            .push(Compensation::Burn { from: to, shares });
        Ok(())
    }

    /// Burn shares; undone by minting them back.
    pub fn burn_shares(&mut self, from: Address, shares: u128) -> Result<(), VaultError> {
        self.shares.burn(from, shares)?;
        self.compensations
            .push(Compensation::Mint { to: from, shares });
        Ok(())
    }

    /// Spend `shares` of allowance, mapping a shortfall to the vault's own error.
    pub fn spend_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        shares: u128,
    ) -> Result<(), VaultError> {
        let before = self.shares.allowance(owner, spender);
        self.shares
            .spend_allowance(owner, spender, shares)
            .map_err(|e| match e {
                LedgerError::InsufficientAllowance {
                    required,
                    available,
                    ..
                } => VaultError::InsufficientAllowance {
                    required,
                    available,
                },
                other => other.into(),
            })?;
        self.compensations.push(Compensation::RestoreAllowance {
            owner,
            spender,
            amount: before,
        });
        Ok(())
    }

    /// Move assets; undone by moving them back.
    pub fn transfer_assets(
        &mut self,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), VaultError> {
        if amount == 0 {
            return Ok(());
        }
        self.assets.transfer(from, to, amount)?;
        self.compensations.push(Compensation::ReverseTransfer {
            from: to,
            to: from,
            amount,
        });
        Ok(())
    }

    /// Move idle assets into a strategy and credit the vault there.
    pub fn push_to_strategy(
        &mut self,
        adapter: &Arc<dyn StrategyAdapter>,
        amount: u128,
    ) -> Result<(), VaultError> {
        if amount == 0 {
            return Ok(());
        }
        self.transfer_assets(self.vault, adapter.address(), amount)?;
        adapter.deposit(self.vault, amount)?;
        // The credited position now backs the tokens; recall replaces the raw reversal.
        self.compensations.pop();
        self.compensations.push(Compensation::Recall {
            adapter: adapter.clone(),
            amount,
        });
        Ok(())
    }

    /// Pull `amount` from an instant strategy into the vault.
    ///
    /// Delivery is measured on the vault's asset balance. Less than `amount`
    /// fails with `StrategyShortfall`. Returns the measured delivery.
    pub fn pull_from_strategy(
        &mut self,
        adapter: &Arc<dyn StrategyAdapter>,
        amount: u128,
    ) -> Result<u128, VaultError> {
        let before = self.assets.balance_of(self.vault);
        adapter.withdraw(self.vault, amount, self.vault)?;
        let delivered = self.assets.balance_of(self.vault).saturating_sub(before);
        self.compensations.push(Compensation::Redeposit {
            adapter: adapter.clone(),
            amount: delivered.min(amount),
        });
        if delivered < amount {
            return Err(VaultError::StrategyShortfall {
                strategy: adapter.address(),
                requested: amount,
                delivered,
            });
        }
        Ok(delivered)
    }

    /// Note a request issued by a locked strategy in this transaction.
    pub fn note_issued(&mut self, strategy: Address, request_id: RequestId, assets: u128) {
        self.issued.push((strategy, request_id, assets));
    }

    /// Publish buffered events in order.
    ///
    /// The operation has already taken effect, so sink failures are logged
    /// and not returned.
    pub fn commit(self, sink: &dyn VaultEventSink) {
        debug!(events = self.events.len(), "committing vault transaction");
        publish_all(sink, &self.events);
    }

    /// Undo everything: restore the snapshot, replay compensations in
    /// reverse, drop buffered events and recover issued requests.
    pub fn rollback(self, state: &mut VaultState, sink: &dyn VaultEventSink) {
        let Self {
            vault,
            snapshot,
            shares,
            assets,
            compensations,
            events,
            issued,
        } = self;

        *state = snapshot;
        warn!(
            compensations = compensations.len(),
            dropped_events = events.len(),
            issued_requests = issued.len(),
            "rolling back vault transaction"
        );

        for compensation in compensations.into_iter().rev() {
            if let Err(e) = undo(compensation, vault, shares, assets) {
                error!(error = %e, "compensation failed during rollback");
            }
        }

        let mut recovered = Vec::with_capacity(issued.len());
        for (strategy, request_id, amount) in issued {
            match state.claims.record(strategy, request_id, vault, amount) {
                Ok(()) => recovered.push(VaultEvent::RequestRecovered {
                    strategy,
                    request_id,
                    assets: amount,
                }),
                Err(e) => error!(?strategy, %request_id, error = %e, "could not recover request"),
            }
        }
        publish_all(sink, &recovered);
    }
}

fn undo(
    compensation: Compensation,
    vault: Address,
    shares: &dyn SharesLedger,
    assets: &dyn AssetLedger,
) -> Result<(), VaultError> {
    match compensation {
        Compensation::Mint { to, shares: amount } => shares.mint(to, amount)?,
        Compensation::Burn { from, shares: amount } => shares.burn(from, amount)?,
        Compensation::RestoreAllowance {
            owner,
            spender,
            amount,
        } => shares.approve(owner, spender, amount)?,
        Compensation::ReverseTransfer { from, to, amount } => assets.transfer(from, to, amount)?,
        Compensation::Recall { adapter, amount } => {
            if adapter.is_instant() {
                adapter.withdraw(vault, amount, vault)?;
            } else {
                // Locked positions cannot be pulled synchronously; the value stays in the strategy.
                warn!(strategy = ?adapter.address(), amount, "deposit left in locked strategy");
            }
        }
        Compensation::Redeposit { adapter, amount } => {
            if amount > 0 {
                assets.transfer(vault, adapter.address(), amount)?;
                adapter.deposit(vault, amount)?;
            }
        }
    }
    Ok(())
}

fn publish_all(sink: &dyn VaultEventSink, events: &[VaultEvent]) {
    for event in events {
        if let Err(e) = sink.publish(event) {
            warn!(event = event.name(), error = %e, "event publish failed");
        }
    }
}
