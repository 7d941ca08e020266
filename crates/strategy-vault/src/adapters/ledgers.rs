//! In-memory asset and shares ledgers.
//!
//! Implement `AssetLedger` and `SharesLedger` for tests and simulations.

use crate::domain::{Address, LedgerError};
use crate::ports::outbound::{AssetLedger, SharesLedger};
use parking_lot::RwLock;
use std::collections::HashMap;

fn debit(
    balances: &mut HashMap<Address, u128>,
    account: Address,
    amount: u128,
) -> Result<(), LedgerError> {
    let available = balances.get(&account).copied().unwrap_or(0);
    if available < amount {
        return Err(LedgerError::InsufficientBalance {
            account,
            required: amount,
            available,
        });
    }
    let remaining = available - amount;
    if remaining == 0 {
        balances.remove(&account);
    } else {
        balances.insert(account, remaining);
    }
    Ok(())
}

fn credit(
    balances: &mut HashMap<Address, u128>,
    account: Address,
    amount: u128,
) -> Result<(), LedgerError> {
    if amount == 0 {
        return Ok(());
    }
    let balance = balances.entry(account).or_insert(0);
    *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
    Ok(())
}

/// In-memory ledger of one fungible asset.
pub struct InMemoryAssetLedger {
    asset: Address,
    balances: RwLock<HashMap<Address, u128>>,
}

impl InMemoryAssetLedger {
    /// Create an empty ledger for `asset`.
    pub fn new(asset: Address) -> Self {
        Self {
            asset,
            balances: RwLock::new(HashMap::new()),
        }
    }

    /// Create tokens out of thin air (faucet).
    pub fn mint(&self, to: Address, amount: u128) -> Result<(), LedgerError> {
        credit(&mut self.balances.write(), to, amount)
    }

    /// Destroy tokens.
    pub fn burn(&self, from: Address, amount: u128) -> Result<(), LedgerError> {
        debit(&mut self.balances.write(), from, amount)
    }
}

impl AssetLedger for InMemoryAssetLedger {
    fn asset(&self) -> Address {
        self.asset
    }

    fn balance_of(&self, account: Address) -> u128 {
        self.balances.read().get(&account).copied().unwrap_or(0)
    }

    fn transfer(&self, from: Address, to: Address, amount: u128) -> Result<(), LedgerError> {
        let mut balances = self.balances.write();
        // Check the destination first so a failed credit never leaves a debit behind.
        let to_balance = balances.get(&to).copied().unwrap_or(0);
        if from != to && to_balance.checked_add(amount).is_none() {
            return Err(LedgerError::Overflow);
        }
        debit(&mut balances, from, amount)?;
        credit(&mut balances, to, amount)
    }
}

#[derive(Default)]
struct SharesBook {
    total_supply: u128,
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
}

/// In-memory shares ledger.
#[derive(Default)]
pub struct InMemorySharesLedger {
    book: RwLock<SharesBook>,
}

impl InMemorySharesLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move shares between holders.
    pub fn transfer(&self, from: Address, to: Address, amount: u128) -> Result<(), LedgerError> {
        let mut book = self.book.write();
        debit(&mut book.balances, from, amount)?;
        credit(&mut book.balances, to, amount)
    }
}

impl SharesLedger for InMemorySharesLedger {
    fn total_supply(&self) -> u128 {
        self.book.read().total_supply
    }

    fn balance_of(&self, account: Address) -> u128 {
        self.book.read().balances.get(&account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: Address, spender: Address) -> u128 {
        self.book
            .read()
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&self, owner: Address, spender: Address, amount: u128) -> Result<(), LedgerError> {
        let mut book = self.book.write();
        if amount == 0 {
            book.allowances.remove(&(owner, spender));
        } else {
            book.allowances.insert((owner, spender), amount);
        }
        Ok(())
    }

    fn mint(&self, to: Address, amount: u128) -> Result<(), LedgerError> {
        let mut book = self.book.write();
        let supply = book
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        credit(&mut book.balances, to, amount)?;
        book.total_supply = supply;
        Ok(())
    }

    fn burn(&self, from: Address, amount: u128) -> Result<(), LedgerError> {
        let mut book = self.book.write();
        debit(&mut book.balances, from, amount)?;
        book.total_supply -= amount;
        Ok(())
    }

    fn spend_allowance(
        &self,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let mut book = self.book.write();
        let available = book
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(0);
        if available == u128::MAX {
            return Ok(());
        }
        if available < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner,
                spender,
                required: amount,
                available,
            });
        }
        book.allowances.insert((owner, spender), available - amount);
        Ok(())
    }
}
