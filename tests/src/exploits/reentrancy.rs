//! # Reentrancy
//!
//! A strategy that calls back into the vault from inside `deposit` or
//! `withdraw`. The nested call must fail with `Reentrancy` and the outer
//! operation must complete untouched.

#[cfg(test)]
mod tests {
    use crate::fixtures::VaultFixture;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use strategy_vault::{
        Address, InstantStrategy, LiquidityClass, RequestId, SharesLedger, StrategyAdapter,
        StrategyError, StrategyVault, VaultApi, VaultError,
    };

    /// Instant strategy that re-enters the vault before doing its job.
    struct ReentrantStrategy {
        inner: Arc<InstantStrategy>,
        vault: Mutex<Option<Arc<StrategyVault>>>,
        attacker: Address,
        observed: Mutex<Vec<VaultError>>,
    }

    impl ReentrantStrategy {
        fn new(inner: Arc<InstantStrategy>, attacker: Address) -> Self {
            Self {
                inner,
                vault: Mutex::new(None),
                attacker,
                observed: Mutex::new(Vec::new()),
            }
        }

        fn arm(&self, vault: Arc<StrategyVault>) {
            *self.vault.lock() = Some(vault);
        }

        /// Rebalance with the attack disarmed, then re-arm.
        fn arm_after_rebalance(&self, f: &VaultFixture) {
            let vault = self.vault.lock().take();
            f.vault.rebalance(f.admin).unwrap();
            *self.vault.lock() = vault;
        }

        fn attack(&self) {
            let Some(vault) = self.vault.lock().clone() else {
                return;
            };
            let attempts = [
                vault
                    .redeem(self.attacker, 1, self.attacker, self.attacker)
                    .map(|_| ()),
                vault.deposit(self.attacker, 1, self.attacker).map(|_| ()),
                vault.total_managed_value().map(|_| ()),
            ];
            let mut observed = self.observed.lock();
            for attempt in attempts {
                if let Err(e) = attempt {
                    observed.push(e);
                }
            }
        }

        fn observed(&self) -> Vec<VaultError> {
            self.observed.lock().clone()
        }
    }

    impl StrategyAdapter for ReentrantStrategy {
        fn address(&self) -> Address {
            self.inner.address()
        }

        fn asset(&self) -> Address {
            self.inner.asset()
        }

        fn liquidity(&self) -> LiquidityClass {
            LiquidityClass::Instant
        }

        fn deposit(&self, depositor: Address, assets: u128) -> Result<u128, StrategyError> {
            self.attack();
            self.inner.deposit(depositor, assets)
        }

        fn withdraw(&self, owner: Address, assets: u128, to: Address) -> Result<u128, StrategyError> {
            self.attack();
            self.inner.withdraw(owner, assets, to)
        }

        fn request_withdraw(&self, owner: Address, assets: u128) -> Result<RequestId, StrategyError> {
            self.inner.request_withdraw(owner, assets)
        }

        fn claim_withdraw(
            &self,
            owner: Address,
            request_id: RequestId,
            to: Address,
        ) -> Result<u128, StrategyError> {
            self.inner.claim_withdraw(owner, request_id, to)
        }

        fn total_assets_of(&self, account: Address) -> Result<u128, StrategyError> {
            self.inner.total_assets_of(account)
        }
    }

    fn setup() -> (VaultFixture, Arc<ReentrantStrategy>, Address, Address) {
        let f = VaultFixture::new();
        let user = f.user(1, 1_000);
        let attacker = f.user(666, 1_000);
        let strategy = Arc::new(ReentrantStrategy::new(f.instant(10), attacker));
        f.add(strategy.clone(), 10_000);
        f.allocate(&[10_000]);

        f.vault.deposit(attacker, 100, attacker).unwrap();
        f.vault.deposit(user, 1_000, user).unwrap();
        strategy.arm(f.vault.clone());
        (f, strategy, user, attacker)
    }

    #[test]
    fn test_reentry_during_rebalance_rejected() {
        let (f, strategy, _, attacker) = setup();
        assert_eq!(f.vault.rebalance(f.admin).unwrap(), 1_100);

        assert_eq!(strategy.observed(), vec![VaultError::Reentrancy; 3]);
        assert_eq!(f.shares.balance_of(attacker), 100);
        assert_eq!(f.vault.total_managed_value().unwrap(), 1_100);
    }

    #[test]
    fn test_reentry_during_withdrawal_rejected() {
        let (f, strategy, user, attacker) = setup();
        strategy.arm_after_rebalance(&f);

        let receipt = f.vault.redeem(user, 1_000, user, user).unwrap();
        assert_eq!(receipt.paid, 1_000);
        assert_eq!(strategy.observed(), vec![VaultError::Reentrancy; 3]);
        assert_eq!(f.shares.balance_of(attacker), 100);
        assert_eq!(f.shares.total_supply(), 100);
        assert_eq!(f.vault.total_managed_value().unwrap(), 100);
    }

    #[test]
    fn test_vault_usable_after_rejected_reentry() {
        let (f, strategy, _, attacker) = setup();
        f.vault.rebalance(f.admin).unwrap();
        *strategy.vault.lock() = None;

        assert!(f.vault.redeem(attacker, 100, attacker, attacker).is_ok());
    }
}
