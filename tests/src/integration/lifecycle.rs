//! # Vault Lifecycle
//!
//! Deposit, rebalance, appreciate, redeem across instant and locked
//! strategies, then claim the queued remainder after the lock expires.

#[cfg(test)]
mod tests {
    use crate::fixtures::{VaultFixture, LOCK_SECS};
    use strategy_vault::{
        AssetLedger, SharesLedger, StrategyAdapter, StrategyError, VaultApi, VaultError,
        VaultEvent,
    };

    // =============================================================================
    // SCENARIO: 60/40 INSTANT + LOCKED
    // =============================================================================

    #[test]
    fn test_instant_plus_locked_full_cycle() {
        let f = VaultFixture::new();
        let user = f.user(1, 10_000);
        let instant = f.instant(10);
        let locked = f.locked(11);
        f.add(instant.clone(), 10_000);
        f.add(locked.clone(), 10_000);
        f.allocate(&[6000, 4000]);

        // Deposit and push out.
        assert_eq!(f.vault.deposit(user, 1_000, user).unwrap(), 1_000);
        assert_eq!(f.vault.rebalance(f.admin).unwrap(), 1_000);
        assert_eq!(instant.total_assets_of(f.vault_address()).unwrap(), 600);
        assert_eq!(locked.total_assets_of(f.vault_address()).unwrap(), 400);

        // Instant strategy appreciates 600 -> 660.
        instant.accrue_yield(f.vault_address(), 60).unwrap();
        assert_eq!(f.vault.total_managed_value().unwrap(), 1_060);

        // Redeem everything: instant pays now, locked is queued.
        f.events.take();
        let receipt = f.vault.redeem(user, 1_000, user, user).unwrap();
        assert_eq!(receipt.assets, 1_059);
        assert_eq!(receipt.paid, 660);
        assert_eq!(receipt.queued_total(), 399);
        assert_eq!(receipt.queued.len(), 1);
        assert_eq!(receipt.queued[0].strategy, locked.address());
        assert_eq!(f.ledger.balance_of(user), 9_000 + 660);
        assert_eq!(f.shares.balance_of(user), 0);
        assert_eq!(f.vault.pending_of(user).unwrap(), 399);
        assert_eq!(
            f.vault
                .request_owner(locked.address(), receipt.queued[0].request_id)
                .unwrap(),
            Some(user)
        );
        assert_eq!(f.events.names(), vec!["withdrawal_queued", "withdrawn"]);

        // Too early.
        let request_id = receipt.queued[0].request_id;
        let early = f.vault.claim(request_id, locked.address());
        assert!(matches!(
            early,
            Err(VaultError::Strategy(StrategyError::NotYetClaimable { .. }))
        ));
        assert_eq!(f.vault.pending_of(user).unwrap(), 399);
        assert_eq!(f.vault.open_requests(user).unwrap().len(), 1);

        // After the lock.
        f.clock.advance(LOCK_SECS);
        assert_eq!(f.vault.claim(request_id, locked.address()).unwrap(), 399);
        assert_eq!(f.ledger.balance_of(user), 9_000 + 660 + 399);
        assert_eq!(f.vault.pending_of(user).unwrap(), 0);
        assert!(f.vault.open_requests(user).unwrap().is_empty());
        assert!(matches!(
            f.events.events().last(),
            Some(VaultEvent::ClaimSettled { assets: 399, .. })
        ));

        // Claiming twice fails at the vault, before reaching the strategy.
        assert!(matches!(
            f.vault.claim(request_id, locked.address()),
            Err(VaultError::UnknownRequest { .. })
        ));
    }

    #[test]
    fn test_claim_is_permissionless_and_pays_owner() {
        let f = VaultFixture::new();
        let user = f.user(1, 1_000);
        let locked = f.locked(11);
        f.add(locked.clone(), 10_000);
        f.allocate(&[10_000]);
        f.vault.deposit(user, 1_000, user).unwrap();
        f.vault.rebalance(f.admin).unwrap();

        let receipt = f.vault.redeem(user, 500, user, user).unwrap();
        assert_eq!(receipt.paid, 0);
        f.clock.advance(LOCK_SECS);

        // Anyone triggers; the recorded owner is paid.
        let keeper_balance = f.ledger.balance_of(f.admin);
        f.vault
            .claim(receipt.queued[0].request_id, locked.address())
            .unwrap();
        assert_eq!(f.ledger.balance_of(user), 500);
        assert_eq!(f.ledger.balance_of(f.admin), keeper_balance);
    }

    // =============================================================================
    // ROUND TRIPS
    // =============================================================================

    #[test]
    fn test_deposit_redeem_round_trip() {
        let f = VaultFixture::new();
        let user = f.user(1, 5_000);
        let shares = f.vault.deposit(user, 5_000, user).unwrap();
        let receipt = f.vault.redeem(user, shares, user, user).unwrap();
        assert_eq!(receipt.paid, 5_000);
        assert_eq!(f.ledger.balance_of(user), 5_000);
        assert_eq!(f.shares.total_supply(), 0);
    }

    #[test]
    fn test_round_trip_through_instant_strategy() {
        let f = VaultFixture::with_config(|c| c.auto_rebalance_on_deposit = true);
        let user = f.user(1, 7_777);
        let instant = f.instant(10);
        f.add(instant.clone(), 10_000);
        f.allocate(&[10_000]);

        let shares = f.vault.deposit(user, 7_777, user).unwrap();
        assert_eq!(f.vault.idle_balance(), 0);
        let receipt = f.vault.redeem(user, shares, user, user).unwrap();
        assert!(receipt.is_fully_paid());
        assert!(7_777 - f.ledger.balance_of(user) <= 1);
    }

    #[test]
    fn test_mint_then_withdraw_exact_assets() {
        let f = VaultFixture::with_config(|c| c.decimals_offset = 6);
        let user = f.user(1, 10_000);
        let assets = f.vault.mint(user, 3_000_000_000, user).unwrap();
        assert_eq!(assets, 3_000);

        let before = f.shares.balance_of(user);
        let preview = f.vault.preview_withdraw(1_000).unwrap();
        let receipt = f.vault.withdraw(user, 1_000, user, user).unwrap();
        assert_eq!(receipt.shares_burned, preview);
        assert_eq!(f.shares.balance_of(user), before - preview);
        assert_eq!(receipt.paid, 1_000);
    }

    #[test]
    fn test_pending_tracks_open_requests_across_users() {
        let f = VaultFixture::new();
        let alice = f.user(1, 3_000);
        let bob = f.user(2, 3_000);
        let locked = f.locked(11);
        f.add(locked.clone(), 10_000);
        f.allocate(&[10_000]);
        f.vault.deposit(alice, 3_000, alice).unwrap();
        f.vault.deposit(bob, 3_000, bob).unwrap();
        f.vault.rebalance(f.admin).unwrap();

        let a1 = f.vault.redeem(alice, 1_000, alice, alice).unwrap();
        let b1 = f.vault.redeem(bob, 500, bob, bob).unwrap();
        let a2 = f.vault.redeem(alice, 700, alice, alice).unwrap();

        let check = |owner| {
            let open: u128 = f
                .vault
                .open_requests(owner)
                .unwrap()
                .iter()
                .map(|&(_, _, assets)| assets)
                .sum();
            assert_eq!(f.vault.pending_of(owner).unwrap(), open);
        };
        check(alice);
        check(bob);
        assert_eq!(
            f.vault.pending_of(alice).unwrap(),
            a1.queued_total() + a2.queued_total()
        );

        f.clock.advance(LOCK_SECS);
        f.vault.claim(a1.queued[0].request_id, locked.address()).unwrap();
        check(alice);
        f.vault.claim(b1.queued[0].request_id, locked.address()).unwrap();
        check(bob);
        assert_eq!(f.vault.pending_of(bob).unwrap(), 0);
        assert_eq!(f.vault.pending_of(alice).unwrap(), a2.queued_total());
    }

    #[test]
    fn test_concurrent_deposits_serialize() {
        let f = VaultFixture::new();
        let users: Vec<_> = (1..=8).map(|i| f.user(i, 1_000)).collect();

        std::thread::scope(|scope| {
            for &user in &users {
                let vault = f.vault.clone();
                scope.spawn(move || {
                    for _ in 0..10 {
                        vault.deposit(user, 100, user).unwrap();
                    }
                });
            }
        });

        assert_eq!(f.vault.idle_balance(), 8_000);
        assert_eq!(f.shares.total_supply(), 8_000);
        for user in users {
            assert_eq!(f.shares.balance_of(user), 1_000);
        }
    }
}
