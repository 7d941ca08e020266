//! # Allocation and Rebalance
//!
//! Weight validation, enable/disable handling and push-only rebalancing.

#[cfg(test)]
mod tests {
    use crate::fixtures::VaultFixture;
    use proptest::prelude::*;
    use strategy_vault::{
        address_from_low_u64, AssetLedger, Role, StrategyAdapter, VaultApi, VaultError,
        VaultEvent,
    };

    #[test]
    fn test_cap_exceeded_leaves_prior_weights() {
        let f = VaultFixture::new();
        f.add(f.instant(10), 5000);
        f.add(f.instant(11), 5000);
        f.allocate(&[5000, 5000]);
        f.events.take();

        assert_eq!(
            f.vault.set_allocations(f.admin, &[6000, 4000]),
            Err(VaultError::CapExceeded {
                index: 0,
                weight: 6000,
                cap: 5000
            })
        );
        let weights: Vec<_> = f
            .vault
            .strategies()
            .unwrap()
            .iter()
            .map(|s| s.target_weight)
            .collect();
        assert_eq!(weights, vec![5000, 5000]);
        assert!(f.events.events().is_empty());
    }

    #[test]
    fn test_add_strategy_rejects_foreign_asset() {
        let f = VaultFixture::new();
        let foreign = std::sync::Arc::new(strategy_vault::InMemoryAssetLedger::new(
            address_from_low_u64(0xBEEF),
        ));
        let strategy = std::sync::Arc::new(strategy_vault::InstantStrategy::new(
            address_from_low_u64(10),
            foreign,
        ));
        assert!(matches!(
            f.vault.add_strategy(f.admin, strategy, 10_000),
            Err(VaultError::AssetMismatch { .. })
        ));
        assert_eq!(f.vault.strategy_count().unwrap(), 0);
    }

    #[test]
    fn test_table_limit_from_config() {
        let f = VaultFixture::with_config(|c| c.max_strategies = 2);
        f.add(f.instant(10), 10_000);
        f.add(f.instant(11), 10_000);
        assert_eq!(
            f.vault.add_strategy(f.admin, f.instant(12), 10_000),
            Err(VaultError::TooManyStrategies { max: 2 })
        );
    }

    #[test]
    fn test_manager_role_is_enough_for_allocations() {
        let f = VaultFixture::new();
        let manager = address_from_low_u64(0x3A);
        f.access.grant(Role::Manager, manager);
        f.add(f.instant(10), 10_000);

        f.vault.set_allocations(manager, &[10_000]).unwrap();
        assert_eq!(f.vault.rebalance(manager).unwrap(), 0);
        assert!(matches!(
            f.vault.add_strategy(manager, f.instant(11), 10_000),
            Err(VaultError::Unauthorized {
                role: Role::Admin,
                ..
            })
        ));
    }

    #[test]
    fn test_rebalance_floors_and_keeps_dust_idle() {
        let f = VaultFixture::new();
        let user = f.user(1, 1_000);
        let a = f.instant(10);
        let b = f.instant(11);
        let c = f.locked(12);
        f.add(a.clone(), 10_000);
        f.add(b.clone(), 10_000);
        f.add(c.clone(), 10_000);
        f.allocate(&[3333, 3333, 3334]);
        f.vault.deposit(user, 1_001, user).unwrap_err();
        f.vault.deposit(user, 1_000, user).unwrap();

        let vault = f.vault_address();
        assert_eq!(f.vault.rebalance(f.admin).unwrap(), 333 + 333 + 333);
        assert_eq!(a.total_assets_of(vault).unwrap(), 333);
        assert_eq!(b.total_assets_of(vault).unwrap(), 333);
        assert_eq!(c.total_assets_of(vault).unwrap(), 333);
        assert_eq!(f.vault.idle_balance(), 1);
        assert_eq!(f.vault.total_managed_value().unwrap(), 1_000);
    }

    #[test]
    fn test_rebalance_is_push_only() {
        let f = VaultFixture::new();
        let user = f.user(1, 2_000);
        let a = f.instant(10);
        let b = f.instant(11);
        f.add(a.clone(), 10_000);
        f.add(b.clone(), 10_000);
        f.allocate(&[10_000, 0]);
        f.vault.deposit(user, 1_000, user).unwrap();
        f.vault.rebalance(f.admin).unwrap();

        // Flip the weights: the over-weighted strategy keeps its capital.
        f.allocate(&[0, 10_000]);
        f.vault.deposit(user, 500, user).unwrap();
        f.vault.rebalance(f.admin).unwrap();
        assert_eq!(a.total_assets_of(f.vault_address()).unwrap(), 1_000);
        assert_eq!(b.total_assets_of(f.vault_address()).unwrap(), 500);
        assert_eq!(
            f.events.events().last(),
            Some(&VaultEvent::Rebalanced {
                pushed: 500,
                pulled: 0
            })
        );
    }

    #[test]
    fn test_disabled_strategy_skipped_then_restored() {
        let f = VaultFixture::new();
        let user = f.user(1, 2_000);
        let a = f.instant(10);
        let b = f.instant(11);
        f.add(a.clone(), 10_000);
        f.add(b.clone(), 10_000);
        f.allocate(&[5000, 5000]);
        f.vault.deposit(user, 1_000, user).unwrap();
        f.vault.rebalance(f.admin).unwrap();

        f.vault.set_strategy_enabled(f.admin, 1, false).unwrap();
        // Excluded from valuation while its value is still visible in snapshots.
        assert_eq!(f.vault.total_managed_value().unwrap(), 500);
        assert_eq!(f.vault.strategies().unwrap()[1].reported_value, 500);
        assert!(!f.vault.strategies().unwrap()[1].enabled);

        // Disabled entries take no new capital and are zeroed by set_allocations.
        f.allocate(&[10_000, 7000]);
        f.vault.deposit(user, 200, user).unwrap();
        f.vault.rebalance(f.admin).unwrap();
        assert_eq!(a.total_assets_of(f.vault_address()).unwrap(), 700);
        assert_eq!(b.total_assets_of(f.vault_address()).unwrap(), 500);
        assert_eq!(f.vault.strategies().unwrap()[1].target_weight, 0);

        f.vault.set_strategy_enabled(f.admin, 1, true).unwrap();
        assert_eq!(f.vault.total_managed_value().unwrap(), 1_200);
        assert_eq!(f.ledger.balance_of(f.vault_address()), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_valid_weights_accepted_invalid_rejected(
            w0 in 0u16..=10_000u16,
            w1 in 0u16..=10_000u16,
            cap0 in 0u16..=10_000u16,
        ) {
            let f = VaultFixture::new();
            f.add(f.instant(10), cap0);
            f.add(f.instant(11), 10_000);
            let before: Vec<_> = f.vault.strategies().unwrap().iter().map(|s| s.target_weight).collect();

            let valid = u32::from(w0) + u32::from(w1) == 10_000 && w0 <= cap0;
            let result = f.vault.set_allocations(f.admin, &[w0, w1]);
            let after: Vec<_> = f.vault.strategies().unwrap().iter().map(|s| s.target_weight).collect();

            prop_assert_eq!(result.is_ok(), valid);
            if valid {
                prop_assert_eq!(after, vec![w0, w1]);
            } else {
                prop_assert_eq!(after, before);
            }
        }

        #[test]
        fn prop_rebalance_pushes_floor_of_weighted_idle(
            idle in 1u128..10_000_000u128,
            w0 in 0u16..=10_000u16,
        ) {
            let f = VaultFixture::new();
            let user = f.user(1, idle);
            let a = f.instant(10);
            let b = f.instant(11);
            f.add(a.clone(), 10_000);
            f.add(b.clone(), 10_000);
            f.allocate(&[w0, 10_000 - w0]);
            f.vault.deposit(user, idle, user).unwrap();
            f.vault.rebalance(f.admin).unwrap();

            let vault = f.vault_address();
            prop_assert_eq!(a.total_assets_of(vault).unwrap(), idle * u128::from(w0) / 10_000);
            prop_assert_eq!(b.total_assets_of(vault).unwrap(), idle * u128::from(10_000 - w0) / 10_000);
            prop_assert_eq!(f.vault.total_managed_value().unwrap(), idle);
        }
    }
}
