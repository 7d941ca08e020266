//! # Share Inflation
//!
//! First-depositor donation attack: deposit dust, donate assets directly to
//! the vault, hope the next depositor rounds down to nothing. Virtual
//! shares and assets make the attack unprofitable.

#[cfg(test)]
mod tests {
    use crate::fixtures::VaultFixture;
    use strategy_vault::{AssetLedger, SharesLedger, VaultApi};

    fn attack(decimals_offset: u8) -> (VaultFixture, u128, u128) {
        let f = VaultFixture::with_config(|c| c.decimals_offset = decimals_offset);
        let attacker = f.user(666, 10_001);
        let victim = f.user(1, 10_000);

        let attacker_shares = f.vault.deposit(attacker, 1, attacker).unwrap();
        f.ledger
            .transfer(attacker, f.vault_address(), 10_000)
            .unwrap();
        let victim_shares = f.vault.deposit(victim, 10_000, victim).unwrap();
        (f, attacker_shares, victim_shares)
    }

    #[test]
    fn test_donation_attack_unprofitable_without_offset() {
        let (f, attacker_shares, victim_shares) = attack(0);
        assert_eq!(attacker_shares, 1);
        assert!(victim_shares > 0);

        let attacker_value = f.vault.preview_redeem(attacker_shares).unwrap();
        assert!(attacker_value < 10_001, "attacker ends with {attacker_value}");
    }

    #[test]
    fn test_decimals_offset_protects_victim() {
        let (f, attacker_shares, victim_shares) = attack(6);
        assert_eq!(attacker_shares, 1_000_000);

        let victim_value = f.vault.preview_redeem(victim_shares).unwrap();
        assert!(victim_value >= 9_990, "victim keeps {victim_value}");
        assert!(f.vault.preview_redeem(attacker_shares).unwrap() < 10_001);
        assert_eq!(
            f.shares.total_supply(),
            attacker_shares + victim_shares
        );
    }

    #[test]
    fn test_dust_deposit_after_donation_rejected() {
        let f = VaultFixture::new();
        let attacker = f.user(666, 1_000_001);
        let victim = f.user(1, 10);
        f.vault.deposit(attacker, 1, attacker).unwrap();
        f.ledger
            .transfer(attacker, f.vault_address(), 1_000_000)
            .unwrap();

        // Rounds to zero shares: rejected instead of silently absorbed.
        assert_eq!(
            f.vault.deposit(victim, 10, victim),
            Err(strategy_vault::VaultError::ZeroAmount)
        );
        assert_eq!(f.ledger.balance_of(victim), 10);
    }
}
