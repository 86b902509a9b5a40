use crate::core::storage::{BalanceProvider, RocksStorage};

// Credit and debit only go through the user records
impl BalanceProvider for RocksStorage {}

#[cfg(test)]
mod tests {
    use crate::core::{
        config::RocksDBConfig,
        error::LedgerError,
        storage::{BalanceProvider, CreditKind, RocksStorage, UserProvider},
    };
    use tempdir::TempDir;
    use viewpay_common::account::User;

    #[tokio::test]
    async fn test_credit_kinds_move_the_right_counters() {
        let dir = TempDir::new("viewpay-balance").unwrap();
        let path = dir.path().to_string_lossy().to_string();
        let mut storage = RocksStorage::new(&path, &RocksDBConfig::default()).unwrap();
        storage.add_user(&User::new(1, None, None, 0)).await.unwrap();

        let user = storage
            .credit_balance(1, 500_000, CreditKind::View, 10)
            .await
            .unwrap();
        assert_eq!(user.balance, 500_000);
        assert_eq!(user.total_views, 1);
        assert_eq!(user.referral_earnings, 0);
        assert_eq!(user.updated_at, 10);

        let user = storage
            .credit_balance(1, 50_000, CreditKind::Commission, 11)
            .await
            .unwrap();
        assert_eq!(user.balance, 550_000);
        assert_eq!(user.total_views, 1);
        assert_eq!(user.referral_earnings, 50_000);

        let user = storage
            .credit_balance(1, 10_000_000, CreditKind::RegistrationBonus, 12)
            .await
            .unwrap();
        assert_eq!(user.referral_count, 1);
        assert_eq!(user.referral_earnings, 10_050_000);

        // persisted
        assert_eq!(storage.get_user(1).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn test_debit_rechecks_balance() {
        let dir = TempDir::new("viewpay-balance").unwrap();
        let path = dir.path().to_string_lossy().to_string();
        let mut storage = RocksStorage::new(&path, &RocksDBConfig::default()).unwrap();
        storage.add_user(&User::new(1, None, None, 0)).await.unwrap();
        storage
            .credit_balance(1, 100, CreditKind::View, 1)
            .await
            .unwrap();

        assert!(matches!(
            storage.debit_balance(1, 101, 2).await,
            Err(LedgerError::InsufficientBalance { need: 101, have: 100 })
        ));
        let user = storage.debit_balance(1, 100, 3).await.unwrap();
        assert_eq!(user.balance, 0);

        assert!(matches!(
            storage.debit_balance(2, 1, 4).await,
            Err(LedgerError::UserNotFound(2))
        ));
    }
}
