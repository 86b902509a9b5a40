use crate::core::{
    error::{DiskContext, LedgerError},
    storage::{
        constants::WITHDRAWALS_COUNT,
        rocksdb::{Column, RocksStorage},
        snapshot::{Direction, IteratorMode},
        UserWithdrawalKey, WithdrawalProvider,
    },
};
use anyhow::Context;
use async_trait::async_trait;
use log::trace;
use viewpay_common::{
    account::UserId,
    serializer::Serializer,
    time::TimestampMillis,
    withdrawal::{Withdrawal, WithdrawalId, WithdrawalStatus},
};

#[async_trait]
impl WithdrawalProvider for RocksStorage {
    async fn next_withdrawal_id(&mut self) -> Result<WithdrawalId, LedgerError> {
        let id = self
            .load_counter(WITHDRAWALS_COUNT)?
            .checked_add(1)
            .context("Withdrawal id counter overflow")?;
        if log::log_enabled!(log::Level::Trace) {
            trace!("next withdrawal id {}", id);
        }

        self.store_counter(WITHDRAWALS_COUNT, id)?;
        Ok(id)
    }

    async fn add_withdrawal(&mut self, withdrawal: &Withdrawal) -> Result<(), LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!(
                "add withdrawal {} of {} for user {}",
                withdrawal.id,
                withdrawal.amount,
                withdrawal.user
            );
        }

        self.insert_into_disk(Column::Withdrawals, withdrawal.id.to_be_bytes(), withdrawal)?;
        if withdrawal.is_pending() {
            self.insert_into_disk(Column::PendingWithdrawals, withdrawal.id.to_be_bytes(), &())?;
        }

        let key = UserWithdrawalKey {
            user: withdrawal.user,
            id: withdrawal.id,
        };
        self.insert_into_disk(Column::UserWithdrawals, key.to_bytes(), &())
    }

    async fn get_withdrawal(&self, id: WithdrawalId) -> Result<Option<Withdrawal>, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get withdrawal {}", id);
        }
        self.load_optional_from_disk(Column::Withdrawals, &id.to_be_bytes())
    }

    async fn update_withdrawal_status(
        &mut self,
        id: WithdrawalId,
        status: WithdrawalStatus,
        processed_at: TimestampMillis,
        admin_note: Option<String>,
    ) -> Result<Withdrawal, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("update withdrawal {} to {}", id, status);
        }

        let mut withdrawal: Withdrawal = self
            .load_optional_from_disk(Column::Withdrawals, &id.to_be_bytes())?
            .ok_or(LedgerError::WithdrawalNotFound(id))?;

        if !withdrawal.status.can_transition_to(status) {
            return Err(LedgerError::WithdrawalNotPending {
                id,
                status: withdrawal.status,
            });
        }

        withdrawal.status = status;
        withdrawal.processed_at = Some(processed_at);
        withdrawal.admin_note = admin_note;

        self.insert_into_disk(Column::Withdrawals, id.to_be_bytes(), &withdrawal)?;
        self.remove_from_disk(Column::PendingWithdrawals, id.to_be_bytes())?;

        Ok(withdrawal)
    }

    async fn get_pending_withdrawals(
        &self,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Withdrawal>, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get pending withdrawals skip {} limit {}", skip, limit);
        }

        let mut out = Vec::new();
        let iter = self.iter_keys::<WithdrawalId>(Column::PendingWithdrawals, IteratorMode::Start)?;
        for item in iter.skip(skip).take(limit) {
            let id = item?;
            let withdrawal: Withdrawal = self.load_from_disk(
                Column::Withdrawals,
                &id.to_be_bytes(),
                DiskContext::Withdrawal,
            )?;
            out.push(withdrawal);
        }
        Ok(out)
    }

    async fn count_pending_withdrawals(&self) -> Result<u64, LedgerError> {
        trace!("count pending withdrawals");

        let mut count = 0;
        for item in self.iter_keys::<WithdrawalId>(Column::PendingWithdrawals, IteratorMode::Start)? {
            item?;
            count += 1;
        }
        Ok(count)
    }

    async fn get_user_withdrawals(
        &self,
        user: UserId,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Withdrawal>, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get withdrawals of {} skip {} limit {}", user, skip, limit);
        }

        let start = UserWithdrawalKey {
            user,
            id: WithdrawalId::MAX,
        }
        .to_bytes();
        let iter = self.iter_keys::<UserWithdrawalKey>(
            Column::UserWithdrawals,
            IteratorMode::From(&start, Direction::Reverse),
        )?;

        let mut out = Vec::new();
        let mut skipped = 0usize;
        for item in iter {
            if out.len() >= limit {
                break;
            }
            let key = item?;
            if key.user != user {
                break;
            }
            if skipped < skip {
                skipped += 1;
                continue;
            }

            let withdrawal: Withdrawal = self.load_from_disk(
                Column::Withdrawals,
                &key.id.to_be_bytes(),
                DiskContext::Withdrawal,
            )?;
            out.push(withdrawal);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RocksDBConfig;
    use tempdir::TempDir;

    fn open(dir: &TempDir) -> RocksStorage {
        let path = dir.path().to_string_lossy().to_string();
        RocksStorage::new(&path, &RocksDBConfig::default()).unwrap()
    }

    async fn request(storage: &mut RocksStorage, user: UserId, amount: u64) -> WithdrawalId {
        let id = storage.next_withdrawal_id().await.unwrap();
        let withdrawal = Withdrawal::new(id, user, amount, "paypal".into(), "a@b.c".into(), id);
        storage.add_withdrawal(&withdrawal).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let dir = TempDir::new("viewpay-withdrawals").unwrap();
        let mut storage = open(&dir);

        assert_eq!(storage.next_withdrawal_id().await.unwrap(), 1);
        assert_eq!(storage.next_withdrawal_id().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_status_update_is_compare_and_set() {
        let dir = TempDir::new("viewpay-withdrawals").unwrap();
        let mut storage = open(&dir);

        let id = request(&mut storage, 1, 500).await;
        assert_eq!(storage.count_pending_withdrawals().await.unwrap(), 1);

        let updated = storage
            .update_withdrawal_status(id, WithdrawalStatus::Rejected, 99, Some("no".into()))
            .await
            .unwrap();
        assert_eq!(updated.status, WithdrawalStatus::Rejected);
        assert_eq!(updated.processed_at, Some(99));
        assert_eq!(storage.count_pending_withdrawals().await.unwrap(), 0);

        assert!(matches!(
            storage
                .update_withdrawal_status(id, WithdrawalStatus::Approved, 100, None)
                .await,
            Err(LedgerError::WithdrawalNotPending {
                status: WithdrawalStatus::Rejected,
                ..
            })
        ));
        assert!(matches!(
            storage
                .update_withdrawal_status(42, WithdrawalStatus::Approved, 100, None)
                .await,
            Err(LedgerError::WithdrawalNotFound(42))
        ));
    }

    #[tokio::test]
    async fn test_listing_order() {
        let dir = TempDir::new("viewpay-withdrawals").unwrap();
        let mut storage = open(&dir);

        let first = request(&mut storage, 1, 100).await;
        let second = request(&mut storage, 2, 200).await;
        let third = request(&mut storage, 1, 300).await;

        let pending: Vec<WithdrawalId> = storage
            .get_pending_withdrawals(0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(pending, vec![first, second, third]);

        let mine: Vec<WithdrawalId> = storage
            .get_user_withdrawals(1, 0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(mine, vec![third, first]);

        let page: Vec<WithdrawalId> = storage
            .get_user_withdrawals(1, 1, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(page, vec![first]);
    }

    #[tokio::test]
    async fn test_zero_limit_returns_nothing() {
        let dir = TempDir::new("viewpay-withdrawals").unwrap();
        let mut storage = open(&dir);
        request(&mut storage, 1, 100).await;

        assert!(storage.get_pending_withdrawals(0, 0).await.unwrap().is_empty());
        assert!(storage.get_user_withdrawals(1, 0, 0).await.unwrap().is_empty());
        assert_eq!(storage.get_user_withdrawals(1, 0, 1).await.unwrap().len(), 1);
    }
}
