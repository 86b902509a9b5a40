use crate::core::{
    error::LedgerError,
    storage::{
        constants::USERS_COUNT,
        rocksdb::{Column, RocksStorage},
        snapshot::{Direction, IteratorMode},
        ReferralKey, UserProvider,
    },
};
use async_trait::async_trait;
use log::trace;
use viewpay_common::{
    account::{User, UserId},
    serializer::Serializer,
    time::TimestampMillis,
};

#[async_trait]
impl UserProvider for RocksStorage {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get user {}", id);
        }
        self.load_optional_from_disk(Column::Users, &id.to_be_bytes())
    }

    async fn has_user(&self, id: UserId) -> Result<bool, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("has user {}", id);
        }
        self.contains_data(Column::Users, &id.to_be_bytes())
    }

    async fn add_user(&mut self, user: &User) -> Result<(), LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("add user {}", user.id);
        }
        self.insert_into_disk(Column::Users, user.id.to_be_bytes(), user)?;

        let count = self.load_counter(USERS_COUNT)?;
        self.store_counter(USERS_COUNT, count + 1)
    }

    async fn set_user(&mut self, user: &User) -> Result<(), LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("set user {}", user.id);
        }
        self.insert_into_disk(Column::Users, user.id.to_be_bytes(), user)
    }

    async fn count_users(&self) -> Result<u64, LedgerError> {
        trace!("count users");
        self.load_counter(USERS_COUNT)
    }

    async fn get_top_users(&self, limit: usize) -> Result<Vec<User>, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get top {} users", limit);
        }

        let mut users = Vec::new();
        for item in self.iter::<UserId, User>(Column::Users, IteratorMode::Start)? {
            let (_, user) = item?;
            users.push(user);
        }

        users.sort_by(|a, b| b.balance.cmp(&a.balance).then(a.id.cmp(&b.id)));
        users.truncate(limit);
        Ok(users)
    }

    async fn add_referral(
        &mut self,
        referrer: UserId,
        user: UserId,
        joined_at: TimestampMillis,
    ) -> Result<(), LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("add referral of {} under {}", user, referrer);
        }
        let key = ReferralKey { referrer, user };
        self.insert_into_disk(Column::ReferralDirects, key.to_bytes(), &joined_at)
    }

    async fn get_referrals(
        &self,
        referrer: UserId,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<(UserId, TimestampMillis)>, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get referrals of {} skip {} limit {}", referrer, skip, limit);
        }

        let prefix = referrer.to_be_bytes();
        let iter = self.iter::<ReferralKey, TimestampMillis>(
            Column::ReferralDirects,
            IteratorMode::WithPrefix(&prefix, Direction::Forward),
        )?;

        iter.skip(skip)
            .take(limit)
            .map(|item| item.map(|(key, joined_at)| (key.user, joined_at)))
            .collect()
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

    #[tokio::test]
    async fn test_add_and_count_users() {
        let dir = TempDir::new("viewpay-users").unwrap();
        let mut storage = open(&dir);

        assert!(!storage.has_user(1).await.unwrap());
        storage
            .add_user(&User::new(1, Some("alice".into()), None, 100))
            .await
            .unwrap();
        storage.add_user(&User::new(2, None, Some(1), 200)).await.unwrap();

        assert!(storage.has_user(1).await.unwrap());
        assert_eq!(storage.count_users().await.unwrap(), 2);

        let user = storage.get_user(2).await.unwrap().unwrap();
        assert_eq!(user.referrer, Some(1));
    }

    #[tokio::test]
    async fn test_top_users_by_balance() {
        let dir = TempDir::new("viewpay-users").unwrap();
        let mut storage = open(&dir);

        for (id, balance) in [(1u64, 10u64), (2, 30), (3, 20), (4, 30)] {
            let mut user = User::new(id, None, None, 0);
            user.balance = balance;
            storage.add_user(&user).await.unwrap();
        }

        let top: Vec<UserId> = storage
            .get_top_users(3)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(top, vec![2, 4, 3]);
    }

    #[tokio::test]
    async fn test_referrals_are_scoped_to_referrer() {
        let dir = TempDir::new("viewpay-users").unwrap();
        let mut storage = open(&dir);

        storage.add_referral(1, 10, 1_000).await.unwrap();
        storage.add_referral(1, 11, 2_000).await.unwrap();
        storage.add_referral(2, 12, 3_000).await.unwrap();

        let referrals = storage.get_referrals(1, 0, 100).await.unwrap();
        assert_eq!(referrals, vec![(10, 1_000), (11, 2_000)]);

        let referrals = storage.get_referrals(1, 1, 100).await.unwrap();
        assert_eq!(referrals, vec![(11, 2_000)]);

        assert!(storage.get_referrals(3, 0, 100).await.unwrap().is_empty());
        assert!(storage.get_referrals(1, 0, 0).await.unwrap().is_empty());
        assert_eq!(storage.get_referrals(1, 0, 1).await.unwrap(), vec![(10, 1_000)]);
    }
}
