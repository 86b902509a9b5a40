use async_trait::async_trait;
use viewpay_common::{
    account::{User, UserId},
    serializer::{Reader, ReaderError, Serializer, Writer},
    time::TimestampMillis,
};

use crate::core::error::LedgerError;

// Index entry of a referred user under its referrer
// Keys are ordered by referrer then by referred user id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferralKey {
    pub referrer: UserId,
    pub user: UserId,
}

impl Serializer for ReferralKey {
    fn write(&self, writer: &mut Writer) {
        writer.write_u64(&self.referrer);
        writer.write_u64(&self.user);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            referrer: reader.read_u64()?,
            user: reader.read_u64()?,
        })
    }

    fn size(&self) -> usize {
        16
    }
}

#[async_trait]
pub trait UserProvider {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, LedgerError>;

    async fn has_user(&self, id: UserId) -> Result<bool, LedgerError>;

    // Store a user that doesn't exist yet and bump the users counter
    async fn add_user(&mut self, user: &User) -> Result<(), LedgerError>;

    // Overwrite an existing user
    async fn set_user(&mut self, user: &User) -> Result<(), LedgerError>;

    async fn count_users(&self) -> Result<u64, LedgerError>;

    // Users with the highest balance first
    // Ties are broken by the lowest id
    async fn get_top_users(&self, limit: usize) -> Result<Vec<User>, LedgerError>;

    // Index `user` as referred by `referrer`
    async fn add_referral(
        &mut self,
        referrer: UserId,
        user: UserId,
        joined_at: TimestampMillis,
    ) -> Result<(), LedgerError>;

    // Users referred by `referrer` with their join time, in id order
    async fn get_referrals(
        &self,
        referrer: UserId,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<(UserId, TimestampMillis)>, LedgerError>;
}
