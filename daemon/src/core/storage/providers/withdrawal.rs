use async_trait::async_trait;
use viewpay_common::{
    account::UserId,
    serializer::{Reader, ReaderError, Serializer, Writer},
    time::TimestampMillis,
    withdrawal::{Withdrawal, WithdrawalId, WithdrawalStatus},
};

use crate::core::error::LedgerError;

// Index entry of a withdrawal under its user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserWithdrawalKey {
    pub user: UserId,
    pub id: WithdrawalId,
}

impl Serializer for UserWithdrawalKey {
    fn write(&self, writer: &mut Writer) {
        writer.write_u64(&self.user);
        writer.write_u64(&self.id);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            user: reader.read_u64()?,
            id: reader.read_u64()?,
        })
    }

    fn size(&self) -> usize {
        16
    }
}

#[async_trait]
pub trait WithdrawalProvider {
    // Allocate the next withdrawal id from the persistent counter
    // Ids start at 1 and are never reused
    async fn next_withdrawal_id(&mut self) -> Result<WithdrawalId, LedgerError>;

    // Store a new pending withdrawal and index it
    async fn add_withdrawal(&mut self, withdrawal: &Withdrawal) -> Result<(), LedgerError>;

    async fn get_withdrawal(&self, id: WithdrawalId) -> Result<Option<Withdrawal>, LedgerError>;

    // Move a pending withdrawal to `status`
    // Fails if the withdrawal is unknown or not pending anymore
    async fn update_withdrawal_status(
        &mut self,
        id: WithdrawalId,
        status: WithdrawalStatus,
        processed_at: TimestampMillis,
        admin_note: Option<String>,
    ) -> Result<Withdrawal, LedgerError>;

    // Pending withdrawals, oldest first
    async fn get_pending_withdrawals(
        &self,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Withdrawal>, LedgerError>;

    async fn count_pending_withdrawals(&self) -> Result<u64, LedgerError>;

    // Withdrawals of `user`, newest first
    async fn get_user_withdrawals(
        &self,
        user: UserId,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Withdrawal>, LedgerError>;
}
