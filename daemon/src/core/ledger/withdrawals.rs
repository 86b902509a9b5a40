use log::info;
use viewpay_common::{
    account::UserId,
    time::{get_current_time_in_millis, TimestampMillis},
    withdrawal::{Withdrawal, WithdrawalId, WithdrawalStatus},
};

use crate::{
    config::{MAX_LIST_LIMIT, MIN_WITHDRAWAL},
    core::{
        error::LedgerError,
        ledger::{Ledger, LedgerEvent},
        storage::Storage,
    },
};

async fn request_withdrawal<S: Storage>(
    storage: &mut S,
    user: UserId,
    amount: u64,
    payment_method: String,
    payment_details: String,
    now: TimestampMillis,
) -> Result<Withdrawal, LedgerError> {
    let account = storage
        .get_user(user)
        .await?
        .ok_or(LedgerError::UserNotFound(user))?;

    // Nothing is reserved, the balance is checked again on approval
    if amount > account.balance {
        return Err(LedgerError::InsufficientBalance {
            need: amount,
            have: account.balance,
        });
    }

    let id = storage.next_withdrawal_id().await?;
    let withdrawal = Withdrawal::new(id, user, amount, payment_method, payment_details, now);
    storage.add_withdrawal(&withdrawal).await?;

    Ok(withdrawal)
}

async fn settle_withdrawal<S: Storage>(
    storage: &mut S,
    id: WithdrawalId,
    status: WithdrawalStatus,
    admin_note: Option<String>,
    now: TimestampMillis,
) -> Result<Withdrawal, LedgerError> {
    let withdrawal = storage
        .update_withdrawal_status(id, status, now, admin_note)
        .await?;

    if status == WithdrawalStatus::Approved {
        storage
            .debit_balance(withdrawal.user, withdrawal.amount, now)
            .await?;
    }

    Ok(withdrawal)
}

impl<S: Storage> Ledger<S> {
    /// Ask for a payout of `amount`, left pending until an admin decision.
    pub async fn create_withdrawal(
        &self,
        user: UserId,
        amount: u64,
        payment_method: String,
        payment_details: String,
    ) -> Result<Withdrawal, LedgerError> {
        if amount < MIN_WITHDRAWAL {
            return Err(LedgerError::BelowMinimumWithdrawal {
                amount,
                minimum: MIN_WITHDRAWAL,
            });
        }

        let now = get_current_time_in_millis();
        let withdrawal = {
            let mut storage = self.storage.write().await;
            storage.start_snapshot().await?;
            let res = request_withdrawal(
                &mut *storage,
                user,
                amount,
                payment_method,
                payment_details,
                now,
            )
            .await;
            Self::end_snapshot(&mut *storage, res).await?
        };

        info!(
            "Withdrawal {} of {} requested by {}",
            withdrawal.id, withdrawal.amount, user
        );
        self.notify(LedgerEvent::WithdrawalRequested {
            id: withdrawal.id,
            user,
            amount,
        });

        Ok(withdrawal)
    }

    /// Approve a pending withdrawal and debit the user balance.
    /// A balance that can't cover the amount anymore leaves it pending.
    pub async fn approve_withdrawal(
        &self,
        id: WithdrawalId,
        admin_note: Option<String>,
    ) -> Result<Withdrawal, LedgerError> {
        let withdrawal = self
            .settle(id, WithdrawalStatus::Approved, admin_note)
            .await?;

        info!(
            "Withdrawal {} of {} approved for {}",
            id, withdrawal.amount, withdrawal.user
        );
        self.notify(LedgerEvent::WithdrawalApproved {
            id,
            user: withdrawal.user,
            amount: withdrawal.amount,
        });

        Ok(withdrawal)
    }

    /// Reject a pending withdrawal, the balance is left untouched.
    pub async fn reject_withdrawal(
        &self,
        id: WithdrawalId,
        admin_note: Option<String>,
    ) -> Result<Withdrawal, LedgerError> {
        let withdrawal = self
            .settle(id, WithdrawalStatus::Rejected, admin_note)
            .await?;

        info!(
            "Withdrawal {} of {} rejected for {}",
            id, withdrawal.amount, withdrawal.user
        );
        self.notify(LedgerEvent::WithdrawalRejected {
            id,
            user: withdrawal.user,
            amount: withdrawal.amount,
        });

        Ok(withdrawal)
    }

    async fn settle(
        &self,
        id: WithdrawalId,
        status: WithdrawalStatus,
        admin_note: Option<String>,
    ) -> Result<Withdrawal, LedgerError> {
        let now = get_current_time_in_millis();
        let mut storage = self.storage.write().await;

        storage.start_snapshot().await?;
        let res = settle_withdrawal(&mut *storage, id, status, admin_note, now).await;
        Self::end_snapshot(&mut *storage, res).await
    }

    pub async fn get_withdrawal(
        &self,
        id: WithdrawalId,
    ) -> Result<Option<Withdrawal>, LedgerError> {
        let storage = self.storage.read().await;
        storage.get_withdrawal(id).await
    }

    // Every pending withdrawal, oldest first
    pub async fn get_pending_withdrawals(&self) -> Result<Vec<Withdrawal>, LedgerError> {
        let storage = self.storage.read().await;
        storage.get_pending_withdrawals(0, usize::MAX).await
    }

    // Withdrawals of `user`, newest first
    pub async fn get_user_withdrawals(
        &self,
        user: UserId,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Withdrawal>, LedgerError> {
        let storage = self.storage.read().await;
        storage
            .get_user_withdrawals(user, skip, limit.min(MAX_LIST_LIMIT))
            .await
    }
}
