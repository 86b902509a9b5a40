use async_trait::async_trait;
use log::trace;
use viewpay_common::{
    account::{User, UserId},
    time::TimestampMillis,
};

use crate::core::{error::LedgerError, storage::UserProvider};

/// Reason of a balance credit, decides which counters move with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditKind {
    // Earnings of a credited view on one of the user files
    View,
    // Share of a view credited to a referred user
    Commission,
    // One time bonus for a newly referred user
    RegistrationBonus,
}

#[async_trait]
pub trait BalanceProvider: UserProvider + Send + Sync {
    // Credit `amount` to the user and return its updated state
    // View credits count one view, referral credits go to the referral earnings
    async fn credit_balance(
        &mut self,
        id: UserId,
        amount: u64,
        kind: CreditKind,
        now: TimestampMillis,
    ) -> Result<User, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("credit {} to user {} ({:?})", amount, id, kind);
        }

        let mut user = self
            .get_user(id)
            .await?
            .ok_or(LedgerError::UserNotFound(id))?;

        user.balance = user
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;

        match kind {
            CreditKind::View => {
                user.total_views = user.total_views.saturating_add(1);
            }
            CreditKind::Commission => {
                user.referral_earnings = user.referral_earnings.saturating_add(amount);
            }
            CreditKind::RegistrationBonus => {
                user.referral_earnings = user.referral_earnings.saturating_add(amount);
                user.referral_count = user.referral_count.saturating_add(1);
            }
        }
        user.updated_at = now;

        self.set_user(&user).await?;
        Ok(user)
    }

    // Remove `amount` from the user balance
    // The balance is checked again here, whatever the caller verified before
    async fn debit_balance(
        &mut self,
        id: UserId,
        amount: u64,
        now: TimestampMillis,
    ) -> Result<User, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("debit {} from user {}", amount, id);
        }

        let mut user = self
            .get_user(id)
            .await?
            .ok_or(LedgerError::UserNotFound(id))?;

        user.balance = user
            .balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                need: amount,
                have: user.balance,
            })?;
        user.updated_at = now;

        self.set_user(&user).await?;
        Ok(user)
    }
}
