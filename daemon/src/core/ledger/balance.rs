use log::debug;
use viewpay_common::{
    account::{User, UserId},
    time::{get_current_time_in_millis, TimestampMillis},
    utils::apply_bps,
};

use crate::{
    config::REFERRAL_COMMISSION_BPS,
    core::{
        error::LedgerError,
        ledger::Ledger,
        storage::{CreditKind, Storage},
    },
};

// Referrer paid by a view credit and the commission it received
pub(super) type Commission = Option<(UserId, u64)>;

// Credit the earnings of one view to `user`, then pay its referrer if any
// Only one level is paid, the referrer's own referrer gets nothing
pub(super) async fn credit_view<S: Storage>(
    storage: &mut S,
    user: UserId,
    amount: u64,
    now: TimestampMillis,
) -> Result<(User, Commission), LedgerError> {
    let account = storage
        .credit_balance(user, amount, CreditKind::View, now)
        .await?;

    let referrer = match account.referrer {
        Some(referrer) => referrer,
        None => return Ok((account, None)),
    };

    let commission = apply_bps(amount, REFERRAL_COMMISSION_BPS);
    if commission == 0 {
        debug!(
            "Commission of {} on {} rounds to zero, referrer {} not credited",
            REFERRAL_COMMISSION_BPS, amount, referrer
        );
        return Ok((account, None));
    }

    storage
        .credit_balance(referrer, commission, CreditKind::Commission, now)
        .await?;
    debug!(
        "Referrer {} credited {} for a view of {}",
        referrer, commission, user
    );

    Ok((account, Some((referrer, commission))))
}

impl<S: Storage> Ledger<S> {
    /// Credit `amount` as the earnings of one view to `user`,
    /// along with the commission owed to its referrer.
    pub async fn credit(&self, user: UserId, amount: u64) -> Result<User, LedgerError> {
        let now = get_current_time_in_millis();
        let mut storage = self.storage.write().await;

        storage.start_snapshot().await?;
        let res = credit_view(&mut *storage, user, amount, now).await;
        let (account, _) = Self::end_snapshot(&mut *storage, res).await?;

        Ok(account)
    }

    pub async fn get_user_balance(&self, user: UserId) -> Result<u64, LedgerError> {
        let storage = self.storage.read().await;
        storage
            .get_user(user)
            .await?
            .map(|account| account.balance)
            .ok_or(LedgerError::UserNotFound(user))
    }
}
