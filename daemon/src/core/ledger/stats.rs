use indexmap::IndexMap;
use serde::Serialize;
use viewpay_common::account::{ReferralStats, ReferredUser, User, UserId, UserStats};

use crate::{
    config::MAX_LIST_LIMIT,
    core::{error::LedgerError, ledger::Ledger, storage::Storage},
};

/// Global counters of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerStatus {
    pub users: u64,
    pub files: u64,
    pub views: u64,
    pub pending_withdrawals: u64,
    pub size_on_disk: u64,
}

impl<S: Storage> Ledger<S> {
    /// Balance and activity of a user, with views per country
    /// summed over all of its files.
    pub async fn get_user_stats(&self, id: UserId) -> Result<UserStats, LedgerError> {
        let storage = self.storage.read().await;
        let user = storage
            .get_user(id)
            .await?
            .ok_or(LedgerError::UserNotFound(id))?;

        let mut geo_breakdown = IndexMap::new();
        for file in storage.get_files_by_owner(id, 0, usize::MAX).await? {
            for (country, views) in file.geo_stats {
                let total = geo_breakdown.entry(country).or_insert(0u64);
                *total = total.saturating_add(views);
            }
        }

        Ok(UserStats {
            balance: user.balance,
            total_views: user.total_views,
            files_uploaded: user.files_uploaded,
            geo_breakdown,
        })
    }

    pub async fn get_referral_stats(&self, id: UserId) -> Result<ReferralStats, LedgerError> {
        let storage = self.storage.read().await;
        let user = storage
            .get_user(id)
            .await?
            .ok_or(LedgerError::UserNotFound(id))?;

        let referrals = storage.get_referrals(id, 0, usize::MAX).await?;
        let mut referred_users = Vec::with_capacity(referrals.len());
        for (user_id, joined_at) in referrals {
            let username = storage
                .get_user(user_id)
                .await?
                .and_then(|referred| referred.username);
            referred_users.push(ReferredUser {
                user_id,
                username,
                joined_at,
            });
        }

        Ok(ReferralStats {
            referral_count: user.referral_count,
            referral_earnings: user.referral_earnings,
            referred_users,
        })
    }

    // Users with the highest balance, for the admin overview
    pub async fn get_top_users(&self, limit: usize) -> Result<Vec<User>, LedgerError> {
        let storage = self.storage.read().await;
        storage.get_top_users(limit.min(MAX_LIST_LIMIT)).await
    }

    pub async fn count_users(&self) -> Result<u64, LedgerError> {
        let storage = self.storage.read().await;
        storage.count_users().await
    }

    pub async fn get_status(&self) -> Result<LedgerStatus, LedgerError> {
        let storage = self.storage.read().await;
        Ok(LedgerStatus {
            users: storage.count_users().await?,
            files: storage.count_files().await?,
            views: storage.count_views().await?,
            pending_withdrawals: storage.count_pending_withdrawals().await?,
            size_on_disk: storage.get_size_on_disk().await?,
        })
    }
}
