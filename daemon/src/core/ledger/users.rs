use log::{debug, info, warn};
use viewpay_common::{
    account::{User, UserId},
    time::{get_current_time_in_millis, TimestampMillis},
};

use crate::{
    config::REGISTRATION_BONUS,
    core::{
        error::LedgerError,
        ledger::{Ledger, LedgerEvent},
        storage::{CreditKind, Storage},
    },
};

// Outcome of a user lookup, `created` is set when the user did not exist
struct Registration {
    user: User,
    created: bool,
}

async fn get_or_register_user<S: Storage>(
    storage: &mut S,
    id: UserId,
    username: Option<String>,
    referrer: Option<UserId>,
    now: TimestampMillis,
) -> Result<Registration, LedgerError> {
    if let Some(user) = storage.get_user(id).await? {
        if referrer.is_some() && referrer != user.referrer {
            debug!("User {} already exists, referrer {:?} ignored", id, referrer);
        }
        return Ok(Registration {
            user,
            created: false,
        });
    }

    // Only refused when it would create the user
    if referrer == Some(id) {
        return Err(LedgerError::SelfReferralRejected(id));
    }

    let referrer = match referrer {
        Some(referrer) => {
            if storage.has_user(referrer).await? {
                Some(referrer)
            } else {
                warn!(
                    "Unknown referrer {} for new user {}, registering without referrer",
                    referrer, id
                );
                None
            }
        }
        None => None,
    };

    let user = User::new(id, username, referrer, now);
    storage.add_user(&user).await?;

    if let Some(referrer) = referrer {
        storage.add_referral(referrer, id, now).await?;
        storage
            .credit_balance(referrer, REGISTRATION_BONUS, CreditKind::RegistrationBonus, now)
            .await?;
        debug!(
            "Referrer {} credited registration bonus for {}",
            referrer, id
        );
    }

    Ok(Registration {
        user,
        created: true,
    })
}

impl<S: Storage> Ledger<S> {
    /// Return the user, creating it on first contact.
    ///
    /// A new user referred by a known user gives its referrer the
    /// registration bonus in the same commit. The referrer of an
    /// existing user is never changed, so an existing user is returned
    /// even when it names itself as referrer.
    pub async fn get_or_create_user(
        &self,
        id: UserId,
        username: Option<String>,
        referrer: Option<UserId>,
    ) -> Result<User, LedgerError> {
        let now = get_current_time_in_millis();
        let registration = {
            let mut storage = self.storage.write().await;
            storage.start_snapshot().await?;
            let res = get_or_register_user(&mut *storage, id, username, referrer, now).await;
            Self::end_snapshot(&mut *storage, res).await?
        };

        if registration.created {
            info!(
                "New user {} registered (referrer: {:?})",
                id, registration.user.referrer
            );
            self.notify(LedgerEvent::UserRegistered {
                user: id,
                referrer: registration.user.referrer,
            });
        }

        Ok(registration.user)
    }

    pub async fn get_user(&self, id: UserId) -> Result<Option<User>, LedgerError> {
        let storage = self.storage.read().await;
        storage.get_user(id).await
    }
}
