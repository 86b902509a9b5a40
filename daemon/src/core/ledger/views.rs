use log::debug;
use viewpay_common::{
    rates::RateKey,
    time::{get_current_time_in_millis, TimestampMillis},
    view::{ViewEvent, ViewKey},
};

use crate::core::{
    error::{DiskContext, LedgerError},
    ledger::{balance::credit_view, Ledger, LedgerEvent},
    storage::Storage,
};

impl<S: Storage> Ledger<S> {
    /// Account a hit on a short link.
    ///
    /// Returns `false` without changing anything when the same IP already
    /// got a view credited on this link during the dedup window.
    /// Otherwise the view is stored, the file statistics updated and the
    /// owner credited with its referrer commission, all in one commit.
    pub async fn record_view(
        &self,
        link_id: &str,
        ip: &str,
        country: &str,
        user_agent: Option<String>,
    ) -> Result<bool, LedgerError> {
        self.record_view_at(link_id, ip, country, user_agent, get_current_time_in_millis())
            .await
    }

    // Same as `record_view` with an explicit clock
    pub async fn record_view_at(
        &self,
        link_id: &str,
        ip: &str,
        country: &str,
        user_agent: Option<String>,
        now: TimestampMillis,
    ) -> Result<bool, LedgerError> {
        let country = RateKey::from_viewer_country(country);
        let key = ViewKey::new(link_id.to_owned(), ip.to_owned());
        let window = self.config.dedup_window_millis();

        let mut storage = self.storage.write().await;

        let mut file = storage
            .get_file(link_id)
            .await?
            .ok_or_else(|| LedgerError::FileNotFound(link_id.to_owned()))?;

        if let Some(last) = storage.get_last_view(&key).await? {
            if now.saturating_sub(last) <= window {
                debug!(
                    "View of {} from {} already credited at {}, ignored",
                    link_id, ip, last
                );
                return Ok(false);
            }
        }

        let amount = storage
            .get_rate_table()
            .await?
            .ok_or(LedgerError::NotFoundOnDisk(DiskContext::RateTable))?
            .earnings_for(&country);

        storage.start_snapshot().await?;
        let res = async {
            let event = ViewEvent {
                link_id: file.link_id.clone(),
                ip: ip.to_owned(),
                country,
                user_agent,
                timestamp: now,
            };
            storage.add_view_event(&event).await?;
            storage.set_last_view(&key, now).await?;

            file.record_view(country);
            storage.set_file(&file).await?;

            credit_view(&mut *storage, file.owner, amount, now).await
        }
        .await;
        let (_, commission) = Self::end_snapshot(&mut *storage, res).await?;
        drop(storage);

        debug!(
            "View of {} from {} ({}) credited {} to {}",
            link_id, ip, country, amount, file.owner
        );
        let (referrer, commission) = match commission {
            Some((referrer, commission)) => (Some(referrer), commission),
            None => (None, 0),
        };
        self.notify(LedgerEvent::ViewCredited {
            link_id: file.link_id,
            owner: file.owner,
            country,
            amount,
            referrer,
            commission,
        });

        Ok(true)
    }
}
