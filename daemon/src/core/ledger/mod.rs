mod balance;
mod events;
mod files;
mod rates;
mod stats;
mod users;
mod views;
mod withdrawals;

use std::sync::Arc;

use log::{debug, info, trace, warn};
use tokio::sync::{broadcast, RwLock};
use viewpay_common::{rates::RateTable, time::get_current_time_in_millis};

use crate::{
    config::EVENTS_CHANNEL_CAPACITY,
    core::{
        config::LedgerConfig,
        error::LedgerError,
        storage::Storage,
    },
};

pub use events::LedgerEvent;
pub use stats::LedgerStatus;

/// Earnings ledger: balances, referral payouts and withdrawals.
///
/// Every mutation holds the storage write lock for its whole
/// read-check-write sequence and buffers its writes in a storage snapshot.
/// The snapshot is written as one batch when every step succeeded,
/// and dropped otherwise. Events are broadcast after the commit.
pub struct Ledger<S: Storage> {
    storage: RwLock<S>,
    config: LedgerConfig,
    events: broadcast::Sender<LedgerEvent>,
}

impl<S: Storage> Ledger<S> {
    pub async fn new(mut storage: S, config: LedgerConfig) -> Result<Arc<Self>, LedgerError> {
        if storage.get_rate_table().await?.is_none() {
            info!("No rate table found, storing the default one");
            let mut table = RateTable::default();
            table.updated_at = get_current_time_in_millis();
            storage.set_rate_table(&table).await?;
        }

        if log::log_enabled!(log::Level::Info) {
            info!(
                "Ledger ready: {} users, {} files, {} views, dedup window {:?}",
                storage.count_users().await?,
                storage.count_files().await?,
                storage.count_views().await?,
                config.dedup_window
            );
        }

        let (events, _) = broadcast::channel(EVENTS_CHANNEL_CAPACITY);
        Ok(Arc::new(Self {
            storage: RwLock::new(storage),
            config,
            events,
        }))
    }

    // Receive every event emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    pub async fn stop(&self) -> Result<(), LedgerError> {
        info!("Stopping ledger");
        let mut storage = self.storage.write().await;
        storage.stop().await
    }

    // Fire and forget, the mutation is already committed
    fn notify(&self, event: LedgerEvent) {
        if self.events.receiver_count() == 0 {
            trace!("no subscriber for {:?}", event);
            return;
        }

        if let Err(e) = self.events.send(event) {
            warn!("Failed to broadcast ledger event: {}", e);
        }
    }

    // Close the snapshot opened by the caller:
    // applied if `result` is Ok, discarded otherwise
    async fn end_snapshot<T>(
        storage: &mut S,
        result: Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        match result {
            Ok(value) => {
                storage.end_snapshot(true).await?;
                Ok(value)
            }
            Err(e) => {
                debug!("Discarding ledger changes: {}", e);
                storage.end_snapshot(false).await?;
                Err(e)
            }
        }
    }
}
