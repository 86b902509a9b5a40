use log::info;
use viewpay_common::{
    rates::{RateKey, RateTable},
    time::get_current_time_in_millis,
    utils::format_coin,
};

use crate::core::{
    error::{DiskContext, LedgerError},
    ledger::{Ledger, LedgerEvent},
    storage::Storage,
};

impl<S: Storage> Ledger<S> {
    // Current rate table, as stored
    pub async fn get_rates(&self) -> Result<RateTable, LedgerError> {
        let storage = self.storage.read().await;
        storage
            .get_rate_table()
            .await?
            .ok_or(LedgerError::NotFoundOnDisk(DiskContext::RateTable))
    }

    /// Replace the whole rate table.
    /// Every entry is validated, then the table is stamped with the
    /// current time before being stored. Views already credited keep
    /// the amount computed with the previous table.
    pub async fn set_rates(&self, mut table: RateTable) -> Result<RateTable, LedgerError> {
        table.validate()?;
        table.updated_at = get_current_time_in_millis();
        {
            let mut storage = self.storage.write().await;
            storage.set_rate_table(&table).await?;
        }

        if log::log_enabled!(log::Level::Info) {
            info!("Rate table replaced with {} entries", table.rates.len());
        }
        self.notify(LedgerEvent::RatesUpdated {
            updated_at: table.updated_at,
        });

        Ok(table)
    }

    /// Update a single entry of the rate table, keeping the others.
    pub async fn set_rate(&self, key: RateKey, cpm: u64) -> Result<RateTable, LedgerError> {
        let table = {
            let mut storage = self.storage.write().await;
            let mut table = storage
                .get_rate_table()
                .await?
                .ok_or(LedgerError::NotFoundOnDisk(DiskContext::RateTable))?;

            let previous = table.set(key, cpm)?;
            table.updated_at = get_current_time_in_millis();
            storage.set_rate_table(&table).await?;

            if log::log_enabled!(log::Level::Info) {
                info!(
                    "Rate for {} set to {} (was {})",
                    key,
                    format_coin(cpm),
                    previous.map(format_coin).unwrap_or_else(|| "unset".to_owned())
                );
            }
            table
        };

        self.notify(LedgerEvent::RatesUpdated {
            updated_at: table.updated_at,
        });

        Ok(table)
    }

    // Amount credited for one view from `country`, with the table in force now
    pub async fn earnings_for(&self, country: &RateKey) -> Result<u64, LedgerError> {
        let table = self.get_rates().await?;
        Ok(table.earnings_for(country))
    }
}
