use crate::core::{
    error::LedgerError,
    storage::{constants::RATE_TABLE, rocksdb::Column, RateProvider, RocksStorage},
};
use async_trait::async_trait;
use log::trace;
use viewpay_common::rates::RateTable;

#[async_trait]
impl RateProvider for RocksStorage {
    async fn get_rate_table(&self) -> Result<Option<RateTable>, LedgerError> {
        trace!("get rate table");
        self.load_optional_from_disk(Column::Common, RATE_TABLE)
    }

    async fn set_rate_table(&mut self, table: &RateTable) -> Result<(), LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("set rate table with {} entries", table.rates.len());
        }
        self.insert_into_disk(Column::Common, RATE_TABLE, table)
    }
}
