use async_trait::async_trait;
use viewpay_common::rates::RateTable;

use crate::core::error::LedgerError;

#[async_trait]
pub trait RateProvider {
    // None until a table was stored once
    async fn get_rate_table(&self) -> Result<Option<RateTable>, LedgerError>;

    async fn set_rate_table(&mut self, table: &RateTable) -> Result<(), LedgerError>;
}
