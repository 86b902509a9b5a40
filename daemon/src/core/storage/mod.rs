mod constants;
mod providers;

pub mod rocksdb;
pub mod snapshot;

pub use self::{providers::*, rocksdb::RocksStorage};

use crate::core::error::LedgerError;
use async_trait::async_trait;

#[async_trait]
pub trait Storage:
    UserProvider
    + BalanceProvider
    + FileProvider
    + ViewProvider
    + RateProvider
    + WithdrawalProvider
    + SnapshotProvider
    + Sync
    + Send
    + 'static
{
    // Get the size of the ledger on disk in bytes
    async fn get_size_on_disk(&self) -> Result<u64, LedgerError>;

    // Flush pending writes to disk
    async fn flush(&mut self) -> Result<(), LedgerError>;

    // Stop the storage and wait for it to finish
    async fn stop(&mut self) -> Result<(), LedgerError>;
}
