use crate::core::error::LedgerError;
use async_trait::async_trait;

#[async_trait]
pub trait SnapshotProvider {
    // Start a snapshot
    // Every write done until `end_snapshot` is buffered in memory
    async fn start_snapshot(&mut self) -> Result<(), LedgerError>;

    // Write the buffered changes as one batch if `apply` is set,
    // drop them otherwise
    async fn end_snapshot(&mut self, apply: bool) -> Result<(), LedgerError>;
}
