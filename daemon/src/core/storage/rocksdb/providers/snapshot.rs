use crate::core::{
    error::LedgerError,
    storage::{rocksdb::Snapshot, RocksStorage, SnapshotProvider},
};
use async_trait::async_trait;
use log::{debug, trace};

#[async_trait]
impl SnapshotProvider for RocksStorage {
    async fn start_snapshot(&mut self) -> Result<(), LedgerError> {
        trace!("starting snapshot");
        if self.snapshot.is_some() {
            return Err(LedgerError::SnapshotAlreadyStarted);
        }

        self.snapshot = Some(Snapshot::new());
        Ok(())
    }

    async fn end_snapshot(&mut self, apply: bool) -> Result<(), LedgerError> {
        trace!("end snapshot");
        let snapshot = self
            .snapshot
            .take()
            .ok_or(LedgerError::SnapshotNotStarted)?;

        if apply && snapshot.is_empty() {
            trace!("nothing to apply");
        } else if apply {
            trace!("applying snapshot");
            self.write_snapshot(snapshot)?;
        } else if log::log_enabled!(log::Level::Debug) {
            debug!("Discarding snapshot with {} pending changes", snapshot.len());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RocksDBConfig;
    use tempdir::TempDir;

    #[tokio::test]
    async fn test_snapshot_lifecycle_errors() {
        let dir = TempDir::new("viewpay-snapshot").unwrap();
        let path = dir.path().to_string_lossy().to_string();
        let mut storage = RocksStorage::new(&path, &RocksDBConfig::default()).unwrap();

        assert!(matches!(
            storage.end_snapshot(true).await,
            Err(LedgerError::SnapshotNotStarted)
        ));

        storage.start_snapshot().await.unwrap();
        assert!(matches!(
            storage.start_snapshot().await,
            Err(LedgerError::SnapshotAlreadyStarted)
        ));

        // an empty snapshot is released without writing
        storage.end_snapshot(true).await.unwrap();
        assert!(matches!(
            storage.end_snapshot(false).await,
            Err(LedgerError::SnapshotNotStarted)
        ));
        storage.start_snapshot().await.unwrap();
        storage.end_snapshot(false).await.unwrap();
    }
}
