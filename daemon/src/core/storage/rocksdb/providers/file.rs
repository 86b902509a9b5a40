use crate::core::{
    error::{DiskContext, LedgerError},
    storage::{
        constants::FILES_COUNT,
        rocksdb::{Column, RocksStorage},
        snapshot::{Direction, IteratorMode},
        FileProvider, OwnerFileKey,
    },
};
use async_trait::async_trait;
use log::trace;
use viewpay_common::{account::UserId, file::FileRecord, serializer::Serializer};

#[async_trait]
impl FileProvider for RocksStorage {
    async fn get_file(&self, link_id: &str) -> Result<Option<FileRecord>, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get file {}", link_id);
        }
        self.load_optional_from_disk(Column::Files, link_id.as_bytes())
    }

    async fn has_file(&self, link_id: &str) -> Result<bool, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("has file {}", link_id);
        }
        self.contains_data(Column::Files, link_id.as_bytes())
    }

    async fn add_file(&mut self, file: &FileRecord) -> Result<(), LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("add file {} for owner {}", file.link_id, file.owner);
        }
        self.insert_into_disk(Column::Files, file.link_id.as_bytes(), file)?;
        self.insert_into_disk(
            Column::FilesByOwner,
            OwnerFileKey::from_file(file).to_bytes(),
            &(),
        )?;

        let count = self.load_counter(FILES_COUNT)?;
        self.store_counter(FILES_COUNT, count + 1)
    }

    async fn set_file(&mut self, file: &FileRecord) -> Result<(), LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("set file {}", file.link_id);
        }
        self.insert_into_disk(Column::Files, file.link_id.as_bytes(), file)
    }

    async fn delete_file(&mut self, file: &FileRecord) -> Result<(), LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("delete file {} of owner {}", file.link_id, file.owner);
        }
        self.remove_from_disk(Column::Files, file.link_id.as_bytes())?;
        self.remove_from_disk(Column::FilesByOwner, OwnerFileKey::from_file(file).to_bytes())?;

        let count = self.load_counter(FILES_COUNT)?;
        self.store_counter(FILES_COUNT, count.saturating_sub(1))
    }

    async fn get_files_by_owner(
        &self,
        owner: UserId,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<FileRecord>, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get files of {} skip {} limit {}", owner, skip, limit);
        }

        let start = OwnerFileKey::max_for_owner(owner);
        let iter = self.iter_keys::<OwnerFileKey>(
            Column::FilesByOwner,
            IteratorMode::From(&start, Direction::Reverse),
        )?;

        let mut out = Vec::new();
        let mut skipped = 0usize;
        for item in iter {
            if out.len() >= limit {
                break;
            }
            let key = item?;
            if key.owner != owner {
                break;
            }
            if skipped < skip {
                skipped += 1;
                continue;
            }

            let file: FileRecord =
                self.load_from_disk(Column::Files, key.link_id.as_bytes(), DiskContext::File)?;
            out.push(file);
        }
        Ok(out)
    }

    async fn count_files_by_owner(&self, owner: UserId) -> Result<u64, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("count files of {}", owner);
        }

        let prefix = owner.to_be_bytes();
        let mut count = 0;
        for item in self.iter_keys::<OwnerFileKey>(
            Column::FilesByOwner,
            IteratorMode::WithPrefix(&prefix, Direction::Forward),
        )? {
            item?;
            count += 1;
        }
        Ok(count)
    }

    async fn count_files(&self) -> Result<u64, LedgerError> {
        trace!("count files");
        self.load_counter(FILES_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RocksDBConfig;
    use tempdir::TempDir;

    fn open(dir: &TempDir) -> RocksStorage {
        let path = dir.path().to_string_lossy().to_string();
        RocksStorage::new(&path, &RocksDBConfig::default()).unwrap()
    }

    fn file(link_id: &str, owner: UserId, created_at: u64) -> FileRecord {
        FileRecord::new(
            link_id.into(),
            owner,
            format!("{}.pdf", link_id),
            "document".into(),
            created_at,
        )
    }

    #[tokio::test]
    async fn test_owner_files_newest_first() {
        let dir = TempDir::new("viewpay-files").unwrap();
        let mut storage = open(&dir);

        storage.add_file(&file("aaa", 1, 100)).await.unwrap();
        storage.add_file(&file("bbb", 1, 300)).await.unwrap();
        storage.add_file(&file("ccc", 1, 200)).await.unwrap();
        storage.add_file(&file("ddd", 2, 400)).await.unwrap();

        let links: Vec<String> = storage
            .get_files_by_owner(1, 0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.link_id)
            .collect();
        assert_eq!(links, vec!["bbb", "ccc", "aaa"]);

        let links: Vec<String> = storage
            .get_files_by_owner(1, 1, 1)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.link_id)
            .collect();
        assert_eq!(links, vec!["ccc"]);

        assert!(storage.get_files_by_owner(1, 0, 0).await.unwrap().is_empty());

        assert_eq!(storage.count_files_by_owner(1).await.unwrap(), 3);
        assert_eq!(storage.count_files_by_owner(2).await.unwrap(), 1);
        assert_eq!(storage.count_files().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_delete_file_drops_index() {
        let dir = TempDir::new("viewpay-files").unwrap();
        let mut storage = open(&dir);

        let record = file("aaa", 1, 100);
        storage.add_file(&record).await.unwrap();
        storage.delete_file(&record).await.unwrap();

        assert!(!storage.has_file("aaa").await.unwrap());
        assert!(storage.get_files_by_owner(1, 0, 10).await.unwrap().is_empty());
        assert_eq!(storage.count_files().await.unwrap(), 0);
    }
}
