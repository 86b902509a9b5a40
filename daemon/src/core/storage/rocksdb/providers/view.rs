use crate::core::{
    error::LedgerError,
    storage::{
        constants::VIEWS_COUNT,
        rocksdb::{Column, RocksStorage},
        ViewId, ViewProvider,
    },
};
use anyhow::Context;
use async_trait::async_trait;
use log::trace;
use viewpay_common::{
    serializer::Serializer,
    time::TimestampMillis,
    view::{ViewEvent, ViewKey},
};

#[async_trait]
impl ViewProvider for RocksStorage {
    async fn get_last_view(
        &self,
        key: &ViewKey,
    ) -> Result<Option<TimestampMillis>, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get last view of {} on {}", key.ip, key.link_id);
        }
        self.load_optional_from_disk(Column::LastViews, &key.to_bytes())
    }

    async fn set_last_view(
        &mut self,
        key: &ViewKey,
        timestamp: TimestampMillis,
    ) -> Result<(), LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("set last view of {} on {} at {}", key.ip, key.link_id, timestamp);
        }
        self.insert_into_disk(Column::LastViews, key.to_bytes(), &timestamp)
    }

    async fn add_view_event(&mut self, event: &ViewEvent) -> Result<ViewId, LedgerError> {
        let id = self
            .load_counter(VIEWS_COUNT)?
            .checked_add(1)
            .context("View id counter overflow")?;
        if log::log_enabled!(log::Level::Trace) {
            trace!("add view event {} on {}", id, event.link_id);
        }

        self.insert_into_disk(Column::Views, id.to_be_bytes(), event)?;
        self.store_counter(VIEWS_COUNT, id)?;
        Ok(id)
    }

    async fn get_view_event(&self, id: ViewId) -> Result<Option<ViewEvent>, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get view event {}", id);
        }
        self.load_optional_from_disk(Column::Views, &id.to_be_bytes())
    }

    async fn count_views(&self) -> Result<u64, LedgerError> {
        trace!("count views");
        self.load_counter(VIEWS_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RocksDBConfig;
    use tempdir::TempDir;
    use viewpay_common::rates::RateKey;

    fn event(ip: &str, timestamp: TimestampMillis) -> ViewEvent {
        ViewEvent {
            link_id: "abc".to_owned(),
            ip: ip.to_owned(),
            country: RateKey::Other,
            user_agent: Some("curl/8.0".to_owned()),
            timestamp,
        }
    }

    #[tokio::test]
    async fn test_view_events_and_last_view() {
        let dir = TempDir::new("viewpay-views").unwrap();
        let path = dir.path().to_string_lossy().to_string();
        let mut storage = RocksStorage::new(&path, &RocksDBConfig::default()).unwrap();

        let first = storage.add_view_event(&event("1.1.1.1", 10)).await.unwrap();
        let second = storage.add_view_event(&event("2.2.2.2", 20)).await.unwrap();
        assert_eq!((first, second), (1, 2));
        assert_eq!(storage.count_views().await.unwrap(), 2);
        assert_eq!(
            storage.get_view_event(second).await.unwrap(),
            Some(event("2.2.2.2", 20))
        );
        assert!(storage.get_view_event(3).await.unwrap().is_none());

        let key = event("1.1.1.1", 10).key();
        assert!(storage.get_last_view(&key).await.unwrap().is_none());
        storage.set_last_view(&key, 10).await.unwrap();
        storage.set_last_view(&key, 30).await.unwrap();
        assert_eq!(storage.get_last_view(&key).await.unwrap(), Some(30));
    }
}
