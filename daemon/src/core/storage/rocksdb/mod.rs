mod column;
mod providers;
mod snapshot;

use std::{collections::BTreeMap, sync::Arc};

use crate::core::{
    config::{CacheMode, CompressionMode, RocksDBConfig},
    error::{DiskContext, LedgerError},
    storage::snapshot::{Direction, IteratorMode},
};
use anyhow::Context;
use async_trait::async_trait;
use itertools::Either;
use log::{debug, info, trace};
use rocksdb::{
    BlockBasedOptions, Cache, ColumnFamilyDescriptor, DBCompactionStyle, DBCompressionType,
    DBWithThreadMode, IteratorMode as InternalIteratorMode, MultiThreaded, Options, ReadOptions,
    SliceTransform, WriteBatch, WriteOptions,
};
use strum::IntoEnumIterator;
use viewpay_common::serializer::Serializer;

pub use column::*;
pub use snapshot::Snapshot;

use super::Storage;

macro_rules! cf_handle {
    ($db: expr, $column: expr) => {
        $db.cf_handle($column.as_ref())
            .with_context(|| format!("Column {:?} not found", $column))?
    };
}

type InnerDB = DBWithThreadMode<MultiThreaded>;

type RawEntry = (Box<[u8]>, Box<[u8]>);

impl CompressionMode {
    pub fn convert(self) -> DBCompressionType {
        match self {
            Self::None => DBCompressionType::None,
            Self::Snappy => DBCompressionType::Snappy,
            Self::Zlib => DBCompressionType::Zlib,
            Self::Bz2 => DBCompressionType::Bz2,
            Self::Lz4 => DBCompressionType::Lz4,
            Self::Lz4hc => DBCompressionType::Lz4hc,
            Self::Zstd => DBCompressionType::Zstd,
        }
    }
}

impl<'a> IteratorMode<'a> {
    pub fn convert(self) -> (InternalIteratorMode<'a>, ReadOptions) {
        let mut opts = ReadOptions::default();
        let mode = match self {
            Self::Start => InternalIteratorMode::Start,
            Self::End => InternalIteratorMode::End,
            Self::From(prefix, direction) => InternalIteratorMode::From(prefix, direction.into()),
            Self::WithPrefix(prefix, direction) => {
                opts.set_prefix_same_as_start(true);
                InternalIteratorMode::From(prefix, direction.into())
            }
        };

        (mode, opts)
    }
}

pub struct RocksStorage {
    db: Arc<InnerDB>,
    snapshot: Option<Snapshot>,
    sync_writes: bool,
}

impl RocksStorage {
    pub fn new(dir: &str, config: &RocksDBConfig) -> Result<Self, LedgerError> {
        let cfs = Column::iter().map(|column| {
            let name = column.to_string();
            let mut opts = Options::default();
            if let Some(len) = column.prefix() {
                opts.set_prefix_extractor(SliceTransform::create_fixed_prefix(len));
            }

            ColumnFamilyDescriptor::new(name, opts)
        });

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_compaction_style(DBCompactionStyle::Universal);

        opts.increase_parallelism(config.parallelism as _);
        opts.set_max_background_jobs(config.max_background_jobs as _);
        opts.set_max_open_files(config.max_open_files);
        opts.set_keep_log_file_num(config.keep_max_log_files);
        opts.set_compression_type(config.compression_mode.convert());

        let mut block_opts = BlockBasedOptions::default();
        match config.cache_mode {
            CacheMode::None => {
                block_opts.disable_cache();
            }
            CacheMode::Lru => {
                let cache = Cache::new_lru_cache(config.cache_size as _);
                block_opts.set_block_cache(&cache);
            }
            CacheMode::HyperClock => {
                let cache = Cache::new_hyper_clock_cache(config.cache_size as _, 1024);
                block_opts.set_block_cache(&cache);
            }
        };

        opts.set_block_based_table_factory(&block_opts);
        opts.set_write_buffer_size(config.write_buffer_size as _);

        info!("Opening ledger database at {}", dir);
        let db = InnerDB::open_cf_descriptors(&opts, dir, cfs)
            .with_context(|| format!("Failed to open RocksDB at {}", dir))?;

        Ok(Self {
            db: Arc::new(db),
            snapshot: None,
            sync_writes: config.sync_writes,
        })
    }

    fn write_options(sync: bool) -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(sync);
        opts
    }

    pub(super) fn insert_into_disk<K: AsRef<[u8]>, V: Serializer>(
        &mut self,
        column: Column,
        key: K,
        value: &V,
    ) -> Result<(), LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("insert into disk {:?}", column);
        }

        match self.snapshot.as_mut() {
            Some(snapshot) => {
                snapshot.put(column, key.as_ref().to_vec(), value.to_bytes());
            }
            None => {
                let cf = cf_handle!(self.db, column);
                let opts = Self::write_options(self.sync_writes);
                self.db
                    .put_cf_opt(&cf, key.as_ref(), value.to_bytes(), &opts)
                    .with_context(|| {
                        format!("Error while inserting into disk column {:?}", column)
                    })?;
            }
        };

        Ok(())
    }

    pub(super) fn remove_from_disk<K: AsRef<[u8]>>(
        &mut self,
        column: Column,
        key: K,
    ) -> Result<(), LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("remove from disk {:?}", column);
        }

        match self.snapshot.as_mut() {
            Some(snapshot) => {
                snapshot.delete(column, key.as_ref().to_vec());
            }
            None => {
                let cf = cf_handle!(self.db, column);
                let opts = Self::write_options(self.sync_writes);
                self.db
                    .delete_cf_opt(&cf, key.as_ref(), &opts)
                    .with_context(|| {
                        format!("Error while removing from disk column {:?}", column)
                    })?;
            }
        };

        Ok(())
    }

    pub fn contains_data<K: AsRef<[u8]> + ?Sized>(
        &self,
        column: Column,
        key: &K,
    ) -> Result<bool, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("contains data {:?}", column);
        }

        let key = key.as_ref();
        if let Some(v) = self
            .snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.contains(&column, key))
        {
            return Ok(v);
        }

        let cf = cf_handle!(self.db, column);
        let value = self.db.get_pinned_cf(&cf, key).with_context(|| {
            format!("Error while checking if key exists in column {:?}", column)
        })?;

        Ok(value.is_some())
    }

    pub fn load_optional_from_disk<K: AsRef<[u8]> + ?Sized, V: Serializer>(
        &self,
        column: Column,
        key: &K,
    ) -> Result<Option<V>, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("load optional {:?} from disk", column);
        }

        let key = key.as_ref();
        if let Some(snapshot) = self.snapshot.as_ref() {
            let state = snapshot.get(&column, key);
            if state.is_deleted() {
                return Ok(None);
            }

            if let Some(bytes) = state.stored() {
                return Ok(Some(V::from_bytes(bytes)?));
            }
        }

        let cf = cf_handle!(self.db, column);
        match self
            .db
            .get_pinned_cf(&cf, key)
            .with_context(|| format!("Internal error while reading column {:?}", column))?
        {
            Some(bytes) => Ok(Some(V::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn load_from_disk<K: AsRef<[u8]> + ?Sized, V: Serializer>(
        &self,
        column: Column,
        key: &K,
        context: DiskContext,
    ) -> Result<V, LedgerError> {
        self.load_optional_from_disk(column, key)?
            .ok_or(LedgerError::NotFoundOnDisk(context))
    }

    // Counters live in the common column and start at zero
    pub(super) fn load_counter(&self, key: &[u8]) -> Result<u64, LedgerError> {
        Ok(self
            .load_optional_from_disk::<_, u64>(Column::Common, key)?
            .unwrap_or(0))
    }

    pub(super) fn store_counter(&mut self, key: &[u8], value: u64) -> Result<(), LedgerError> {
        self.insert_into_disk(Column::Common, key, &value)
    }

    // Iterate over raw entries, merging the pending snapshot writes if any
    fn iter_raw<'a>(
        &'a self,
        column: Column,
        mode: IteratorMode<'a>,
    ) -> Result<impl Iterator<Item = Result<RawEntry, LedgerError>> + 'a, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("iter {:?}", column);
        }

        let cf = cf_handle!(self.db, column);
        let (m, opts) = mode.convert();
        let iterator = self
            .db
            .iterator_cf_opt(&cf, opts, m)
            .take_while(move |res| res.as_ref().map_or(true, |(key, _)| mode.accepts(key)));

        let changes = self
            .snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.changes(&column));

        match changes {
            Some(changes) => {
                let mut entries = BTreeMap::new();
                for res in iterator {
                    let (key, value) = res.context("Internal read error in iter")?;
                    entries.insert(key, value);
                }

                for (key, value) in changes.iter().filter(|(key, _)| mode.accepts(key)) {
                    let key: Box<[u8]> = key.as_ref().into();
                    match value {
                        Some(value) => {
                            entries.insert(key, value.as_ref().into());
                        }
                        None => {
                            entries.remove(&key);
                        }
                    }
                }

                let merged: Vec<RawEntry> = match mode.direction() {
                    Direction::Forward => entries.into_iter().collect(),
                    Direction::Reverse => entries.into_iter().rev().collect(),
                };
                Ok(Either::Left(merged.into_iter().map(Ok::<_, LedgerError>)))
            }
            None => Ok(Either::Right(iterator.map(
                |res| -> Result<RawEntry, LedgerError> {
                    let entry = res.context("Internal read error in iter")?;
                    Ok(entry)
                },
            ))),
        }
    }

    pub fn iter<'a, K, V>(
        &'a self,
        column: Column,
        mode: IteratorMode<'a>,
    ) -> Result<impl Iterator<Item = Result<(K, V), LedgerError>> + 'a, LedgerError>
    where
        K: Serializer + 'a,
        V: Serializer + 'a,
    {
        Ok(self.iter_raw(column, mode)?.map(|res| -> Result<(K, V), LedgerError> {
            let (key, value) = res?;
            let key = K::from_bytes(&key)?;
            let value = V::from_bytes(&value)?;

            Ok((key, value))
        }))
    }

    pub fn iter_keys<'a, K>(
        &'a self,
        column: Column,
        mode: IteratorMode<'a>,
    ) -> Result<impl Iterator<Item = Result<K, LedgerError>> + 'a, LedgerError>
    where
        K: Serializer + 'a,
    {
        Ok(self.iter_raw(column, mode)?.map(|res| -> Result<K, LedgerError> {
            let (key, _) = res?;
            Ok(K::from_bytes(&key)?)
        }))
    }

    // Write every change of the snapshot in one atomic batch
    fn write_snapshot(&self, snapshot: Snapshot) -> Result<(), LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("writing snapshot of {} changes", snapshot.len());
        }

        let mut batch = WriteBatch::default();
        for (column, changes) in snapshot.into_columns() {
            let cf = cf_handle!(self.db, column);
            for (key, value) in changes {
                match value {
                    Some(value) => batch.put_cf(&cf, key, value),
                    None => batch.delete_cf(&cf, key),
                }
            }
        }

        self.db
            .write_opt(batch, &Self::write_options(self.sync_writes))
            .context("Error while writing snapshot batch")?;

        Ok(())
    }
}

#[async_trait]
impl Storage for RocksStorage {
    async fn get_size_on_disk(&self) -> Result<u64, LedgerError> {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut size = 0;
            for column in Column::iter() {
                let cf = cf_handle!(db, column);
                let metadata = db.get_column_family_metadata_cf(&cf);
                size += metadata.size;
            }

            Ok::<_, LedgerError>(size)
        })
        .await
        .context("Getting size on disk")?
    }

    async fn flush(&mut self) -> Result<(), LedgerError> {
        trace!("flush DB");

        let db = Arc::clone(&self.db);
        // Flushing blocks, keep it away from the async workers
        tokio::task::spawn_blocking(move || {
            for column in Column::iter() {
                if log::log_enabled!(log::Level::Debug) {
                    debug!("flushing {:?}", column);
                }
                let cf = cf_handle!(db, column);
                db.flush_cf(&cf)
                    .with_context(|| format!("Error while flushing column {:?}", column))?;
            }

            Ok::<_, LedgerError>(())
        })
        .await
        .context("Flushing DB")?
    }

    async fn stop(&mut self) -> Result<(), LedgerError> {
        info!("Stopping ledger storage");
        self.flush().await
    }
}
