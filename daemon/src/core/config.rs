use std::time::Duration;

use clap::{Args, ValueEnum};
use log::LevelFilter;
use serde::{de, Deserialize, Deserializer, Serialize};
use viewpay_common::time::TimestampMillis;

use crate::config::{DEFAULT_DEDUP_WINDOW_SECS, DEFAULT_DIR_PATH};

#[derive(Debug, Copy, Clone, ValueEnum, Serialize, Deserialize)]
#[clap(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CompressionMode {
    None,
    Snappy,
    Zlib,
    Bz2,
    Lz4,
    Lz4hc,
    Zstd,
}

impl Default for CompressionMode {
    fn default() -> Self {
        Self::Snappy
    }
}

#[derive(Debug, Copy, Clone, ValueEnum, Serialize, Deserialize)]
#[clap(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    None,
    Lru,
    HyperClock,
}

impl Default for CacheMode {
    fn default() -> Self {
        Self::Lru
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[clap(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_dedup_window() -> Duration {
    Duration::from_secs(DEFAULT_DEDUP_WINDOW_SECS)
}

// The window is compared against millisecond timestamps
fn check_dedup_window(window: Duration) -> Result<Duration, String> {
    if TimestampMillis::try_from(window.as_millis()).is_err() {
        return Err(format!(
            "Dedup window of {} does not fit in milliseconds",
            humantime::format_duration(window)
        ));
    }
    Ok(window)
}

pub fn parse_dedup_window(value: &str) -> Result<Duration, String> {
    let window = humantime::parse_duration(value).map_err(|e| e.to_string())?;
    check_dedup_window(window)
}

fn deserialize_dedup_window<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Duration, D::Error> {
    let window = Duration::deserialize(deserializer)?;
    check_dedup_window(window).map_err(de::Error::custom)
}

#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Window during which a repeated view of a link from the same IP is not credited.
    /// Accepts human readable durations such as `5m` or `90s`.
    #[clap(
        name = "dedup-window",
        long = "dedup-window",
        default_value = "5m",
        value_parser = parse_dedup_window
    )]
    #[serde(
        default = "default_dedup_window",
        deserialize_with = "deserialize_dedup_window"
    )]
    pub dedup_window: Duration,
}

impl LedgerConfig {
    pub fn dedup_window_millis(&self) -> TimestampMillis {
        // Bounded by the parsers
        self.dedup_window
            .as_millis()
            .try_into()
            .unwrap_or(TimestampMillis::MAX)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            dedup_window: default_dedup_window(),
        }
    }
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
}

fn default_max_background_jobs() -> usize {
    4
}

fn default_max_open_files() -> i32 {
    512
}

fn default_keep_max_log_files() -> usize {
    4
}

fn default_cache_size() -> u64 {
    64 * 1024 * 1024
}

fn default_write_buffer_size() -> u64 {
    32 * 1024 * 1024
}

#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct RocksDBConfig {
    /// Number of threads used by RocksDB.
    #[clap(name = "rocksdb-parallelism", long = "rocksdb-parallelism", default_value_t = default_parallelism())]
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Maximum number of concurrent background jobs (compactions and flushes).
    #[clap(name = "rocksdb-max-background-jobs", long = "rocksdb-max-background-jobs", default_value_t = default_max_background_jobs())]
    #[serde(default = "default_max_background_jobs")]
    pub max_background_jobs: usize,
    /// Maximum number of open files, -1 for unlimited.
    #[clap(name = "rocksdb-max-open-files", long = "rocksdb-max-open-files", default_value_t = default_max_open_files())]
    #[serde(default = "default_max_open_files")]
    pub max_open_files: i32,
    /// Number of info log files kept.
    #[clap(name = "rocksdb-keep-max-log-files", long = "rocksdb-keep-max-log-files", default_value_t = default_keep_max_log_files())]
    #[serde(default = "default_keep_max_log_files")]
    pub keep_max_log_files: usize,
    /// Compression applied to the stored blocks.
    #[clap(name = "rocksdb-compression-mode", long = "rocksdb-compression-mode", value_enum, default_value_t)]
    #[serde(default)]
    pub compression_mode: CompressionMode,
    /// Block cache implementation.
    #[clap(name = "rocksdb-cache-mode", long = "rocksdb-cache-mode", value_enum, default_value_t)]
    #[serde(default)]
    pub cache_mode: CacheMode,
    /// Block cache size in bytes.
    #[clap(name = "rocksdb-cache-size", long = "rocksdb-cache-size", default_value_t = default_cache_size())]
    #[serde(default = "default_cache_size")]
    pub cache_size: u64,
    /// Write buffer size in bytes.
    #[clap(name = "rocksdb-write-buffer-size", long = "rocksdb-write-buffer-size", default_value_t = default_write_buffer_size())]
    #[serde(default = "default_write_buffer_size")]
    pub write_buffer_size: u64,
    /// Force an fsync on every committed ledger mutation.
    #[clap(name = "rocksdb-sync-writes", long = "rocksdb-sync-writes")]
    #[serde(default)]
    pub sync_writes: bool,
}

impl Default for RocksDBConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            max_background_jobs: default_max_background_jobs(),
            max_open_files: default_max_open_files(),
            keep_max_log_files: default_keep_max_log_files(),
            compression_mode: CompressionMode::default(),
            cache_mode: CacheMode::default(),
            cache_size: default_cache_size(),
            write_buffer_size: default_write_buffer_size(),
            sync_writes: false,
        }
    }
}

#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the ledger database.
    #[clap(long, default_value = DEFAULT_DIR_PATH)]
    #[serde(default = "default_dir_path")]
    pub dir_path: String,
    /// Log level printed to the console.
    #[clap(long, value_enum, default_value_t)]
    #[serde(default)]
    pub log_level: LogLevel,
    #[clap(flatten)]
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[clap(flatten)]
    #[serde(default)]
    pub rocksdb: RocksDBConfig,
}

fn default_dir_path() -> String {
    DEFAULT_DIR_PATH.to_owned()
}
