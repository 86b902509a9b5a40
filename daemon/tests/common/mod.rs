// Helpers shared by the ledger integration tests

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use tempdir::TempDir;
use viewpay_common::{account::UserId, file::FileRecord};
use viewpay_daemon::core::{
    config::{LedgerConfig, RocksDBConfig},
    ledger::Ledger,
    storage::RocksStorage,
};

pub type TestLedger = Arc<Ledger<RocksStorage>>;

pub fn temp_dir(name: &str) -> TempDir {
    TempDir::new(name).expect("Failed to create temp dir")
}

pub async fn open_ledger(dir: &TempDir) -> TestLedger {
    open_ledger_with(dir, LedgerConfig::default()).await
}

pub async fn open_ledger_with(dir: &TempDir, config: LedgerConfig) -> TestLedger {
    let path = dir.path().to_string_lossy().to_string();
    let storage =
        RocksStorage::new(&path, &RocksDBConfig::default()).expect("Failed to open storage");
    Ledger::new(storage, config)
        .await
        .expect("Failed to create ledger")
}

pub fn window(seconds: u64) -> LedgerConfig {
    LedgerConfig {
        dedup_window: Duration::from_secs(seconds),
    }
}

// Create a user owning a file under `link_id`
pub async fn user_with_file(
    ledger: &TestLedger,
    user: UserId,
    referrer: Option<UserId>,
    link_id: &str,
) -> FileRecord {
    ledger
        .get_or_create_user(user, Some(format!("user{}", user)), referrer)
        .await
        .expect("Failed to create user");
    ledger
        .register_file(
            user,
            link_id.to_owned(),
            format!("{}.zip", link_id),
            "document".to_owned(),
        )
        .await
        .expect("Failed to register file")
}

// Distinct IPv4 address for the n-th viewer
pub fn viewer_ip(n: u32) -> String {
    let [a, b, c, d] = (0x0A00_0000u32 + n).to_be_bytes();
    format!("{}.{}.{}.{}", a, b, c, d)
}
