pub mod config;
pub mod error;
pub mod ledger;
pub mod storage;
