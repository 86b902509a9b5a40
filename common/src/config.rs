use crate::static_assert;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Balances and rates are stored as atomic units
// 8 decimals keeps per-view payouts and their 10% commission exact
// (CPM 5.00 => 0.00500000 per view => 0.00050000 commission)
pub const COIN_DECIMALS: u8 = 8;
// 1.00 expressed in atomic units
pub const COIN_VALUE: u64 = 10u64.pow(COIN_DECIMALS as u32);

// Number of views a CPM rate is expressed for
pub const VIEWS_PER_CPM: u64 = 1000;

// Basis points denominator used for percentage parameters
pub const BPS_DENOMINATOR: u64 = 10_000;

static_assert!(
    COIN_VALUE % VIEWS_PER_CPM == 0,
    "A whole CPM unit must divide evenly into per-view atomic units"
);
