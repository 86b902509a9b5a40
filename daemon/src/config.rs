use viewpay_common::{
    config::{BPS_DENOMINATOR, COIN_VALUE},
    static_assert,
    time::TimestampSeconds,
};

// Default directory used by the storage
pub const DEFAULT_DIR_PATH: &str = "viewpay_data/";

// Minimum amount a user can ask to withdraw (5.00)
pub const MIN_WITHDRAWAL: u64 = 5 * COIN_VALUE;

// Share of every view credit paid to the referrer of the credited user
// 1000 bps = 10%
pub const REFERRAL_COMMISSION_BPS: u16 = 1000;

// Flat bonus paid once to a referrer when a referred user is created (0.10)
pub const REGISTRATION_BONUS: u64 = COIN_VALUE / 10;

// A repeated view of the same link from the same IP
// is not credited again during this window
pub const DEFAULT_DEDUP_WINDOW_SECS: TimestampSeconds = 5 * 60;

// Ledger events buffered for slow subscribers before they start lagging
pub const EVENTS_CHANNEL_CAPACITY: usize = 1024;

// Upper bound on pages returned by list operations
pub const MAX_LIST_LIMIT: usize = 1000;

static_assert!(
    REFERRAL_COMMISSION_BPS as u64 <= BPS_DENOMINATOR,
    "Referral commission cannot exceed 100%"
);
static_assert!(MIN_WITHDRAWAL > 0, "Minimum withdrawal must be positive");
