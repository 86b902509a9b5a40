// Keys of the singleton entries stored in the common column

pub(crate) const RATE_TABLE: &[u8; 4] = b"RATE";
pub(crate) const USERS_COUNT: &[u8; 4] = b"CUSR";
pub(crate) const FILES_COUNT: &[u8; 4] = b"CFIL";
pub(crate) const VIEWS_COUNT: &[u8; 4] = b"CVEW";
pub(crate) const WITHDRAWALS_COUNT: &[u8; 4] = b"CWDR";
