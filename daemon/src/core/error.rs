use std::fmt;

use thiserror::Error;
use viewpay_common::{
    account::UserId,
    error::RateError,
    file::LinkId,
    serializer::ReaderError,
    withdrawal::{WithdrawalId, WithdrawalStatus},
};

// Which piece of data was missing when a mandatory load failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskContext {
    User,
    File,
    Withdrawal,
    RateTable,
}

impl fmt::Display for DiskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::File => "file",
            Self::Withdrawal => "withdrawal",
            Self::RateTable => "rate table",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Insufficient balance: need {need}, have {have}")]
    InsufficientBalance { need: u64, have: u64 },

    #[error("Withdrawal amount {amount} is below the minimum of {minimum}")]
    BelowMinimumWithdrawal { amount: u64, minimum: u64 },

    #[error("Withdrawal {0} not found")]
    WithdrawalNotFound(WithdrawalId),

    #[error("Withdrawal {id} is not pending, current status: {status}")]
    WithdrawalNotPending {
        id: WithdrawalId,
        status: WithdrawalStatus,
    },

    #[error("User {0} cannot refer themselves")]
    SelfReferralRejected(UserId),

    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("File {0} not found")]
    FileNotFound(LinkId),

    #[error("File {0} already exists")]
    FileAlreadyExists(LinkId),

    #[error("Balance overflow")]
    BalanceOverflow,

    #[error("Snapshot already started")]
    SnapshotAlreadyStarted,

    #[error("Snapshot not started")]
    SnapshotNotStarted,

    #[error("Data not found on disk: {0}")]
    NotFoundOnDisk(DiskContext),

    #[error(transparent)]
    InvalidRate(#[from] RateError),

    #[error(transparent)]
    ReaderError(#[from] ReaderError),

    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_pending_message() {
        let err = LedgerError::WithdrawalNotPending {
            id: 4,
            status: WithdrawalStatus::Approved,
        };
        assert_eq!(
            err.to_string(),
            "Withdrawal 4 is not pending, current status: approved"
        );
    }
}
