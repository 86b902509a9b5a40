use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("Invalid amount format: {0}")]
    InvalidFormat(String),

    #[error("Too many decimals: max {max}, got {got}")]
    TooManyDecimals { max: u8, got: usize },

    #[error("Amount overflow")]
    Overflow,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RateError {
    #[error("Invalid country code '{0}', expected two ASCII letters or OTHER")]
    InvalidCountryCode(String),

    #[error("Duplicated rate entry for {0}")]
    DuplicatedEntry(String),

    #[error("Too many rate entries: max {max}, got {got}")]
    TooManyEntries { max: usize, got: usize },

    #[error("CPM rate for {key} is too high: {value}")]
    RateTooHigh { key: String, value: u64 },

    #[error(transparent)]
    Amount(#[from] AmountError),
}
