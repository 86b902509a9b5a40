use crate::{
    config::{BPS_DENOMINATOR, COIN_DECIMALS, COIN_VALUE},
    error::AmountError,
};

#[macro_export]
macro_rules! static_assert {
    ($cond:expr $(,)?) => {
        const _: () = assert!($cond);
    };
    ($cond:expr, $($arg:tt)+) => {
        const _: () = assert!($cond, $($arg)+);
    };
}

// Format an atomic amount into a human readable decimal value
// 500_000 => "0.00500000"
pub fn format_coin(value: u64) -> String {
    format_coin_with_decimals(value, COIN_DECIMALS)
}

pub fn format_coin_with_decimals(value: u64, decimals: u8) -> String {
    let scale = 10u64.pow(decimals as u32);
    format!(
        "{}.{:0width$}",
        value / scale,
        value % scale,
        width = decimals as usize
    )
}

// Parse a decimal string ("5", "5.0", "0.0005") into atomic units
// More decimals than COIN_DECIMALS are refused instead of silently truncated
pub fn parse_coin(value: &str) -> Result<u64, AmountError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AmountError::Empty);
    }

    let (integer, fraction) = match value.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (value, ""),
    };

    if integer.is_empty() && fraction.is_empty() {
        return Err(AmountError::InvalidFormat(value.to_owned()));
    }

    if !integer.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(AmountError::InvalidFormat(value.to_owned()));
    }

    if fraction.len() > COIN_DECIMALS as usize {
        return Err(AmountError::TooManyDecimals {
            max: COIN_DECIMALS,
            got: fraction.len(),
        });
    }

    let integer: u64 = if integer.is_empty() {
        0
    } else {
        integer.parse().map_err(|_| AmountError::Overflow)?
    };

    let fraction: u64 = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = COIN_DECIMALS as usize);
        padded.parse().map_err(|_| AmountError::Overflow)?
    };

    integer
        .checked_mul(COIN_VALUE)
        .and_then(|v| v.checked_add(fraction))
        .ok_or(AmountError::Overflow)
}

// amount * bps / 10_000, computed on u128 so it never overflows
pub fn apply_bps(amount: u64, bps: u16) -> u64 {
    ((amount as u128 * bps as u128) / BPS_DENOMINATOR as u128) as u64
}
