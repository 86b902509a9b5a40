use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer as SerdeSerializer};

use crate::{
    config::{COIN_VALUE, VIEWS_PER_CPM},
    error::RateError,
    serializer::{Reader, ReaderError, Serializer, Writer},
    time::TimestampMillis,
};

// Used when neither the viewer country nor OTHER has a rate
pub const DEFAULT_CPM: u64 = COIN_VALUE;

// Highest CPM accepted at the configuration boundary
pub const MAX_CPM: u64 = 1_000 * COIN_VALUE;

pub const OTHER_KEY: &str = "OTHER";

// Entries count is encoded on a u16
pub const MAX_RATE_ENTRIES: usize = u16::MAX as usize;

/// ISO 3166-1 alpha-2 country code, always upper-case ASCII.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryCode([u8; 2]);

impl CountryCode {
    pub const fn from_bytes_unchecked(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl FromStr for CountryCode {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(RateError::InvalidCountryCode(s.to_owned()));
        }

        Ok(Self([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
        ]))
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of the rate table and of per-file geo statistics.
/// A viewer country is either a known code or falls into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RateKey {
    Country(CountryCode),
    Other,
}

impl RateKey {
    // Lenient parsing used for the country reported by the delivery page:
    // anything that is not a valid code is accounted as OTHER
    pub fn from_viewer_country(country: &str) -> Self {
        country.parse().unwrap_or(Self::Other)
    }

    pub fn is_other(&self) -> bool {
        matches!(self, Self::Other)
    }
}

impl FromStr for RateKey {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(OTHER_KEY) {
            return Ok(Self::Other);
        }

        CountryCode::from_str(s).map(Self::Country)
    }
}

impl fmt::Display for RateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Country(code) => code.fmt(f),
            Self::Other => f.write_str(OTHER_KEY),
        }
    }
}

impl Serialize for RateKey {
    fn serialize<S: SerdeSerializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}

impl Serializer for RateKey {
    fn write(&self, writer: &mut Writer) {
        match self {
            Self::Other => writer.write_u8(0),
            Self::Country(code) => {
                writer.write_u8(1);
                writer.write_bytes(&code.0);
            }
        }
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(match reader.read_u8()? {
            0 => Self::Other,
            1 => {
                let bytes: [u8; 2] = reader.read_bytes()?;
                if !bytes.iter().all(u8::is_ascii_uppercase) {
                    return Err(ReaderError::InvalidValue);
                }
                Self::Country(CountryCode(bytes))
            }
            _ => return Err(ReaderError::InvalidValue),
        })
    }

    fn size(&self) -> usize {
        match self {
            Self::Other => 1,
            Self::Country(_) => 3,
        }
    }
}

/// Process-wide CPM configuration.
/// Values are atomic units paid per 1000 credited views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    pub rates: IndexMap<RateKey, u64>,
    pub updated_at: TimestampMillis,
}

impl RateTable {
    pub fn new(rates: IndexMap<RateKey, u64>, updated_at: TimestampMillis) -> Self {
        Self { rates, updated_at }
    }

    // Build a table from raw admin input, validating every key and value
    pub fn from_entries<K, I>(entries: I, updated_at: TimestampMillis) -> Result<Self, RateError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, u64)>,
    {
        let mut rates = IndexMap::new();
        for (key, cpm) in entries {
            let key: RateKey = key.as_ref().parse()?;
            validate_cpm(&key, cpm)?;
            if rates.insert(key, cpm).is_some() {
                return Err(RateError::DuplicatedEntry(key.to_string()));
            }
        }

        Ok(Self { rates, updated_at })
    }

    // Same checks as `from_entries`, for a table built from already parsed keys
    pub fn validate(&self) -> Result<(), RateError> {
        if self.rates.len() > MAX_RATE_ENTRIES {
            return Err(RateError::TooManyEntries {
                max: MAX_RATE_ENTRIES,
                got: self.rates.len(),
            });
        }

        for (key, cpm) in self.rates.iter() {
            validate_cpm(key, *cpm)?;
        }
        Ok(())
    }

    pub fn get(&self, key: &RateKey) -> Option<u64> {
        self.rates.get(key).copied()
    }

    pub fn set(&mut self, key: RateKey, cpm: u64) -> Result<Option<u64>, RateError> {
        validate_cpm(&key, cpm)?;
        Ok(self.rates.insert(key, cpm))
    }

    // country => OTHER => DEFAULT_CPM
    pub fn cpm_for(&self, key: &RateKey) -> u64 {
        self.get(key)
            .or_else(|| self.get(&RateKey::Other))
            .unwrap_or(DEFAULT_CPM)
    }

    // Amount credited for a single view
    pub fn earnings_for(&self, key: &RateKey) -> u64 {
        self.cpm_for(key) / VIEWS_PER_CPM
    }
}

fn validate_cpm(key: &RateKey, cpm: u64) -> Result<(), RateError> {
    if cpm > MAX_CPM {
        return Err(RateError::RateTooHigh {
            key: key.to_string(),
            value: cpm,
        });
    }
    Ok(())
}

impl Default for RateTable {
    fn default() -> Self {
        let mut rates = IndexMap::new();
        rates.insert(
            RateKey::Country(CountryCode::from_bytes_unchecked(*b"US")),
            5 * COIN_VALUE,
        );
        rates.insert(
            RateKey::Country(CountryCode::from_bytes_unchecked(*b"GB")),
            4 * COIN_VALUE,
        );
        rates.insert(
            RateKey::Country(CountryCode::from_bytes_unchecked(*b"IN")),
            2 * COIN_VALUE,
        );
        rates.insert(RateKey::Other, COIN_VALUE);

        Self {
            rates,
            updated_at: 0,
        }
    }
}

impl Serializer for RateTable {
    fn write(&self, writer: &mut Writer) {
        writer.write_u16(&(self.rates.len() as u16));
        for (key, cpm) in self.rates.iter() {
            key.write(writer);
            writer.write_u64(cpm);
        }
        writer.write_u64(&self.updated_at);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let len = reader.read_u16()? as usize;
        let mut rates = IndexMap::with_capacity(len);
        for _ in 0..len {
            let key = RateKey::read(reader)?;
            let cpm = reader.read_u64()?;
            if rates.insert(key, cpm).is_some() {
                return Err(ReaderError::InvalidValue);
            }
        }
        let updated_at = reader.read_u64()?;

        Ok(Self { rates, updated_at })
    }

    fn size(&self) -> usize {
        2 + self
            .rates
            .keys()
            .map(|key| key.size() + 8)
            .sum::<usize>()
            + 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn us() -> RateKey {
        "US".parse().unwrap()
    }

    #[test]
    fn test_country_code_parsing() {
        assert_eq!("us".parse::<RateKey>().unwrap(), us());
        assert_eq!(" other ".parse::<RateKey>().unwrap(), RateKey::Other);
        assert!("USA".parse::<RateKey>().is_err());
        assert!("1A".parse::<RateKey>().is_err());
        assert!("".parse::<RateKey>().is_err());
    }

    #[test]
    fn test_viewer_country_is_lenient() {
        assert_eq!(RateKey::from_viewer_country("de"), "DE".parse().unwrap());
        assert_eq!(RateKey::from_viewer_country("Unknown"), RateKey::Other);
        assert_eq!(RateKey::from_viewer_country(""), RateKey::Other);
    }

    #[test]
    fn test_fallback_chain() {
        let table = RateTable::default();
        assert_eq!(table.earnings_for(&us()), 500_000);
        // Unknown country falls back on OTHER
        assert_eq!(table.earnings_for(&"FR".parse().unwrap()), 100_000);

        // Without OTHER we end on the hard-coded default
        let table = RateTable::from_entries([("US", 5 * COIN_VALUE)], 0).unwrap();
        assert_eq!(table.cpm_for(&"FR".parse().unwrap()), DEFAULT_CPM);
        assert_eq!(table.cpm_for(&RateKey::Other), DEFAULT_CPM);
    }

    #[test]
    fn test_from_entries_validation() {
        assert!(matches!(
            RateTable::from_entries([("US", 1), ("us", 2)], 0),
            Err(RateError::DuplicatedEntry(_))
        ));
        assert!(matches!(
            RateTable::from_entries([("Mars", 1)], 0),
            Err(RateError::InvalidCountryCode(_))
        ));
        assert!(matches!(
            RateTable::from_entries([("OTHER", MAX_CPM + 1)], 0),
            Err(RateError::RateTooHigh { .. })
        ));
    }

    #[test]
    fn test_validate_parsed_table() {
        assert!(RateTable::default().validate().is_ok());
        assert!(RateTable::new(IndexMap::new(), 0).validate().is_ok());

        let mut rates = IndexMap::new();
        rates.insert(us(), 5 * COIN_VALUE);
        rates.insert(RateKey::Other, MAX_CPM + 1);
        assert_eq!(
            RateTable::new(rates, 0).validate(),
            Err(RateError::RateTooHigh {
                key: OTHER_KEY.to_owned(),
                value: MAX_CPM + 1,
            })
        );
    }

    #[test]
    fn test_binary_codec_keeps_order() {
        let mut table = RateTable::default();
        table.set("FR".parse().unwrap(), 3 * COIN_VALUE).unwrap();
        table.updated_at = 1_700_000_000_000;

        let bytes = table.to_bytes();
        assert_eq!(bytes.len(), table.size());
        let decoded = RateTable::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, table);
        assert_eq!(
            decoded.rates.keys().last().copied(),
            Some("FR".parse().unwrap())
        );
    }

    #[test]
    fn test_json_uses_plain_keys() {
        let json = serde_json::to_value(RateTable::default()).unwrap();
        assert_eq!(json["rates"]["US"], 5 * COIN_VALUE);
        assert_eq!(json["rates"]["OTHER"], COIN_VALUE);

        let decoded: RateTable = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, RateTable::default());
    }
}
