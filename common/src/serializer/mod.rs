mod defaults;
mod reader;
mod writer;

pub use reader::{Reader, ReaderError};
pub use writer::Writer;

// Binary codec used for everything persisted by the storage layer.
// Integers are written big-endian so that keys built from them sort
// in numeric order on disk.
pub trait Serializer {
    fn write(&self, writer: &mut Writer);

    fn read(reader: &mut Reader) -> Result<Self, ReaderError>
    where
        Self: Sized;

    fn size(&self) -> usize {
        self.to_bytes().len()
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut writer = Writer::new();
        self.write(&mut writer);
        writer.bytes()
    }

    fn to_hex(&self) -> String {
        self.to_bytes().iter().map(|b| format!("{:02x}", b)).collect()
    }

    // Decode a full value, every byte must be consumed
    fn from_bytes(bytes: &[u8]) -> Result<Self, ReaderError>
    where
        Self: Sized,
    {
        let mut reader = Reader::new(bytes);
        let value = Self::read(&mut reader)?;
        if reader.size() != 0 {
            return Err(ReaderError::InvalidSize);
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_sort_in_numeric_order() {
        let low = 255u64.to_bytes();
        let high = 256u64.to_bytes();
        assert!(low < high);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = 42u64.to_bytes();
        bytes.push(0);
        assert!(matches!(
            u64::from_bytes(&bytes),
            Err(ReaderError::InvalidSize)
        ));
    }

    #[test]
    fn test_option_and_string() {
        let value = Some("hello".to_string());
        let decoded = Option::<String>::from_bytes(&value.to_bytes()).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(value.size(), 1 + 4 + 5);

        let none: Option<String> = None;
        assert_eq!(none.to_bytes(), vec![0]);
    }

    #[test]
    fn test_truncated_input() {
        let bytes = "truncated".to_string().to_bytes();
        assert!(String::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }
}
