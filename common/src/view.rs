use serde::{Deserialize, Serialize};

use crate::{
    file::LinkId,
    rates::RateKey,
    serializer::{Reader, ReaderError, Serializer, Writer},
    time::TimestampMillis,
};

/// A credited hit on a short link. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewEvent {
    pub link_id: LinkId,
    pub ip: String,
    pub country: RateKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub timestamp: TimestampMillis,
}

impl ViewEvent {
    pub fn key(&self) -> ViewKey {
        ViewKey::new(self.link_id.clone(), self.ip.clone())
    }
}

impl Serializer for ViewEvent {
    fn write(&self, writer: &mut Writer) {
        writer.write_string(&self.link_id);
        writer.write_string(&self.ip);
        self.country.write(writer);
        self.user_agent.write(writer);
        writer.write_u64(&self.timestamp);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            link_id: reader.read_string()?,
            ip: reader.read_string()?,
            country: RateKey::read(reader)?,
            user_agent: Option::read(reader)?,
            timestamp: reader.read_u64()?,
        })
    }
}

/// Dedup identity of a viewer on a link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewKey {
    pub link_id: LinkId,
    pub ip: String,
}

impl ViewKey {
    pub fn new(link_id: LinkId, ip: String) -> Self {
        Self { link_id, ip }
    }
}

impl Serializer for ViewKey {
    fn write(&self, writer: &mut Writer) {
        writer.write_string(&self.link_id);
        writer.write_string(&self.ip);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let link_id = reader.read_string()?;
        let ip = reader.read_string()?;
        Ok(Self { link_id, ip })
    }

    fn size(&self) -> usize {
        4 + self.link_id.len() + 4 + self.ip.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_key_is_unambiguous() {
        // Length prefixes keep ("ab", "c") and ("a", "bc") apart
        let a = ViewKey::new("ab".into(), "c".into()).to_bytes();
        let b = ViewKey::new("a".into(), "bc".into()).to_bytes();
        assert_ne!(a, b);
    }
}
