use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    account::UserId,
    rates::RateKey,
    serializer::{Reader, ReaderError, Serializer, Writer},
    time::TimestampMillis,
};

// Short link identifier handed out when a file is uploaded
pub type LinkId = String;

/// A monetized file reachable through its short link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub link_id: LinkId,
    pub owner: UserId,
    pub file_name: String,
    pub file_type: String,
    /// Credited views only
    pub views: u64,
    pub geo_stats: IndexMap<RateKey, u64>,
    pub created_at: TimestampMillis,
}

impl FileRecord {
    pub fn new(
        link_id: LinkId,
        owner: UserId,
        file_name: String,
        file_type: String,
        created_at: TimestampMillis,
    ) -> Self {
        Self {
            link_id,
            owner,
            file_name,
            file_type,
            views: 0,
            geo_stats: IndexMap::new(),
            created_at,
        }
    }

    // Account a credited view coming from `country`
    pub fn record_view(&mut self, country: RateKey) {
        self.views = self.views.saturating_add(1);
        let counter = self.geo_stats.entry(country).or_insert(0);
        *counter = counter.saturating_add(1);
    }
}

impl Serializer for FileRecord {
    fn write(&self, writer: &mut Writer) {
        writer.write_string(&self.link_id);
        writer.write_u64(&self.owner);
        writer.write_string(&self.file_name);
        writer.write_string(&self.file_type);
        writer.write_u64(&self.views);
        writer.write_u16(&(self.geo_stats.len() as u16));
        for (country, count) in self.geo_stats.iter() {
            country.write(writer);
            writer.write_u64(count);
        }
        writer.write_u64(&self.created_at);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let link_id = reader.read_string()?;
        let owner = reader.read_u64()?;
        let file_name = reader.read_string()?;
        let file_type = reader.read_string()?;
        let views = reader.read_u64()?;
        let len = reader.read_u16()? as usize;
        let mut geo_stats = IndexMap::with_capacity(len);
        for _ in 0..len {
            let country = RateKey::read(reader)?;
            let count = reader.read_u64()?;
            geo_stats.insert(country, count);
        }
        let created_at = reader.read_u64()?;

        Ok(Self {
            link_id,
            owner,
            file_name,
            file_type,
            views,
            geo_stats,
            created_at,
        })
    }
}
