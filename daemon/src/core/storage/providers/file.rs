use async_trait::async_trait;
use viewpay_common::{
    account::UserId,
    file::{FileRecord, LinkId},
    serializer::{Reader, ReaderError, Serializer, Writer},
    time::TimestampMillis,
};

use crate::core::error::LedgerError;

// Index entry of a file under its owner
// Sorted by owner, then upload time, then link id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerFileKey {
    pub owner: UserId,
    pub created_at: TimestampMillis,
    pub link_id: LinkId,
}

impl OwnerFileKey {
    pub fn from_file(file: &FileRecord) -> Self {
        Self {
            owner: file.owner,
            created_at: file.created_at,
            link_id: file.link_id.clone(),
        }
    }

    // Greater than any key of `owner`, used to iterate newest first
    pub fn max_for_owner(owner: UserId) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + 8 + 4);
        bytes.extend_from_slice(&owner.to_be_bytes());
        bytes.extend_from_slice(&u64::MAX.to_be_bytes());
        bytes.extend_from_slice(&u32::MAX.to_be_bytes());
        bytes
    }
}

impl Serializer for OwnerFileKey {
    fn write(&self, writer: &mut Writer) {
        writer.write_u64(&self.owner);
        writer.write_u64(&self.created_at);
        writer.write_string(&self.link_id);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            owner: reader.read_u64()?,
            created_at: reader.read_u64()?,
            link_id: reader.read_string()?,
        })
    }

    fn size(&self) -> usize {
        8 + 8 + 4 + self.link_id.len()
    }
}

#[async_trait]
pub trait FileProvider {
    async fn get_file(&self, link_id: &str) -> Result<Option<FileRecord>, LedgerError>;

    async fn has_file(&self, link_id: &str) -> Result<bool, LedgerError>;

    // Store a new file and index it under its owner
    async fn add_file(&mut self, file: &FileRecord) -> Result<(), LedgerError>;

    // Overwrite an existing file record
    async fn set_file(&mut self, file: &FileRecord) -> Result<(), LedgerError>;

    // Remove the file and its owner index entry
    async fn delete_file(&mut self, file: &FileRecord) -> Result<(), LedgerError>;

    // Files of `owner`, most recent upload first
    async fn get_files_by_owner(
        &self,
        owner: UserId,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<FileRecord>, LedgerError>;

    async fn count_files_by_owner(&self, owner: UserId) -> Result<u64, LedgerError>;

    async fn count_files(&self) -> Result<u64, LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_key_sorts_after_owner_files() {
        let key = OwnerFileKey {
            owner: 7,
            created_at: 1_700_000_000_000,
            link_id: "abcdef".into(),
        };
        assert!(key.to_bytes() < OwnerFileKey::max_for_owner(7));
        assert!(OwnerFileKey::max_for_owner(7) < 8u64.to_be_bytes().to_vec());
    }
}
