use serde::{Deserialize, Serialize};

use crate::{
    serializer::{Reader, ReaderError, Serializer, Writer},
    time::TimestampMillis,
};

// Identity given by the chat platform
pub type UserId = u64;

/// A user of the ledger, created on first contact and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Spendable balance in atomic units
    pub balance: u64,
    /// Credited views across all files of this user
    pub total_views: u64,
    pub files_uploaded: u64,
    /// Set once at creation, never changed afterwards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<UserId>,
    pub referral_count: u64,
    /// Registration bonuses and view commissions received as a referrer
    pub referral_earnings: u64,
    pub created_at: TimestampMillis,
    pub updated_at: TimestampMillis,
}

impl User {
    pub fn new(
        id: UserId,
        username: Option<String>,
        referrer: Option<UserId>,
        created_at: TimestampMillis,
    ) -> Self {
        Self {
            id,
            username,
            balance: 0,
            total_views: 0,
            files_uploaded: 0,
            referrer,
            referral_count: 0,
            referral_earnings: 0,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn has_referrer(&self) -> bool {
        self.referrer.is_some()
    }
}

impl Serializer for User {
    fn write(&self, writer: &mut Writer) {
        writer.write_u64(&self.id);
        self.username.write(writer);
        writer.write_u64(&self.balance);
        writer.write_u64(&self.total_views);
        writer.write_u64(&self.files_uploaded);
        self.referrer.write(writer);
        writer.write_u64(&self.referral_count);
        writer.write_u64(&self.referral_earnings);
        writer.write_u64(&self.created_at);
        writer.write_u64(&self.updated_at);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let id = reader.read_u64()?;
        let username = Option::<String>::read(reader)?;
        let balance = reader.read_u64()?;
        let total_views = reader.read_u64()?;
        let files_uploaded = reader.read_u64()?;
        let referrer = Option::<UserId>::read(reader)?;
        let referral_count = reader.read_u64()?;
        let referral_earnings = reader.read_u64()?;
        let created_at = reader.read_u64()?;
        let updated_at = reader.read_u64()?;

        Ok(Self {
            id,
            username,
            balance,
            total_views,
            files_uploaded,
            referrer,
            referral_count,
            referral_earnings,
            created_at,
            updated_at,
        })
    }

    fn size(&self) -> usize {
        8 + self.username.size()
            + 8 * 3
            + self.referrer.size()
            + 8 * 4
    }
}

/// Public view of a user balance and activity, aggregated over their files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub balance: u64,
    pub total_views: u64,
    pub files_uploaded: u64,
    pub geo_breakdown: indexmap::IndexMap<crate::rates::RateKey, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferredUser {
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub joined_at: TimestampMillis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralStats {
    pub referral_count: u64,
    pub referral_earnings: u64,
    pub referred_users: Vec<ReferredUser>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_codec_size() {
        let mut user = User::new(42, Some("alice".into()), Some(7), 1_000);
        user.balance = 500_000;
        user.total_views = 1;

        let bytes = user.to_bytes();
        assert_eq!(bytes.len(), user.size());
        assert_eq!(User::from_bytes(&bytes).unwrap(), user);
    }

    #[test]
    fn test_new_user_starts_empty() {
        let user = User::new(1, None, None, 10);
        assert_eq!(user.balance, 0);
        assert_eq!(user.updated_at, user.created_at);
        assert!(!user.has_referrer());
    }
}
