use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    account::UserId,
    serializer::{Reader, ReaderError, Serializer, Writer},
    time::TimestampMillis,
};

pub type WithdrawalId = u64;

/// Lifecycle of a cash-out request.
/// `Pending` moves exactly once to one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
}

impl WithdrawalStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    // Only pending -> terminal is allowed
    pub fn can_transition_to(&self, next: WithdrawalStatus) -> bool {
        matches!(self, Self::Pending) && next.is_terminal()
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        })
    }
}

impl Serializer for WithdrawalStatus {
    fn write(&self, writer: &mut Writer) {
        writer.write_u8(match self {
            Self::Pending => 0,
            Self::Approved => 1,
            Self::Rejected => 2,
        });
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(match reader.read_u8()? {
            0 => Self::Pending,
            1 => Self::Approved,
            2 => Self::Rejected,
            _ => return Err(ReaderError::InvalidValue),
        })
    }

    fn size(&self) -> usize {
        1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: WithdrawalId,
    pub user: UserId,
    /// Requested amount in atomic units, never zero
    pub amount: u64,
    pub payment_method: String,
    pub payment_details: String,
    pub status: WithdrawalStatus,
    pub created_at: TimestampMillis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<TimestampMillis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
}

impl Withdrawal {
    pub fn new(
        id: WithdrawalId,
        user: UserId,
        amount: u64,
        payment_method: String,
        payment_details: String,
        created_at: TimestampMillis,
    ) -> Self {
        Self {
            id,
            user,
            amount,
            payment_method,
            payment_details,
            status: WithdrawalStatus::Pending,
            created_at,
            processed_at: None,
            admin_note: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == WithdrawalStatus::Pending
    }
}

impl Serializer for Withdrawal {
    fn write(&self, writer: &mut Writer) {
        writer.write_u64(&self.id);
        writer.write_u64(&self.user);
        writer.write_u64(&self.amount);
        writer.write_string(&self.payment_method);
        writer.write_string(&self.payment_details);
        self.status.write(writer);
        writer.write_u64(&self.created_at);
        self.processed_at.write(writer);
        self.admin_note.write(writer);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let id = reader.read_u64()?;
        let user = reader.read_u64()?;
        let amount = reader.read_u64()?;
        let payment_method = reader.read_string()?;
        let payment_details = reader.read_string()?;
        let status = WithdrawalStatus::read(reader)?;
        let created_at = reader.read_u64()?;
        let processed_at = Option::<TimestampMillis>::read(reader)?;
        let admin_note = Option::<String>::read(reader)?;

        Ok(Self {
            id,
            user,
            amount,
            payment_method,
            payment_details,
            status,
            created_at,
            processed_at,
            admin_note,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use WithdrawalStatus::*;

        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Approved));
    }

    #[test]
    fn test_status_json() {
        let json = serde_json::to_string(&WithdrawalStatus::Approved).unwrap();
        assert_eq!(json, "\"approved\"");
    }

    #[test]
    fn test_withdrawal_codec() {
        let mut withdrawal = Withdrawal::new(3, 9, 500_000_000, "paypal".into(), "a@b.c".into(), 5);
        assert!(withdrawal.is_pending());
        withdrawal.status = WithdrawalStatus::Rejected;
        withdrawal.processed_at = Some(6);
        withdrawal.admin_note = Some("duplicate".into());

        let decoded = Withdrawal::from_bytes(&withdrawal.to_bytes()).unwrap();
        assert_eq!(decoded, withdrawal);
    }
}
