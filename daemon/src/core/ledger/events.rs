use serde::Serialize;
use viewpay_common::{
    account::UserId,
    file::LinkId,
    rates::RateKey,
    time::TimestampMillis,
    withdrawal::WithdrawalId,
};

/// Notification emitted once a ledger mutation is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    UserRegistered {
        user: UserId,
        #[serde(skip_serializing_if = "Option::is_none")]
        referrer: Option<UserId>,
    },
    ViewCredited {
        link_id: LinkId,
        owner: UserId,
        country: RateKey,
        amount: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        referrer: Option<UserId>,
        commission: u64,
    },
    WithdrawalRequested {
        id: WithdrawalId,
        user: UserId,
        amount: u64,
    },
    WithdrawalApproved {
        id: WithdrawalId,
        user: UserId,
        amount: u64,
    },
    WithdrawalRejected {
        id: WithdrawalId,
        user: UserId,
        amount: u64,
    },
    RatesUpdated {
        updated_at: TimestampMillis,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_is_tagged() {
        let event = LedgerEvent::WithdrawalApproved {
            id: 3,
            user: 9,
            amount: 500_000_000,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "withdrawal_approved");
        assert_eq!(json["amount"], 500_000_000u64);
    }
}
