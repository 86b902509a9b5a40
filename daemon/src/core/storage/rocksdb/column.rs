use strum::{AsRefStr, Display, EnumIter};

const PREFIX_USER_ID_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash, EnumIter, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    // {user_id} => {user}
    Users,
    // Users referred by a referrer
    // {referrer_id}{user_id} => {joined_at}
    ReferralDirects,

    // {link_id} => {file}
    Files,
    // {owner_id}{created_at}{link_id} => {}
    FilesByOwner,

    // Append-only log of credited views
    // {view_id} => {view_event}
    Views,
    // Last credited view per link and IP
    // {link_id}{ip} => {timestamp}
    LastViews,

    // {withdrawal_id} => {withdrawal}
    Withdrawals,
    // Withdrawals waiting for an admin decision
    // {withdrawal_id} => {}
    PendingWithdrawals,
    // {user_id}{withdrawal_id} => {}
    UserWithdrawals,

    // Misc data with no specific rules
    // rate table and counters
    Common,
}

impl Column {
    pub const fn prefix(&self) -> Option<usize> {
        use Column::*;

        match self {
            ReferralDirects | FilesByOwner | UserWithdrawals => Some(PREFIX_USER_ID_LEN),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_column_names_are_unique() {
        let mut names: Vec<String> = Column::iter().map(|c| c.to_string()).collect();
        let len = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), len);
        assert_eq!(Column::PendingWithdrawals.as_ref(), "pending_withdrawals");
    }
}
