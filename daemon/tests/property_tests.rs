//! Property-based tests of the ledger balance rules
//!
//! Random sequences of credits, withdrawal requests and admin decisions
//! are replayed against a temporary RocksDB and compared with a plain model.

mod common;

use common::{open_ledger, temp_dir};
use proptest::prelude::*;
use viewpay_common::config::COIN_VALUE;
use viewpay_daemon::{config::MIN_WITHDRAWAL, core::error::LedgerError};

#[derive(Debug, Clone)]
enum Op {
    Credit(u64),
    Request(u64),
    Approve(usize),
    Reject(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u64..=3 * COIN_VALUE).prop_map(Op::Credit),
        (MIN_WITHDRAWAL..=8 * COIN_VALUE).prop_map(Op::Request),
        (0usize..8).prop_map(Op::Approve),
        (0usize..8).prop_map(Op::Reject),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_balance_matches_credits_minus_approvals(
        ops in prop::collection::vec(op_strategy(), 1..40)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let dir = temp_dir("viewpay-props");
            let ledger = open_ledger(&dir).await;
            ledger.get_or_create_user(1, None, None).await.unwrap();

            let mut balance = 0u64;
            let mut requests = Vec::new();
            for op in ops {
                match op {
                    Op::Credit(amount) => {
                        ledger.credit(1, amount).await.unwrap();
                        balance += amount;
                    }
                    Op::Request(amount) => {
                        match ledger.create_withdrawal(1, amount, "bank".into(), "x".into()).await {
                            Ok(withdrawal) => {
                                prop_assert!(amount <= balance);
                                requests.push((withdrawal.id, amount));
                            }
                            Err(LedgerError::InsufficientBalance { .. }) => prop_assert!(amount > balance),
                            Err(e) => panic!("unexpected error: {}", e),
                        }
                    }
                    Op::Approve(index) | Op::Reject(index) if index >= requests.len() => {}
                    Op::Approve(index) => {
                        let (id, amount) = requests[index];
                        match ledger.approve_withdrawal(id, None).await {
                            Ok(_) => balance -= amount,
                            Err(LedgerError::InsufficientBalance { .. }) => prop_assert!(amount > balance),
                            Err(LedgerError::WithdrawalNotPending { .. }) => {}
                            Err(e) => panic!("unexpected error: {}", e),
                        }
                    }
                    Op::Reject(index) => {
                        let (id, _) = requests[index];
                        match ledger.reject_withdrawal(id, None).await {
                            Ok(_) | Err(LedgerError::WithdrawalNotPending { .. }) => {}
                            Err(e) => panic!("unexpected error: {}", e),
                        }
                    }
                }

                prop_assert_eq!(ledger.get_user_balance(1).await.unwrap(), balance);
            }

            Ok(())
        })?;
    }
}
