//! Ledger events are broadcast once the change is committed.

mod common;

use common::{open_ledger, temp_dir, user_with_file};
use tokio::sync::broadcast::error::TryRecvError;
use viewpay_common::{config::COIN_VALUE, time::get_current_time_in_millis};
use viewpay_daemon::core::ledger::LedgerEvent;

#[tokio::test]
async fn test_events_follow_mutations() {
    let dir = temp_dir("viewpay-events");
    let ledger = open_ledger(&dir).await;
    let mut events = ledger.subscribe();

    ledger.get_or_create_user(2, None, None).await.unwrap();
    user_with_file(&ledger, 1, Some(2), "abc").await;
    assert_eq!(
        events.try_recv().unwrap(),
        LedgerEvent::UserRegistered {
            user: 2,
            referrer: None
        }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        LedgerEvent::UserRegistered {
            user: 1,
            referrer: Some(2)
        }
    );

    let t = get_current_time_in_millis();
    ledger.record_view_at("abc", "1.1.1.1", "US", None, t).await.unwrap();
    match events.try_recv().unwrap() {
        LedgerEvent::ViewCredited {
            owner,
            amount,
            referrer,
            commission,
            ..
        } => {
            assert_eq!(owner, 1);
            assert_eq!(amount, 500_000);
            assert_eq!(referrer, Some(2));
            assert_eq!(commission, 50_000);
        }
        other => panic!("unexpected event {:?}", other),
    }

    // Duplicates and failures are silent
    ledger.record_view_at("abc", "1.1.1.1", "US", None, t).await.unwrap();
    assert!(ledger.create_withdrawal(1, 5 * COIN_VALUE, "bank".into(), "x".into()).await.is_err());
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    ledger.credit(1, 5 * COIN_VALUE).await.unwrap();
    let withdrawal = ledger
        .create_withdrawal(1, 5 * COIN_VALUE, "bank".into(), "x".into())
        .await
        .unwrap();
    ledger.approve_withdrawal(withdrawal.id, None).await.unwrap();
    assert_eq!(
        events.try_recv().unwrap(),
        LedgerEvent::WithdrawalRequested {
            id: withdrawal.id,
            user: 1,
            amount: 5 * COIN_VALUE
        }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        LedgerEvent::WithdrawalApproved {
            id: withdrawal.id,
            user: 1,
            amount: 5 * COIN_VALUE
        }
    );
}

#[tokio::test]
async fn test_mutations_succeed_without_subscriber() {
    let dir = temp_dir("viewpay-no-subscriber");
    let ledger = open_ledger(&dir).await;
    drop(ledger.subscribe());

    user_with_file(&ledger, 1, None, "abc").await;
    assert!(ledger.record_view("abc", "1.1.1.1", "FR", None).await.unwrap());
    assert!(matches!(
        ledger.set_rate("FR".parse().unwrap(), 3 * COIN_VALUE).await,
        Ok(_)
    ));
}
