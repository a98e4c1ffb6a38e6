mod common;

use common::{adapter, checkout_patch};
use razorpay_session::domain::session::SessionState;
use razorpay_session::domain::status::PaymentStatus;
use razorpay_session::infrastructure::in_memory::InMemoryGateway;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

#[tokio::test]
async fn test_get_status_is_stable_under_repeated_polling() {
    let gateway = InMemoryGateway::new();
    let adapter = adapter(&gateway);
    let initiated = adapter.initiate(dec!(10), None, Some("cart")).await.unwrap();
    gateway.insert_payment("pay_1", &initiated.id, 1000, "authorized").await;
    let state = adapter.update_payment(&initiated.data, &checkout_patch(&initiated.id, "pay_1"));

    for _ in 0..10 {
        assert_eq!(adapter.get_status(&state).await, PaymentStatus::Authorized);
    }
}

#[tokio::test]
async fn test_get_status_degrades_to_pending() {
    let gateway = InMemoryGateway::new();
    let adapter = adapter(&gateway);
    let initiated = adapter.initiate(dec!(10), None, Some("cart")).await.unwrap();
    gateway.insert_payment("pay_1", &initiated.id, 1000, "captured").await;
    let state = adapter.update_payment(&initiated.data, &checkout_patch(&initiated.id, "pay_1"));

    gateway.fail_reads(true);
    for _ in 0..5 {
        assert_eq!(adapter.get_status(&state).await, PaymentStatus::Pending);
    }
    gateway.fail_reads(false);
    assert_eq!(adapter.get_status(&state).await, PaymentStatus::Captured);
}

#[tokio::test]
async fn test_get_status_ignores_unverified_payment_id() {
    let gateway = InMemoryGateway::new();
    let adapter = adapter(&gateway);
    let initiated = adapter.initiate(dec!(10), None, Some("cart")).await.unwrap();
    gateway.insert_payment("pay_other", "order_other", 1000, "captured").await;

    let mut state = initiated.data.clone();
    state.payment_id = Some("pay_other".into());
    state.signature = Some("0".repeat(64));

    // Falls through to the order, which is still unpaid.
    assert_eq!(adapter.get_status(&state).await, PaymentStatus::Pending);
    assert!(adapter.retrieve(state).await.payment_snapshot.is_none());
}

#[tokio::test]
async fn test_get_status_without_identifiers_is_pending() {
    let gateway = InMemoryGateway::new();
    let adapter = adapter(&gateway);

    assert_eq!(
        adapter.get_status(&SessionState::default()).await,
        PaymentStatus::Pending
    );
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sessions_are_independent() {
    let gateway = InMemoryGateway::new();
    let adapter = Arc::new(adapter(&gateway));

    let mut handles = Vec::new();
    for i in 1..=20_i64 {
        let adapter = Arc::clone(&adapter);
        let gateway = gateway.clone();
        handles.push(tokio::spawn(async move {
            let hint = format!("cart_{i}");
            let initiated = adapter
                .initiate(Decimal::from(i), None, Some(&hint))
                .await
                .unwrap();
            let payment_id = format!("pay_{i}");
            gateway
                .insert_payment(&payment_id, &initiated.id, i * 100, "authorized")
                .await;
            let state =
                adapter.update_payment(&initiated.data, &checkout_patch(&initiated.id, &payment_id));
            let captured = adapter.capture(state).await.unwrap();
            (i, captured)
        }));
    }

    for handle in handles {
        let (i, state) = handle.await.unwrap();
        assert_eq!(state.amount_subunits, Some(i * 100));
        assert_eq!(state.snapshot_status(), Some("captured"));
    }
    assert_eq!(gateway.order_count().await, 20);
}
