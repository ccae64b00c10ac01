//! End-to-end cart and checkout scenarios over a shared in-memory store.

use gokit_cache::{KeyValueStore, MemoryStore};
use gokit_commerce::prelude::*;
use gokit_commerce::store::keys;

fn details() -> CustomerDetails {
    CustomerDetails::new(
        "Layla Haddad",
        "layla@example.com",
        "+971 50 123 4567",
        "12 Marina Walk",
        "Dubai",
        "00000",
    )
}

fn reference_cart(store: &CartStore<MemoryStore>) {
    let jersey = LineItem::new("1", 2, 75.0).with_customization(Customization {
        player_name: Some("Salah".to_string()),
        player_number: Some("11".to_string()),
        ..Default::default()
    });
    store.add(jersey).unwrap();
    store.add(LineItem::new("101", 1, 85.0)).unwrap();
}

#[tokio::test]
async fn test_failed_submission_keeps_cart_and_discount() {
    let store = CartStore::open(MemoryStore::new(), CommerceConfig::default()).unwrap();
    let sink = MemoryOrderSink::new();
    reference_cart(&store);
    store.apply_code("SALE10").unwrap();

    sink.set_failing(true);
    let request = CheckoutRequest::new(details(), false);
    let result = place_order(&store, &request, &sink).await;

    assert!(matches!(result, Err(CommerceError::OrderSubmission(_))));
    assert_eq!(store.items().unwrap().len(), 2);
    assert_eq!(store.applied_discount().unwrap().unwrap().code, "SALE10");
    assert_eq!(store.usage_ledger().unwrap().uses("SALE10"), 0);

    // Retry once the order store is back.
    sink.set_failing(false);
    let confirmation = place_order(&store, &request, &sink).await.unwrap();
    assert_eq!(confirmation.order.total, 236.5);
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn test_checkout_writes_empty_cart_and_counts_code_use() {
    let backend = MemoryStore::new();
    let store = CartStore::open(backend.clone(), CommerceConfig::default()).unwrap();
    let sink = MemoryOrderSink::new();
    reference_cart(&store);
    store.apply_code("gokit50").unwrap();

    let confirmation = place_order(&store, &CheckoutRequest::new(details(), true), &sink)
        .await
        .unwrap();

    let order = &confirmation.order;
    assert_eq!(order.subtotal, 235.0);
    assert_eq!(order.discount.amount, 50.0);
    assert_eq!(order.shipping.cost, 25.0);
    assert_eq!(order.total, 210.0);
    assert_eq!(order.items[0].customization.player_name.as_deref(), Some("Salah"));

    assert_eq!(backend.get(keys::CART).unwrap().as_deref(), Some("[]"));
    assert!(!backend.exists(keys::APPLIED_DISCOUNT).unwrap());
    assert_eq!(store.usage_ledger().unwrap().uses("GOKIT50"), 1);
    assert_eq!(store.saved_details().unwrap(), Some(details()));
}

#[tokio::test]
async fn test_code_rejected_after_three_checkouts() {
    let store = CartStore::open(MemoryStore::new(), CommerceConfig::default()).unwrap();
    let sink = MemoryOrderSink::new();
    let request = CheckoutRequest::new(details(), false);

    for _ in 0..3 {
        store.add(LineItem::new("1", 1, 75.0)).unwrap();
        store.apply_code("SALE10").unwrap();
        place_order(&store, &request, &sink).await.unwrap();
    }

    let result = store.apply_code("SALE10");
    assert!(matches!(result, Err(CommerceError::DiscountUsageLimitReached(_))));
    assert!(store.applied_discount().unwrap().is_none());

    // Other codes are unaffected.
    assert!(store.apply_code("GOKIT50").is_ok());
}

#[tokio::test]
async fn test_order_without_code_records_none() {
    let store = CartStore::open(MemoryStore::new(), CommerceConfig::default()).unwrap();
    let sink = MemoryOrderSink::new();
    store.add(LineItem::new("1", 4, 75.0)).unwrap();

    let confirmation = place_order(&store, &CheckoutRequest::new(details(), false), &sink)
        .await
        .unwrap();

    assert_eq!(confirmation.order.discount.code, "None");
    assert_eq!(confirmation.order.shipping.cost, 0.0);
    assert_eq!(confirmation.order.total, 300.0);
    assert!(store.usage_ledger().unwrap().uses("None") == 0);
}

#[tokio::test]
async fn test_other_tab_is_notified_and_rereads() {
    let tab_a = MemoryStore::new();
    let tab_b = tab_a.connect();
    let store_a = CartStore::open(tab_a, CommerceConfig::default()).unwrap();
    let store_b = CartStore::open(tab_b, CommerceConfig::default()).unwrap();
    let mut feed = store_b.subscribe();

    store_a.add(LineItem::new("1", 2, 75.0)).unwrap();

    assert_eq!(feed.next().await, Some(CartChange::Items));
    assert_eq!(store_b.item_count().unwrap(), 2);
    assert_eq!(store_b.totals().unwrap().total.display(), "AED 175.00");

    store_b.clear().unwrap();
    assert!(store_a.items().unwrap().is_empty());
}

#[tokio::test]
async fn test_legacy_cart_is_repaired_on_open() {
    let backend = MemoryStore::new();
    backend
        .set(
            keys::CART,
            r#"[
                {"productId": 1, "quantity": 2, "price": 75, "playerNumber": 7},
                {"productId": 101, "price": "85"}
            ]"#,
        )
        .unwrap();

    let store = CartStore::open(backend.clone(), CommerceConfig::default()).unwrap();
    let items = store.items().unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[1].quantity, 1);
    assert_eq!(items[0].customization.player_number.as_deref(), Some("7"));
    assert_eq!(store.totals().unwrap().subtotal.amount, 235.0);

    // Assigned ids were written back, so removal by id works.
    assert!(store.remove(&items[1].id).unwrap());
    assert_eq!(store.item_count().unwrap(), 2);
}
