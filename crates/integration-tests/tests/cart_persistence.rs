//! Integration tests for cart durability over file-backed storage.
//!
//! Run with: cargo test -p bmart-integration-tests --test cart_persistence

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use rust_decimal::Decimal;

use bmart_core::{ApiSource, ProductId, UserId};
use bmart_integration_tests::init_tracing;
use bmart_storefront::cart::{CartError, CartStore};
use bmart_storefront::models::CurrentUser;
use bmart_storefront::models::session::keys;
use bmart_storefront::notify::{NotificationLevel, RecordingNotifier};
use bmart_storefront::storage::{FileStore, KeyValueStore};
use bmart_storefront::types::CartProduct;

fn cart_product(source: ApiSource, local: i64, title: &str, cents: i64) -> CartProduct {
    let id = ProductId::new(source, local).unwrap();
    CartProduct {
        id,
        title: title.to_owned(),
        unit_price: Decimal::new(cents, 2),
        image: format!("https://picsum.photos/300/300?random={}", id.global()),
    }
}

fn open_cart(dir: &std::path::Path) -> (CartStore, Arc<RecordingNotifier>) {
    let store = Arc::new(FileStore::open(dir).unwrap());
    let notifier = Arc::new(RecordingNotifier::new());
    (CartStore::new(store, notifier.clone()), notifier)
}

#[test]
fn test_cart_survives_reopen() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    {
        let (cart, _) = open_cart(dir.path());
        let mug = cart_product(ApiSource::FakeStore, 4, "Coffee Mug", 1500);
        cart.add_to_cart(&mug).unwrap();
        cart.add_to_cart(&mug).unwrap();
        cart.add_to_cart(&cart_product(ApiSource::DummyJson, 9, "Lamp", 1000))
            .unwrap();
    }

    let (cart, _) = open_cart(dir.path());
    let lines = cart.get_cart();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].id, 4);
    assert_eq!(lines[0].quantity, 2);
    assert_eq!(lines[1].id, 1009);
    assert_eq!(cart.item_count(), 3);

    // 40.00 subtotal pays shipping.
    let summary = cart.summary();
    assert_eq!(summary.subtotal, Decimal::new(4000, 2));
    assert_eq!(summary.shipping, Decimal::new(599, 2));
    assert_eq!(summary.tax, Decimal::new(320, 2));
    assert_eq!(summary.total, Decimal::new(4919, 2));
}

#[test]
fn test_two_handles_share_one_cart() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let (first, _) = open_cart(dir.path());
    let (second, _) = open_cart(dir.path());

    let shoes = cart_product(ApiSource::Synthetic, 12, "Nike Shoes 12", 3000);
    first.add_to_cart(&shoes).unwrap();
    second.update_quantity(shoes.id.global(), 1).unwrap();

    assert_eq!(first.get_cart()[0].quantity, 2);

    // 60.00 subtotal ships free.
    let summary = first.summary();
    assert_eq!(summary.shipping, Decimal::ZERO);
    assert_eq!(summary.tax, Decimal::new(480, 2));
    assert_eq!(summary.total, Decimal::new(6480, 2));

    second.update_quantity(shoes.id.global(), -5).unwrap();
    assert!(first.get_cart().is_empty());
}

#[test]
fn test_corrupt_cart_file_reads_as_empty() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    store.set(keys::CART, "{\"not\": \"a cart\"").unwrap();

    let (cart, _) = open_cart(dir.path());
    assert!(cart.get_cart().is_empty());
    assert_eq!(cart.item_count(), 0);
}

#[test]
fn test_checkout_clears_persisted_cart() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let (cart, notifier) = open_cart(dir.path());

    assert!(matches!(cart.checkout(None), Err(CartError::EmptyCart)));
    assert_eq!(
        notifier.last().unwrap().level,
        NotificationLevel::Error
    );

    cart.add_to_cart(&cart_product(ApiSource::FakeStore, 1, "Backpack", 10995))
        .unwrap();
    assert!(matches!(cart.checkout(None), Err(CartError::LoginRequired)));
    assert_eq!(cart.item_count(), 1);

    let user = CurrentUser {
        id: UserId::new(1),
        name: "Demo User".to_owned(),
        email: "demo@bmart.com".parse().unwrap(),
        phone: String::new(),
        join_date: chrono::Utc::now(),
    };
    let charged = cart.checkout(Some(&user)).unwrap();
    assert_eq!(charged.subtotal, Decimal::new(10995, 2));
    assert_eq!(charged.shipping, Decimal::ZERO);
    assert!(!dir.path().join("bMartCart.json").exists());

    let (reopened, _) = open_cart(dir.path());
    assert!(reopened.get_cart().is_empty());
}
