//! End-to-end cart flows: real catalog over HTTP, file-backed persistence,
//! checkout submission.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use wealthproxies_client::storage::FileStorage;
use wealthproxies_client::{ApiClient, CartStore, ClientError, ProductCatalog};
use wealthproxies_core::{Price, ProductId, VariantId};

use wealthproxies_integration_tests::StubBackend;

fn cart_store(
    backend: &StubBackend,
    storage: Arc<FileStorage>,
) -> CartStore<ProductCatalog> {
    let config = backend.client_config();
    let api = ApiClient::new(&config, storage.clone());
    CartStore::new(ProductCatalog::new(api), storage)
}

fn fresh_storage(backend: &StubBackend) -> Arc<FileStorage> {
    let config = backend.client_config();
    Arc::new(FileStorage::new(&config.storage_dir).expect("storage dir"))
}

#[tokio::test]
async fn add_merge_and_totals_over_http() {
    let backend = StubBackend::spawn().await;
    let store = cart_store(&backend, fresh_storage(&backend));

    let residential = ProductId::new("prod_res");
    store
        .add_item(&residential, &VariantId::new("var_5gb"), 2)
        .await
        .expect("add");
    store
        .add_item(&residential, &VariantId::new("var_5gb"), 3)
        .await
        .expect("add");
    let cart = store
        .add_item(&ProductId::new("prod_isp"), &VariantId::new("var_10ip"), 1)
        .await
        .expect("add");

    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.total_items, 6);
    assert_eq!(cart.total_amount, Price::from_minor(5 * 4500 + 12000));

    // The denormalized snapshot carries the full product for offline display.
    let line = cart.items.first().expect("line");
    assert_eq!(line.product.name, "Residential Proxies");
    assert_eq!(line.variant.price, Price::from_minor(4500));
}

#[tokio::test]
async fn catalog_is_cached_between_adds() {
    let backend = StubBackend::spawn().await;
    let store = cart_store(&backend, fresh_storage(&backend));

    let residential = ProductId::new("prod_res");
    store
        .add_item(&residential, &VariantId::new("var_5gb"), 1)
        .await
        .expect("add");
    store
        .add_item(&residential, &VariantId::new("var_10gb"), 1)
        .await
        .expect("add");

    assert_eq!(backend.state.products_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_product_or_variant_is_not_found() {
    let backend = StubBackend::spawn().await;
    let store = cart_store(&backend, fresh_storage(&backend));

    let err = store
        .add_item(&ProductId::new("prod_nope"), &VariantId::new("var_5gb"), 1)
        .await
        .expect_err("unknown product");
    assert!(matches!(err, ClientError::NotFound(_)));

    let err = store
        .add_item(&ProductId::new("prod_res"), &VariantId::new("var_nope"), 1)
        .await
        .expect_err("unknown variant");
    assert!(matches!(err, ClientError::NotFound(_)));

    assert_eq!(store.item_count(), 0);
}

#[tokio::test]
async fn cart_round_trips_through_file_storage() {
    let backend = StubBackend::spawn().await;
    let storage = fresh_storage(&backend);

    let store = cart_store(&backend, storage.clone());
    store
        .add_item(&ProductId::new("prod_res"), &VariantId::new("var_5gb"), 2)
        .await
        .expect("add");
    let before = store.current_cart();

    // Simulated page reload.
    let reloaded = cart_store(&backend, storage);
    assert_eq!(reloaded.current_cart(), before);
    assert_eq!(reloaded.item_count(), 2);
}

#[tokio::test]
async fn cleared_cart_is_what_a_reload_sees() {
    let backend = StubBackend::spawn().await;
    let storage = fresh_storage(&backend);

    let store = cart_store(&backend, storage.clone());
    store
        .add_item(&ProductId::new("prod_res"), &VariantId::new("var_5gb"), 2)
        .await
        .expect("add");
    store.clear();

    let reloaded = cart_store(&backend, storage);
    let cart = reloaded.current_cart();
    assert!(cart.items.is_empty());
    assert_eq!(cart.total_items, 0);
    assert_eq!(cart.total_amount, Price::ZERO);
}

#[tokio::test]
async fn checkout_submits_snapshot_and_returns_payment_url() {
    let backend = StubBackend::spawn().await;
    let storage = fresh_storage(&backend);
    let config = backend.client_config();
    let api = ApiClient::new(&config, storage.clone());
    let store = CartStore::new(ProductCatalog::new(api.clone()), storage);

    store
        .add_item(&ProductId::new("prod_res"), &VariantId::new("var_10gb"), 1)
        .await
        .expect("add");

    let response = api
        .create_order(&store.checkout_request())
        .await
        .expect("order");
    assert!(response.url.starts_with("https://checkout.stripe.com/"));
}

#[tokio::test]
async fn checkout_of_empty_cart_is_rejected_by_backend() {
    let backend = StubBackend::spawn().await;
    let storage = fresh_storage(&backend);
    let config = backend.client_config();
    let api = ApiClient::new(&config, storage.clone());
    let store = CartStore::new(ProductCatalog::new(api.clone()), storage);

    let err = api
        .create_order(&store.checkout_request())
        .await
        .expect_err("empty cart");
    let message = err.to_string();
    assert!(message.contains("cart is empty"));
}
