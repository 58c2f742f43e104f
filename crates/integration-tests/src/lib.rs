//! Integration test support for the B-Mart storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bmart-integration-tests
//! ```
//!
//! No network access is needed: [`MockUpstreams`] stands up one `wiremock`
//! server per provider and the catalog is pointed at them.
//!
//! # Test Categories
//!
//! - `catalog_loading` - Fetch, merge, fallback and readiness
//! - `cart_persistence` - Cart durability over `FileStore`
//! - `auth_flows` - Registration, login and session handling

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bmart_storefront::catalog::{CatalogSettings, CatalogStore, Normalizer, SalePolicy};
use bmart_storefront::sources::{SourceClient, UpstreamSource};

/// Timeout used for upstream requests in tests.
pub const TEST_TIMEOUT: Duration = Duration::from_millis(500);

/// Install a test-friendly tracing subscriber. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("bmart_storefront=debug")
        .with_test_writer()
        .try_init();
}

/// Mock FakeStore and DummyJSON servers.
pub struct MockUpstreams {
    pub fakestore: MockServer,
    pub dummyjson: MockServer,
}

impl MockUpstreams {
    pub async fn start() -> Self {
        Self {
            fakestore: MockServer::start().await,
            dummyjson: MockServer::start().await,
        }
    }

    /// Catalog settings pointing at both mock servers.
    ///
    /// # Panics
    ///
    /// Panics if a mock server URI does not parse.
    #[must_use]
    pub fn settings(&self) -> CatalogSettings {
        let fakestore = Url::parse(&self.fakestore.uri()).expect("mock server URI");
        let dummyjson = Url::parse(&self.dummyjson.uri()).expect("mock server URI");
        let mut settings = CatalogSettings::with_sources(vec![
            UpstreamSource::fakestore(&fakestore).expect("fakestore endpoints"),
            UpstreamSource::dummyjson(&dummyjson).expect("dummyjson endpoints"),
        ]);
        settings.category_timeout = TEST_TIMEOUT;
        settings.product_timeout = TEST_TIMEOUT;
        settings
    }

    /// A catalog over both mock servers with deterministic randomness and no
    /// random sales.
    #[must_use]
    pub fn catalog(&self) -> CatalogStore {
        self.catalog_with(self.settings())
    }

    #[must_use]
    pub fn catalog_with(&self, settings: CatalogSettings) -> CatalogStore {
        CatalogStore::new(
            SourceClient::new(Duration::from_secs(60)),
            settings,
            Normalizer::new(SalePolicy::Never),
            StdRng::seed_from_u64(7),
        )
    }

    pub async fn mount_fakestore_products(&self, body: Value) {
        mount_json(&self.fakestore, "/products", body).await;
    }

    pub async fn mount_fakestore_categories(&self, body: Value) {
        mount_json(&self.fakestore, "/products/categories", body).await;
    }

    pub async fn mount_dummyjson_products(&self, body: Value) {
        mount_json(&self.dummyjson, "/products", body).await;
    }

    pub async fn mount_dummyjson_categories(&self, body: Value) {
        mount_json(&self.dummyjson, "/products/categories", body).await;
    }

    /// Make every endpoint of `server` answer 500.
    pub async fn fail_all(server: &MockServer) {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(server)
            .await;
    }

    /// Make every endpoint of `server` answer after `delay`.
    pub async fn delay_all(server: &MockServer, delay: Duration) {
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(delay),
            )
            .mount(server)
            .await;
    }
}

async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// =============================================================================
// Payload builders
// =============================================================================

/// A FakeStore product list with `count` distinct items.
#[must_use]
pub fn fakestore_products(count: usize) -> Value {
    Value::Array(
        (1..=count)
            .map(|i| {
                json!({
                    "id": i,
                    "title": format!("FakeStore Item {i}"),
                    "price": 10.5 + f64::from(u32::try_from(i).unwrap_or(0)),
                    "description": "A product from FakeStore",
                    "category": "electronics",
                    "image": format!("https://fakestoreapi.com/img/{i}.jpg"),
                    "rating": {"rate": 4.1, "count": 120}
                })
            })
            .collect(),
    )
}

/// A DummyJSON product envelope with `count` distinct items.
#[must_use]
pub fn dummyjson_products(count: usize) -> Value {
    let products: Vec<Value> = (1..=count)
        .map(|i| {
            json!({
                "id": i,
                "title": format!("DummyJSON Item {i}"),
                "description": "A product from DummyJSON",
                "price": 20,
                "discountPercentage": 12.5,
                "rating": 4.5,
                "stock": 7,
                "brand": "Apple",
                "category": "smartphones",
                "thumbnail": format!("https://dummyjson.com/img/{i}.png"),
                "images": []
            })
        })
        .collect();
    json!({ "products": products, "total": count, "skip": 0, "limit": 100 })
}
