//! Product catalog aggregated from the upstream demo APIs.
//!
//! [`CatalogStore::load`] runs two pipelines concurrently:
//!
//! - products: fetch every source, normalize, merge, de-duplicate, then top
//!   up with synthetic products if the result is thin (or replace it entirely
//!   if nothing came back)
//! - categories: fetch every source, merge distinct names, fall back to a
//!   fixed list if nothing came back
//!
//! Each pipeline flips its own ready flag when it finishes, whatever
//! happened upstream. Readiness is published on a `tokio::sync::watch`
//! channel so callers can await it or register a one-shot callback.

pub mod dedupe;
pub mod normalize;
pub mod query;
pub mod reviews;
pub mod synthetic;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use bmart_core::{ApiSource, ProductId};

use crate::sources::{SourceClient, SourceError, UpstreamSource};
use crate::types::Product;

pub use dedupe::dedupe;
pub use normalize::{NormalizeError, Normalizer, SalePolicy};
pub use query::SortKey;
pub use synthetic::SyntheticGenerator;

/// Default number of related products on a product page.
pub const DEFAULT_RELATED_LIMIT: usize = 4;
/// Default number of featured products on the home page.
pub const DEFAULT_FEATURED_PRODUCTS: usize = 8;
/// Default number of featured categories on the home page.
pub const DEFAULT_FEATURED_CATEGORIES: usize = 6;

/// Order in which category lists are merged.
const CATEGORY_PRECEDENCE: [ApiSource; 3] = [
    ApiSource::DummyJson,
    ApiSource::FakeStore,
    ApiSource::Synthetic,
];

/// Tunables for [`CatalogStore::load`].
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    /// Upstream providers. Products are merged in this order.
    pub sources: Vec<UpstreamSource>,
    pub category_timeout: Duration,
    pub product_timeout: Duration,
    /// Below this many products the catalog is topped up.
    pub min_products: usize,
    /// Synthetic products appended by a top-up.
    pub topup_products: usize,
    /// Synthetic catalog size when no source returns products.
    pub fallback_products: usize,
}

impl CatalogSettings {
    /// Default thresholds with the given sources.
    #[must_use]
    pub const fn with_sources(sources: Vec<UpstreamSource>) -> Self {
        Self {
            sources,
            category_timeout: Duration::from_millis(5000),
            product_timeout: Duration::from_millis(8000),
            min_products: 20,
            topup_products: 30,
            fallback_products: 50,
        }
    }
}

/// Which halves of the catalog have finished loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    pub products: bool,
    pub categories: bool,
    /// Times the catalog has become fully ready.
    completed: u64,
}

impl Readiness {
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.products && self.categories
    }

    fn mark(&mut self, part: Part) {
        let was_ready = self.is_ready();
        match part {
            Part::Products => self.products = true,
            Part::Categories => self.categories = true,
        }
        if !was_ready && self.is_ready() {
            self.completed += 1;
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Part {
    Products,
    Categories,
}

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Products,
    Categories,
}

impl Endpoint {
    const fn url(self, upstream: &UpstreamSource) -> &Url {
        match self {
            Self::Products => &upstream.products_url,
            Self::Categories => &upstream.categories_url,
        }
    }
}

/// Resolves once the catalog is ready.
///
/// Captures the completion count at creation so a ready state that is
/// immediately reset is still observed.
struct ReadyWaiter {
    rx: watch::Receiver<Readiness>,
    seen: u64,
}

impl ReadyWaiter {
    /// `false` if every store handle was dropped before the catalog became
    /// ready.
    async fn wait(mut self) -> bool {
        let seen = self.seen;
        self.rx
            .wait_for(|r| r.is_ready() || r.completed > seen)
            .await
            .is_ok()
    }
}

// =============================================================================
// CatalogStore
// =============================================================================

/// The product and category catalog.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    client: SourceClient,
    settings: CatalogSettings,
    normalizer: Normalizer,
    rng: Mutex<StdRng>,
    products: RwLock<Arc<[Product]>>,
    categories: RwLock<Arc<[String]>>,
    readiness: watch::Sender<Readiness>,
}

impl CatalogStore {
    /// Create an empty, not-ready catalog.
    #[must_use]
    pub fn new(
        client: SourceClient,
        settings: CatalogSettings,
        normalizer: Normalizer,
        rng: StdRng,
    ) -> Self {
        let (readiness, _) = watch::channel(Readiness::default());
        Self {
            inner: Arc::new(CatalogInner {
                client,
                settings,
                normalizer,
                rng: Mutex::new(rng),
                products: RwLock::new(Arc::from(Vec::new())),
                categories: RwLock::new(Arc::from(Vec::new())),
                readiness,
            }),
        }
    }

    /// Create a catalog seeded from OS entropy.
    #[must_use]
    pub fn from_settings(client: SourceClient, settings: CatalogSettings) -> Self {
        Self::new(
            client,
            settings,
            Normalizer::default(),
            StdRng::from_os_rng(),
        )
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load products and categories. Never fails; see the module docs.
    #[instrument(skip(self), fields(sources = self.inner.settings.sources.len()))]
    pub async fn load(&self) {
        tokio::join!(self.load_products(), self.load_categories());
        info!(
            products = self.products().len(),
            categories = self.categories().len(),
            "Catalog ready"
        );
    }

    async fn load_products(&self) {
        let timeout = self.inner.settings.product_timeout;
        let mut merged = Vec::new();

        for (source, outcome) in self.fetch_all(Endpoint::Products, timeout).await {
            match outcome {
                Ok(raw) => {
                    let items = normalize::extract_product_items(&raw);
                    let products = self.with_rng(|rng| {
                        self.inner.normalizer.normalize_products(source, items, rng)
                    });
                    info!(
                        %source,
                        received = items.len(),
                        count = products.len(),
                        "Fetched products"
                    );
                    merged.extend(products);
                }
                Err(e) => warn!(%source, error = %e, "Product source failed"),
            }
        }

        let products = self.complete_products(merged);
        self.publish_products(products);
    }

    /// De-duplicate and apply the synthetic top-up or fallback.
    fn complete_products(&self, merged: Vec<Product>) -> Vec<Product> {
        let settings = &self.inner.settings;
        let products = dedupe(merged);

        if products.is_empty() {
            warn!(
                count = settings.fallback_products,
                "No products from any source, using synthetic catalog"
            );
            let synthetic =
                self.with_rng(|rng| SyntheticGenerator::generate(settings.fallback_products, rng));
            return dedupe(synthetic);
        }

        if products.len() < settings.min_products {
            info!(
                have = products.len(),
                adding = settings.topup_products,
                "Topping up thin catalog with synthetic products"
            );
            let mut products = products;
            products.extend(
                self.with_rng(|rng| SyntheticGenerator::generate(settings.topup_products, rng)),
            );
            return dedupe(products);
        }

        products
    }

    async fn load_categories(&self) {
        let timeout = self.inner.settings.category_timeout;
        let mut outcomes = self.fetch_all(Endpoint::Categories, timeout).await;
        outcomes.sort_by_key(|(source, _)| {
            CATEGORY_PRECEDENCE
                .iter()
                .position(|s| s == source)
                .unwrap_or(CATEGORY_PRECEDENCE.len())
        });

        let mut seen = HashSet::new();
        let mut categories = Vec::new();
        for (source, outcome) in outcomes {
            match outcome {
                Ok(raw) => {
                    let names = normalize::normalize_categories(&raw);
                    info!(%source, count = names.len(), "Fetched categories");
                    for name in names {
                        if seen.insert(name.clone()) {
                            categories.push(name);
                        }
                    }
                }
                Err(e) => warn!(%source, error = %e, "Category source failed"),
            }
        }

        if categories.is_empty() {
            warn!("No categories from any source, using fallback list");
            categories = synthetic::fallback_categories();
        }

        self.publish_categories(categories);
    }

    /// Fetch one endpoint from every source concurrently, in source order.
    async fn fetch_all(
        &self,
        endpoint: Endpoint,
        timeout: Duration,
    ) -> Vec<(ApiSource, Result<Value, SourceError>)> {
        let mut tasks = JoinSet::new();
        for (index, upstream) in self.inner.settings.sources.iter().enumerate() {
            let client = self.inner.client.clone();
            let url = endpoint.url(upstream).clone();
            let source = upstream.source;
            tasks.spawn(async move { (index, source, client.fetch_json(&url, timeout).await) });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => error!(error = %e, "Source fetch task failed"),
            }
        }
        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, source, outcome)| (source, outcome))
            .collect()
    }

    pub(crate) fn publish_products(&self, products: Vec<Product>) {
        *self
            .inner
            .products
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::from(products);
        self.inner.readiness.send_modify(|r| r.mark(Part::Products));
    }

    pub(crate) fn publish_categories(&self, categories: Vec<String>) {
        *self
            .inner
            .categories
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::from(categories);
        self.inner
            .readiness
            .send_modify(|r| r.mark(Part::Categories));
    }

    /// Clear both snapshots and flags.
    ///
    /// Waiters registered from now on wait for the next completed load.
    pub fn reset(&self) {
        *self
            .inner
            .products
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::from(Vec::new());
        *self
            .inner
            .categories
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::from(Vec::new());
        self.inner.readiness.send_modify(|r| {
            r.products = false;
            r.categories = false;
        });
        info!("Catalog reset");
    }

    // =========================================================================
    // Readiness
    // =========================================================================

    #[must_use]
    pub fn readiness(&self) -> Readiness {
        *self.inner.readiness.borrow()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.readiness().is_ready()
    }

    #[must_use]
    pub fn products_ready(&self) -> bool {
        self.readiness().products
    }

    #[must_use]
    pub fn categories_ready(&self) -> bool {
        self.readiness().categories
    }

    fn waiter(&self) -> ReadyWaiter {
        let rx = self.inner.readiness.subscribe();
        let seen = rx.borrow().completed;
        ReadyWaiter { rx, seen }
    }

    /// Resolve once both products and categories are ready.
    pub async fn wait_until_ready(&self) {
        // `self` keeps the sender alive, so this only returns once ready.
        self.waiter().wait().await;
    }

    /// Run `callback` once, after both products and categories are ready.
    ///
    /// The callback runs on a spawned task, so this returns immediately. If
    /// every handle to the store is dropped first, the callback never runs.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn on_ready<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let waiter = self.waiter();
        tokio::spawn(async move {
            if waiter.wait().await {
                callback();
            } else {
                debug!("Catalog dropped before becoming ready, skipping callback");
            }
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current product snapshot (empty before ready).
    #[must_use]
    pub fn products(&self) -> Arc<[Product]> {
        read_snapshot(&self.inner.products)
    }

    /// Current category snapshot (empty before ready).
    #[must_use]
    pub fn categories(&self) -> Arc<[String]> {
        read_snapshot(&self.inner.categories)
    }

    #[must_use]
    pub fn get_product_by_id(&self, id: ProductId) -> Option<Product> {
        query::find_by_id(&self.products(), id).cloned()
    }

    /// Look up by the numeric id used in URLs and cart lines.
    #[must_use]
    pub fn get_product_by_global_id(&self, id: i64) -> Option<Product> {
        ProductId::try_from(id)
            .ok()
            .and_then(|id| self.get_product_by_id(id))
    }

    /// Up to `limit` other products from exactly the same category, in random
    /// order.
    pub fn get_related_products<R: Rng + ?Sized>(
        &self,
        product: &Product,
        limit: usize,
        rng: &mut R,
    ) -> Vec<Product> {
        let mut related: Vec<Product> = self
            .products()
            .iter()
            .filter(|p| p.category == product.category && p.id != product.id)
            .cloned()
            .collect();
        related.shuffle(rng);
        related.truncate(limit);
        related
    }

    /// A random sample of up to `limit` products.
    pub fn featured_products<R: Rng + ?Sized>(&self, limit: usize, rng: &mut R) -> Vec<Product> {
        self.products()
            .choose_multiple(rng, limit)
            .cloned()
            .collect()
    }

    /// The first `limit` categories.
    #[must_use]
    pub fn featured_categories(&self, limit: usize) -> Vec<String> {
        self.categories().iter().take(limit).cloned().collect()
    }

    /// Number of products the loose category rule matches.
    #[must_use]
    pub fn category_product_count(&self, category: &str) -> usize {
        self.products()
            .iter()
            .filter(|p| query::category_matches(&p.category, category))
            .count()
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self
            .inner
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

fn read_snapshot<T: ?Sized>(lock: &RwLock<Arc<T>>) -> Arc<T> {
    match lock.read() {
        Ok(guard) => Arc::clone(&guard),
        Err(poisoned) => Arc::clone(&poisoned.into_inner()),
    }
}
