//! Application state shared across the view layer.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::task::JoinHandle;
use tracing::info;

use crate::cart::CartStore;
use crate::catalog::{CatalogStore, Normalizer};
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::notify::{Notifier, TracingNotifier};
use crate::services::auth::AuthService;
use crate::sources::SourceClient;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

/// Application state shared across all views.
///
/// This struct is cheaply cloneable via `Arc` and owns the catalog, the
/// cart, the auth service and the notification sink.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogStore,
    cart: CartStore,
    auth: AuthService,
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// Opens a [`FileStore`] under `storage_dir` when configured, otherwise
    /// keeps everything in memory. Notifications go to the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be created, the
    /// upstream URLs are unusable, or the user roster cannot be seeded.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let store: Arc<dyn KeyValueStore> = match &config.storage_dir {
            Some(dir) => Arc::new(FileStore::open(dir)?),
            None => Arc::new(MemoryStore::new()),
        };
        Self::with_store(config, store, Arc::new(TracingNotifier))
    }

    /// Create application state over the given storage and notifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream URLs are unusable or the user roster
    /// cannot be seeded.
    pub fn with_store(
        config: StorefrontConfig,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppError> {
        let rng = config
            .rng_seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let catalog = CatalogStore::new(
            SourceClient::new(config.cache_ttl),
            config.catalog_settings()?,
            Normalizer::default(),
            rng,
        );
        let cart = CartStore::new(Arc::clone(&store), Arc::clone(&notifier));
        let auth = AuthService::new(store, Arc::clone(&notifier));
        auth.bootstrap()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart,
                auth,
                notifier,
            }),
        })
    }

    /// Spawn a background task that loads the catalog.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_catalog_loading(&self) -> JoinHandle<()> {
        info!("Spawning background catalog load task");
        let catalog = self.inner.catalog.clone();
        tokio::spawn(async move {
            catalog.load().await;
            info!(
                products = catalog.products().len(),
                "Catalog is now ready and serving requests"
            );
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.inner.notifier
    }
}
