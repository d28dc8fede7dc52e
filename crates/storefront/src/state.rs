//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::{CatalogClient, CatalogError, ProductSource};
use crate::config::StorefrontConfig;
use crate::home::HomeScreen;
use crate::product_list::ProductListStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The product list store is shared by every
/// request, so all visitors observe the same listing state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    home: HomeScreen,
}

impl AppState {
    /// Create state backed by the catalog service from `config`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Http` if the catalog client cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, CatalogError> {
        let client = CatalogClient::new(config.catalog_api_url.clone(), config.catalog_timeout)?;
        Ok(Self::with_source(Arc::new(client)))
    }

    /// Create state over any product source.
    #[must_use]
    pub fn with_source(source: Arc<dyn ProductSource>) -> Self {
        let store = Arc::new(ProductListStore::new());
        Self {
            inner: Arc::new(AppStateInner {
                home: HomeScreen::new(source, store),
            }),
        }
    }

    /// The home screen controller.
    #[must_use]
    pub fn home(&self) -> &HomeScreen {
        &self.inner.home
    }
}
