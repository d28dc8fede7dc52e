//! Home screen: the paginated, optionally keyword-filtered product listing.

use std::sync::Arc;

use crate::catalog::ProductSource;
use crate::product_list::{ProductListAction, ProductListState, ProductListStore};

/// Inputs of the home screen, taken from the route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeParams {
    /// Search keyword; `None` lists everything.
    pub keyword: Option<String>,
    /// 1-based page number.
    pub page_number: u32,
}

impl HomeParams {
    /// Build params from raw route segments.
    ///
    /// A blank keyword counts as absent. A missing, unparseable or zero page
    /// number means page 1.
    #[must_use]
    pub fn from_route(keyword: Option<String>, page_number: Option<&str>) -> Self {
        let keyword = keyword.filter(|k| !k.trim().is_empty());
        let page_number = page_number
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|&p| p > 0)
            .unwrap_or(1);

        Self {
            keyword,
            page_number,
        }
    }
}

impl Default for HomeParams {
    fn default() -> Self {
        Self::from_route(None, None)
    }
}

/// Drives the shared product list from the home screen's inputs.
///
/// Every visit is a fresh mount: it dispatches `Request`, fetches the page
/// and dispatches the outcome. No lock is held across the fetch, so a slow
/// catalog only delays the visit waiting on it.
pub struct HomeScreen {
    source: Arc<dyn ProductSource>,
    store: Arc<ProductListStore>,
}

impl HomeScreen {
    #[must_use]
    pub fn new(source: Arc<dyn ProductSource>, store: Arc<ProductListStore>) -> Self {
        Self { source, store }
    }

    /// The shared list this screen writes to.
    #[must_use]
    pub fn store(&self) -> &ProductListStore {
        &self.store
    }

    /// Show the screen for `params` and return the state this visit produced.
    ///
    /// The returned state comes from this visit's own fetch, so concurrent
    /// visits with other params never leak into it.
    pub async fn visit(&self, params: &HomeParams) -> ProductListState {
        self.store.dispatch(ProductListAction::Request).await;

        let action = match self
            .source
            .list_products(params.keyword.as_deref(), params.page_number)
            .await
        {
            Ok(page) => ProductListAction::Success(page),
            Err(e) => {
                tracing::warn!(error = %e, ?params, "Product listing failed");
                ProductListAction::Fail(e.to_string())
            }
        };

        let mut state = ProductListState::Loading;
        state.reduce(action.clone());
        self.store.dispatch(action).await;
        state
    }
}
