//! Shared product list state.
//!
//! One [`ProductListStore`] is shared by every page that shows the listing.
//! It only changes through [`ProductListStore::dispatch`], which runs the
//! reducer over a [`ProductListAction`].

use tokio::sync::RwLock;

use proshop_core::ProductPage;

/// The listing as last observed. Exactly one branch is live at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ProductListState {
    /// A fetch is in flight.
    #[default]
    Loading,
    /// The last fetch failed with this message.
    Failed(String),
    /// The last fetch succeeded.
    Loaded(ProductPage),
}

/// Transitions of the product list.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductListAction {
    Request,
    Success(ProductPage),
    Fail(String),
}

impl ProductListState {
    /// Apply an action. Every action replaces the previous branch wholesale.
    pub fn reduce(&mut self, action: ProductListAction) {
        *self = match action {
            ProductListAction::Request => Self::Loading,
            ProductListAction::Success(page) => Self::Loaded(page),
            ProductListAction::Fail(message) => Self::Failed(message),
        };
    }
}

/// Process-wide holder of the product list state.
#[derive(Debug, Default)]
pub struct ProductListStore {
    state: RwLock<ProductListState>,
}

impl ProductListStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the reducer for `action`.
    pub async fn dispatch(&self, action: ProductListAction) {
        self.state.write().await.reduce(action);
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> ProductListState {
        self.state.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> ProductPage {
        ProductPage {
            products: Vec::new(),
            page: 2,
            pages: 4,
        }
    }

    #[test]
    fn test_reducer_transitions() {
        let mut state = ProductListState::default();
        assert_eq!(state, ProductListState::Loading);

        state.reduce(ProductListAction::Success(page()));
        assert_eq!(state, ProductListState::Loaded(page()));

        state.reduce(ProductListAction::Request);
        assert_eq!(state, ProductListState::Loading);

        state.reduce(ProductListAction::Fail("boom".to_string()));
        assert_eq!(state, ProductListState::Failed("boom".to_string()));

        state.reduce(ProductListAction::Success(page()));
        assert_eq!(state, ProductListState::Loaded(page()));
    }

    #[tokio::test]
    async fn test_store_dispatch_and_snapshot() {
        let store = ProductListStore::new();
        store.dispatch(ProductListAction::Fail("down".to_string())).await;
        assert_eq!(
            store.snapshot().await,
            ProductListState::Failed("down".to_string())
        );
    }
}
