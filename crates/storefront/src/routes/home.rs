//! Home page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use proshop_core::{Product, ProductPage};

use crate::home::HomeParams;
use crate::product_list::ProductListState;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Product card display data.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    pub href: String,
    pub name: String,
    pub image: String,
    pub price: String,
    pub rating: f64,
    pub reviews: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            href: format!("/product/{}", product.id),
            name: product.name.clone(),
            image: product.image.clone(),
            price: product.price.to_string(),
            rating: product.rating,
            reviews: format!("{} reviews", product.num_reviews),
        }
    }
}

/// One entry of the pagination bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: u32,
    pub href: String,
    pub active: bool,
}

/// Pagination links for `page`, empty when the listing fits on one page.
///
/// The keyword is percent-encoded as a single path segment.
#[must_use]
pub fn page_links(page: &ProductPage, keyword: Option<&str>) -> Vec<PageLink> {
    if !page.is_paginated() {
        return Vec::new();
    }

    (1..=page.pages)
        .map(|number| PageLink {
            number,
            href: keyword.map_or_else(
                || format!("/page/{number}"),
                |kw| format!("/search/{}/page/{number}", urlencoding::encode(kw)),
            ),
            active: number == page.page,
        })
        .collect()
}

// =============================================================================
// Template
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Active search keyword; shows the "Go Back" link.
    pub keyword: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub products: Vec<ProductCard>,
    pub page_links: Vec<PageLink>,
}

impl HomeTemplate {
    fn render_state(params: HomeParams, state: ProductListState) -> Self {
        let mut template = Self {
            keyword: params.keyword,
            loading: false,
            error: None,
            products: Vec::new(),
            page_links: Vec::new(),
        };

        match state {
            ProductListState::Loading => template.loading = true,
            ProductListState::Failed(message) => template.error = Some(message),
            ProductListState::Loaded(page) => {
                template.products = page.products.iter().map(ProductCard::from).collect();
                template.page_links = page_links(&page, template.keyword.as_deref());
            }
        }

        template
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn show(state: &AppState, params: HomeParams) -> HomeTemplate {
    let list = state.home().visit(&params).await;
    HomeTemplate::render_state(params, list)
}

/// `GET /`
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> HomeTemplate {
    show(&state, HomeParams::default()).await
}

/// `GET /page/{page_number}`
#[instrument(skip(state))]
pub async fn page(
    State(state): State<AppState>,
    Path(page_number): Path<String>,
) -> HomeTemplate {
    show(&state, HomeParams::from_route(None, Some(&page_number))).await
}

/// `GET /search/{keyword}`
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Path(keyword): Path<String>,
) -> HomeTemplate {
    show(&state, HomeParams::from_route(Some(keyword), None)).await
}

/// `GET /search/{keyword}/page/{page_number}`
#[instrument(skip(state))]
pub async fn search_page(
    State(state): State<AppState>,
    Path((keyword, page_number)): Path<(String, String)>,
) -> HomeTemplate {
    show(
        &state,
        HomeParams::from_route(Some(keyword), Some(&page_number)),
    )
    .await
}
