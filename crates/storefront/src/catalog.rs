//! Catalog service client.
//!
//! The storefront owns no product data. Listings come from the catalog
//! service's `GET /api/products` endpoint, which pages results and filters
//! them by keyword.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use proshop_core::ProductPage;

/// Errors that can occur when talking to the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed or the body could not be decoded.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error status. Carries its `message`
    /// field when one was sent.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Base URL could not be joined with the listing path.
    #[error("invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Anything that can produce a page of products.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Fetch one page of the listing, optionally filtered by keyword.
    async fn list_products(
        &self,
        keyword: Option<&str>,
        page_number: u32,
    ) -> Result<ProductPage, CatalogError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client for the catalog service.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl CatalogClient {
    /// Create a client for the service at `base_url`.
    ///
    /// Every request is abandoned after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner { client, base_url }),
        })
    }

    /// Build the listing URL. An absent keyword is sent as an empty value.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the base URL cannot be joined.
    pub fn products_url(&self, keyword: Option<&str>, page_number: u32) -> Result<Url, url::ParseError> {
        let mut url = self.inner.base_url.join("/api/products")?;
        url.query_pairs_mut()
            .append_pair("keyword", keyword.unwrap_or_default())
            .append_pair("pageNumber", &page_number.to_string());
        Ok(url)
    }
}

#[async_trait]
impl ProductSource for CatalogClient {
    async fn list_products(
        &self,
        keyword: Option<&str>,
        page_number: u32,
    ) -> Result<ProductPage, CatalogError> {
        let url = self.products_url(keyword, page_number)?;

        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body).map_or_else(
                |_| format!("Request failed with status code {}", status.as_u16()),
                |b| b.message,
            );

            tracing::warn!(
                status = %status,
                message = %message,
                "Catalog service returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<ProductPage>().await?)
    }
}
