//! Catalog listing types.
//!
//! These mirror the JSON published by the catalog service's product listing
//! endpoint. Product identifiers belong to that service and are kept as
//! opaque strings.

use serde::{Deserialize, Serialize};

use super::price::Price;

/// A product as listed by the catalog service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog-assigned identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Image path or URL.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Average review score, 0 to 5.
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub num_reviews: u32,
    pub price: Price,
    #[serde(default)]
    pub count_in_stock: u32,
}

/// One page of the product listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// 1-based page number of this slice.
    pub page: u32,
    /// Total number of pages for the query.
    pub pages: u32,
}

impl ProductPage {
    /// Whether the listing spans more than one page.
    #[must_use]
    pub const fn is_paginated(&self) -> bool {
        self.pages > 1
    }
}
