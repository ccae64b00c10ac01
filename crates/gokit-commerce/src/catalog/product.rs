//! Product records and the read-only catalog.

use crate::ids::ProductId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Current unit price.
    pub price: f64,
    /// Image path or markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Tags used for recommendations (e.g., "football", "nba").
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Product {
    /// Create a product without image or tags.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: None,
            tags: Vec::new(),
        }
    }

    /// Add a tag to this product.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Check whether any of this product's tags is in `tags`.
    pub fn shares_tag(&self, tags: &HashSet<&str>) -> bool {
        self.tags.iter().any(|t| tags.contains(t.as_str()))
    }
}

/// Externally supplied product list. The cart never mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create a catalog from a product list.
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Concatenate several product lists (e.g., football and NBA ranges)
    /// into one catalog, keeping their order.
    pub fn merged<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = Vec<Product>>,
    {
        Self {
            products: sources.into_iter().flatten().collect(),
        }
    }

    /// Look up a product. Stale references resolve to `None`.
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Iterate products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
