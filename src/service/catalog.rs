//! SKU price list used by the in-process cart service.

use crate::model::SkuId;
use std::collections::HashMap;

/// Display and pricing data for one SKU.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub title: String,
    pub image: String,
    pub unit_price: f64,
    pub color: Option<String>,
    pub size: Option<String>,
}

impl CatalogEntry {
    pub fn new(title: impl Into<String>, unit_price: f64) -> Self {
        Self {
            title: title.into(),
            image: String::new(),
            unit_price,
            color: None,
            size: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_variant(mut self, color: impl Into<String>, size: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self.size = Some(size.into());
        self
    }
}

/// The set of SKUs the service will accept.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<SkuId, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sku(mut self, sku_id: impl Into<SkuId>, entry: CatalogEntry) -> Self {
        self.insert(sku_id, entry);
        self
    }

    pub fn insert(&mut self, sku_id: impl Into<SkuId>, entry: CatalogEntry) {
        self.entries.insert(sku_id.into(), entry);
    }

    pub fn get(&self, sku_id: SkuId) -> Option<&CatalogEntry> {
        self.entries.get(&sku_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
