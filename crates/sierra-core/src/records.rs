//! Canonical output records for the extraction pipeline.
//!
//! ## Observed shape from live sierra.com product pages
//!
//! ### The event layer
//! Product pages push several `dataLayer` events over their lifecycle; only
//! the initial detail-view event carries an `ecommerce.detail.products`
//! list. Its entries expose `id`, `name`, `brand`, `category`, `variant`,
//! `price`, `discountPrice`, `rrPrice`, `discount`, `parentStockLevel` and
//! `childStockLevel`. All of them are optional in practice, and none are
//! guaranteed to keep their type between site deployments.
//!
//! ### Availability
//! The event layer has no reliable availability field; `og:availability`
//! meta is the only usable source, so [`NormalizedProduct::availability`]
//! is always meta-derived even when an event-layer entry exists.
//!
//! ### The inventory API
//! `GET /api/product/inventory/{itemCode}` returns per-SKU rows with
//! `salePrice` (explicitly `null` when unpriced, not omitted), `skuSize`
//! (may be an empty string), `availability`, and an optional `flags`
//! string array.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which source class won the record: the highest-priority source that
/// contributed any field, not a per-field mix indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductSource {
    DataLayer,
    Fallback,
}

/// Marketing signals scanned from the raw document text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFlags {
    pub clearance: bool,
    pub almost_gone: bool,
    pub only_one_left: bool,
}

/// Normalized product-detail-page record.
///
/// `price` is `None` only when no source, structured or fallback, yielded
/// a numeric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedProduct {
    pub source: ProductSource,
    pub id: Option<String>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub variant: Option<String>,
    pub price: Option<f64>,
    /// Recommended/retail price. Event-layer only.
    pub rr_price: Option<f64>,
    pub currency: String,
    pub discount: Option<f64>,
    pub parent_stock: Option<i64>,
    pub child_stock: Option<i64>,
    pub availability: Option<String>,
    pub flags: ProductFlags,
    pub scraped_at: DateTime<Utc>,
}

/// Aggregate over a flat list of SKU-level inventory rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    /// Minimum of all non-null SKU sale prices, or `None` if none were set.
    pub min_price: Option<f64>,
    /// Distinct non-empty SKU sizes, first-seen order.
    pub sizes: Vec<String>,
    /// Distinct availability states, first-seen order.
    pub availability: Vec<String>,
    /// Union of per-item flag strings, first-seen order.
    pub flags: Vec<String>,
}
