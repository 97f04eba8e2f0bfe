//! Aggregation of SKU-level inventory rows into summary statistics.

use serde::Deserialize;
use sierra_core::InventorySummary;

use crate::error::ExtractError;

/// Envelope of `GET /api/product/inventory/{itemCode}`. `items` may be
/// absent entirely on error pages; both absent and empty mean no data.
#[derive(Debug, Deserialize)]
pub struct InventoryResponse {
    #[serde(default)]
    pub items: Option<Vec<InventoryItem>>,
}

/// One SKU row from the inventory API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Explicitly `null` when the SKU is unpriced, not omitted.
    #[serde(default)]
    pub sale_price: Option<f64>,
    /// May be an empty string; dropped during aggregation.
    #[serde(default)]
    pub sku_size: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub flags: Vec<String>,
}

/// Reduce an item list to its summary: minimum sale price, distinct
/// sizes, distinct availability states, union of flags. All collections
/// are first-seen order with empties dropped.
///
/// # Errors
///
/// [`ExtractError::NoItems`] when the list is missing or empty.
pub fn summarize_inventory(
    items: Option<&[InventoryItem]>,
) -> Result<InventorySummary, ExtractError> {
    let items = items
        .filter(|items| !items.is_empty())
        .ok_or(ExtractError::NoItems)?;

    let min_price = items
        .iter()
        .filter_map(|item| item.sale_price)
        .fold(None::<f64>, |acc, price| {
            Some(acc.map_or(price, |min| min.min(price)))
        });

    let mut sizes = Vec::new();
    let mut availability = Vec::new();
    let mut flags = Vec::new();
    for item in items {
        if let Some(size) = item.sku_size.as_deref() {
            push_distinct(&mut sizes, size);
        }
        if let Some(state) = item.availability.as_deref() {
            push_distinct(&mut availability, state);
        }
        for flag in &item.flags {
            push_distinct(&mut flags, flag);
        }
    }

    Ok(InventorySummary {
        min_price,
        sizes,
        availability,
        flags,
    })
}

/// Append `value` if non-empty and not already present. Linear scan is
/// fine at inventory-list sizes (tens of SKUs).
fn push_distinct(seen: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !seen.iter().any(|s| s == value) {
        seen.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: Option<f64>, size: &str, avail: &str, flags: &[&str]) -> InventoryItem {
        InventoryItem {
            sale_price: price,
            sku_size: (!size.is_empty()).then(|| size.to_string()),
            availability: (!avail.is_empty()).then(|| avail.to_string()),
            flags: flags.iter().map(|f| (*f).to_string()).collect(),
        }
    }

    #[test]
    fn min_price_skips_null_sale_prices() {
        let items = vec![
            item(Some(10.0), "S", "in", &[]),
            item(None, "M", "in", &[]),
            item(Some(5.0), "L", "low", &[]),
        ];
        let summary = summarize_inventory(Some(&items)).unwrap();
        assert_eq!(summary.min_price, Some(5.0));
    }

    #[test]
    fn all_null_prices_give_null_min() {
        let items = vec![item(None, "S", "in", &[]), item(None, "M", "in", &[])];
        let summary = summarize_inventory(Some(&items)).unwrap();
        assert_eq!(summary.min_price, None);
    }

    #[test]
    fn collections_are_first_seen_order_and_deduplicated() {
        let items = vec![
            item(Some(20.0), "M", "instock", &["clearance"]),
            item(Some(15.0), "S", "instock", &["clearance", "final-sale"]),
            item(Some(30.0), "M", "backorder", &[]),
        ];
        let summary = summarize_inventory(Some(&items)).unwrap();
        assert_eq!(summary.sizes, vec!["M", "S"]);
        assert_eq!(summary.availability, vec!["instock", "backorder"]);
        assert_eq!(summary.flags, vec!["clearance", "final-sale"]);
    }

    #[test]
    fn empty_sizes_are_dropped() {
        let items = vec![item(Some(9.0), "", "in", &[])];
        let summary = summarize_inventory(Some(&items)).unwrap();
        assert!(summary.sizes.is_empty());
    }

    #[test]
    fn missing_or_empty_items_fail_with_no_items() {
        assert!(matches!(
            summarize_inventory(None),
            Err(ExtractError::NoItems)
        ));
        assert!(matches!(
            summarize_inventory(Some(&[])),
            Err(ExtractError::NoItems)
        ));
    }

    #[test]
    fn response_envelope_deserializes_wire_names() {
        let json = r#"{"items":[{"salePrice":12.5,"skuSize":"M","availability":"instock","flags":["clearance"]}]}"#;
        let response: InventoryResponse = serde_json::from_str(json).unwrap();
        let items = response.items.unwrap();
        assert_eq!(items[0].sale_price, Some(12.5));
        assert_eq!(items[0].sku_size.as_deref(), Some("M"));
    }

    #[test]
    fn absent_items_key_deserializes_to_none() {
        let response: InventoryResponse = serde_json::from_str(r#"{"status":"error"}"#).unwrap();
        assert!(response.items.is_none());
    }
}
