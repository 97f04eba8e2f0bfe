//! Merges the extractor outputs into one [`NormalizedProduct`].
//!
//! Priority is strict: the first event-layer object carrying an
//! `ecommerce.detail.products` list is the primary source. Pages emit
//! several lifecycle pushes; only the initial detail-view event is
//! authoritative, so later qualifying pushes are never consulted. The
//! `window.__STATE__` blob is searched for the same detail shape only
//! when the event layer has none (it is the same hydration payload
//! serialized a second time). Meta tags and flag scans always run and
//! backfill per field.
//!
//! Every field resolution is recorded in a [`ReduceTrace`] naming which
//! source won, surfaced through the `debug=1` side-channel. The upstream
//! schema is fragile; the audit trail is how a broken deployment gets
//! diagnosed from a response body alone.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use sierra_core::{NormalizedProduct, ProductSource};

use crate::error::ExtractError;
use crate::events::extract_data_layer;
use crate::flags::scan_flags;
use crate::meta::{extract_meta_fallback, MetaFallback};
use crate::state::extract_state;

/// Which concrete source supplied a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldOrigin {
    DataLayer,
    State,
    Meta,
    Absent,
}

/// Standalone outcome of the state extractor, reported for diagnosis
/// even though the reducer itself never fails on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StateProbe {
    Found,
    NotFound,
    ParseFailure,
}

/// Per-field audit trail of the source-priority cascade.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReduceTrace {
    pub source: ProductSource,
    pub state: StateProbe,
    pub data_layer_events: usize,
    pub fields: Vec<FieldTrace>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldTrace {
    pub field: &'static str,
    pub origin: FieldOrigin,
}

/// Run the full pipeline over raw PDP HTML.
///
/// # Errors
///
/// [`ExtractError::EventLayerNotFound`] when no structured detail entry
/// exists anywhere and the fallback yielded neither a price nor a title;
/// such a document carries no product signal at all.
pub fn reduce_product(
    html: &str,
    now: DateTime<Utc>,
) -> Result<(NormalizedProduct, ReduceTrace), ExtractError> {
    let events = extract_data_layer(html);
    let meta = extract_meta_fallback(html);
    let flags = scan_flags(html);

    let state = extract_state(html);
    let state_probe = match &state {
        Ok(_) => StateProbe::Found,
        Err(ExtractError::StateNotFound) => StateProbe::NotFound,
        Err(_) => StateProbe::ParseFailure,
    };

    // Tie-break: only the FIRST qualifying push is ever used.
    let event_entry = events.iter().find_map(first_detail_product);
    let (entry, entry_origin) = match event_entry {
        Some(entry) => (Some(entry), FieldOrigin::DataLayer),
        None => (
            state.as_ref().ok().and_then(find_detail_entry),
            FieldOrigin::State,
        ),
    };

    if entry.is_none() && meta.price.is_none() && meta.title.is_none() {
        return Err(ExtractError::EventLayerNotFound);
    }

    let mut trace = ReduceTrace {
        source: if entry.is_some() {
            ProductSource::DataLayer
        } else {
            ProductSource::Fallback
        },
        state: state_probe,
        data_layer_events: events.len(),
        fields: Vec::new(),
    };

    let record = match entry {
        Some(entry) => from_structured_entry(entry, entry_origin, &meta, &mut trace, now, flags),
        None => from_fallback(&meta, &mut trace, now, flags),
    };

    Ok((record, trace))
}

fn from_structured_entry(
    entry: &Value,
    origin: FieldOrigin,
    meta: &MetaFallback,
    trace: &mut ReduceTrace,
    now: DateTime<Utc>,
    flags: sierra_core::ProductFlags,
) -> NormalizedProduct {
    NormalizedProduct {
        source: ProductSource::DataLayer,
        id: pick(trace, "id", [(origin, entry_str(entry, "id"))]),
        name: pick(
            trace,
            "name",
            [(origin, entry_str(entry, "name")), (FieldOrigin::Meta, meta.title.clone())],
        ),
        brand: pick(trace, "brand", [(origin, entry_str(entry, "brand"))]),
        category: pick(trace, "category", [(origin, entry_str(entry, "category"))]),
        variant: pick(trace, "variant", [(origin, entry_str(entry, "variant"))]),
        price: pick(
            trace,
            "price",
            [
                (origin, entry_f64(entry, "discountPrice")),
                (origin, entry_f64(entry, "price")),
                (FieldOrigin::Meta, meta.price),
            ],
        ),
        rr_price: pick(trace, "rrPrice", [(origin, entry_f64(entry, "rrPrice"))]),
        currency: pick(
            trace,
            "currency",
            [
                (origin, entry_str(entry, "currency")),
                (FieldOrigin::Meta, meta.currency.clone()),
            ],
        )
        .unwrap_or_else(default_currency),
        discount: pick(trace, "discount", [(origin, entry_f64(entry, "discount"))]),
        parent_stock: pick(
            trace,
            "parentStock",
            [(origin, entry_i64(entry, "parentStockLevel"))],
        ),
        child_stock: pick(
            trace,
            "childStock",
            [(origin, entry_i64(entry, "childStockLevel"))],
        ),
        // The event layer has no reliable availability field; meta only.
        availability: pick(
            trace,
            "availability",
            [(FieldOrigin::Meta, meta.availability.clone())],
        ),
        flags,
        scraped_at: now,
    }
}

fn from_fallback(
    meta: &MetaFallback,
    trace: &mut ReduceTrace,
    now: DateTime<Utc>,
    flags: sierra_core::ProductFlags,
) -> NormalizedProduct {
    NormalizedProduct {
        source: ProductSource::Fallback,
        id: absent(trace, "id"),
        name: pick(trace, "name", [(FieldOrigin::Meta, meta.title.clone())]),
        brand: absent(trace, "brand"),
        category: absent(trace, "category"),
        variant: absent(trace, "variant"),
        price: pick(trace, "price", [(FieldOrigin::Meta, meta.price)]),
        rr_price: absent(trace, "rrPrice"),
        currency: pick(
            trace,
            "currency",
            [(FieldOrigin::Meta, meta.currency.clone())],
        )
        .unwrap_or_else(default_currency),
        discount: absent(trace, "discount"),
        parent_stock: absent(trace, "parentStock"),
        child_stock: absent(trace, "childStock"),
        availability: pick(
            trace,
            "availability",
            [(FieldOrigin::Meta, meta.availability.clone())],
        ),
        flags,
        scraped_at: now,
    }
}

/// Evaluate an ordered candidate list for one field, recording the
/// winning origin (or `Absent`) in the trace.
fn pick<T, const N: usize>(
    trace: &mut ReduceTrace,
    field: &'static str,
    candidates: [(FieldOrigin, Option<T>); N],
) -> Option<T> {
    for (origin, value) in candidates {
        if let Some(value) = value {
            trace.fields.push(FieldTrace { field, origin });
            return Some(value);
        }
    }
    trace.fields.push(FieldTrace {
        field,
        origin: FieldOrigin::Absent,
    });
    None
}

/// Record a field the fallback source class cannot supply at all.
fn absent<T>(trace: &mut ReduceTrace, field: &'static str) -> Option<T> {
    trace.fields.push(FieldTrace {
        field,
        origin: FieldOrigin::Absent,
    });
    None
}

fn default_currency() -> String {
    "USD".to_string()
}

/// First entry of a top-level `ecommerce.detail.products` list, if the
/// object has one and it is non-empty.
fn first_detail_product(object: &Value) -> Option<&Value> {
    object
        .get("ecommerce")?
        .get("detail")?
        .get("products")?
        .as_array()?
        .first()
}

/// Recursive search for a detail-products entry anywhere in the state
/// blob. The blob's nesting varies between deployments, so the path is
/// not assumed.
fn find_detail_entry(value: &Value) -> Option<&Value> {
    if let Some(entry) = first_detail_product(value) {
        return Some(entry);
    }
    match value {
        Value::Object(map) => map.values().find_map(find_detail_entry),
        Value::Array(items) => items.iter().find_map(find_detail_entry),
        _ => None,
    }
}

/// String field accessor tolerating numeric values (the upstream schema
/// flips `id` between string and number across deployments).
fn entry_str(entry: &Value, key: &str) -> Option<String> {
    match entry.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric field accessor tolerating string-encoded numbers.
fn entry_f64(entry: &Value, key: &str) -> Option<f64> {
    let value = entry.get(key)?;
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
}

fn entry_i64(entry: &Value, key: &str) -> Option<i64> {
    let value = entry.get(key)?;
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<i64>().ok()))
}

#[cfg(test)]
#[path = "reduce_test.rs"]
mod tests;
