//! The single retailer lookup route: `GET /api/sierra`.
//!
//! Two modes share the route. With only `url=`, fetch the product page
//! and reduce it to a normalized record. With `itemCode=` as well, warm
//! a session against the page and query the inventory API instead.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use sierra_core::{AppConfig, InventorySummary, NormalizedProduct};
use sierra_extract::{
    host_allowed, reduce_product, summarize_inventory, ExtractError, InventoryResponse,
    ReduceTrace,
};
use sierra_fetch::FetchError;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub url: Option<String>,
    #[serde(rename = "itemCode")]
    pub item_code: Option<String>,
    pub debug: Option<String>,
}

/// Product record plus cache marker, flattened into one JSON object.
/// The `trace` field only appears when the caller asked for `debug=1`.
#[derive(Debug, Serialize)]
struct ProductBody {
    #[serde(flatten)]
    record: NormalizedProduct,
    cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<ReduceTrace>,
}

#[derive(Debug, Serialize)]
struct InventoryBody {
    #[serde(flatten)]
    summary: InventorySummary,
    cached: bool,
}

pub async fn lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<Response, ApiError> {
    let Some(url) = params.url.as_deref().filter(|u| !u.is_empty()) else {
        return Err(ApiError::bad_request(
            "missing required query parameter: url",
        ));
    };
    if !host_allowed(url, &state.config.allowed_host_suffix) {
        return Err(ApiError::bad_request(format!(
            "refusing url: host must end with {}",
            state.config.allowed_host_suffix
        )));
    }
    let debug = params.debug.as_deref() == Some("1");

    match params.item_code.as_deref().filter(|c| !c.is_empty()) {
        Some(item_code) => inventory_lookup(&state, item_code, url).await,
        None => product_lookup(&state, url, debug).await,
    }
}

async fn product_lookup(state: &AppState, url: &str, debug: bool) -> Result<Response, ApiError> {
    if let Some(record) = state.product_cache.get_fresh(url) {
        tracing::debug!(url, "product cache hit");
        return Ok(Json(ProductBody {
            record,
            cached: true,
            trace: None,
        })
        .into_response());
    }

    let html = state
        .page_fetcher
        .fetch_page(url)
        .await
        .map_err(upstream_error)?;
    if debug {
        debug_dump(&state.config, &html).await;
    }

    let (record, trace) = reduce_product(&html, state.clock.now()).map_err(extraction_error)?;
    state.product_cache.put(url, record.clone());
    tracing::info!(url, source = ?record.source, "extracted product record");

    Ok(Json(ProductBody {
        record,
        cached: false,
        trace: debug.then_some(trace),
    })
    .into_response())
}

async fn inventory_lookup(
    state: &AppState,
    item_code: &str,
    url: &str,
) -> Result<Response, ApiError> {
    // One page can expose several item codes, so the code alone is not a
    // sufficient key.
    let key = format!("{item_code}::{url}");
    if let Some(summary) = state.inventory_cache.get_fresh(&key) {
        tracing::debug!(item_code, "inventory cache hit");
        return Ok(Json(InventoryBody {
            summary,
            cached: true,
        })
        .into_response());
    }

    let body = state
        .inventory_fetcher
        .fetch_inventory(item_code, url)
        .await
        .map_err(upstream_error)?;
    let parsed: InventoryResponse = serde_json::from_str(&body).map_err(|e| {
        tracing::error!(item_code, error = %e, "inventory response is not valid JSON");
        ApiError::internal(format!("inventory response is not valid JSON: {e}"))
    })?;
    let summary =
        summarize_inventory(parsed.items.as_deref()).map_err(extraction_error)?;
    state.inventory_cache.put(key, summary.clone());
    tracing::info!(item_code, sizes = summary.sizes.len(), "summarized inventory");

    Ok(Json(InventoryBody {
        summary,
        cached: false,
    })
    .into_response())
}

fn upstream_error(error: FetchError) -> ApiError {
    tracing::error!(%error, "upstream fetch failed");
    ApiError::internal(error.to_string())
}

fn extraction_error(error: ExtractError) -> ApiError {
    tracing::error!(%error, "extraction failed");
    ApiError::internal(error.to_string())
}

/// Best effort: a failed dump is logged, never surfaced to the caller.
async fn debug_dump(config: &AppConfig, html: &str) {
    let Some(path) = config.debug_dump_path.as_deref() else {
        return;
    };
    if let Err(error) = tokio::fs::write(path, html).await {
        tracing::warn!(%error, path = %path.display(), "failed to write debug dump");
    }
}
